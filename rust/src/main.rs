fn main() -> anyhow::Result<()> {
    diagram_instructions_generator::app::run()
}
