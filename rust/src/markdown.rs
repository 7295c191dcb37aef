use html_escape::{encode_double_quoted_attribute, encode_text};
use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Renders generated instructions (markdown) to HTML for the result pane.
/// Fenced code blocks bypass the default writer and go through our own
/// handler so the page can style them and keep the language tag.
pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new_ext(
        source,
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
    );

    let mut events: Vec<Event> = Vec::new();
    let mut code_block: Option<(String, String)> = None;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.trim().to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                code_block = Some((lang, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, code)) = code_block.take() {
                    events.push(Event::Html(render_code_block(&lang, &code).into()));
                }
            }
            Event::Text(text) => {
                if let Some((_, code)) = code_block.as_mut() {
                    code.push_str(&text);
                } else {
                    events.push(Event::Text(text));
                }
            }
            other => events.push(other),
        }
    }

    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

fn render_code_block(lang: &str, code: &str) -> String {
    let mut block = String::from("<pre class=\"code-block\"");
    if !lang.is_empty() {
        block.push_str(" data-lang=\"");
        block.push_str(&encode_double_quoted_attribute(lang));
        block.push('"');
    }
    block.push_str("><code>");
    block.push_str(&encode_text(code));
    block.push_str("</code></pre>\n");
    block
}

#[cfg(test)]
mod tests {
    use super::render_markdown;

    #[test]
    fn renders_headings_and_lists() {
        let html = render_markdown("# Title\n- item");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<li>item</li>"));
    }

    #[test]
    fn fenced_blocks_use_the_custom_handler() {
        let html = render_markdown("```mermaid\ngraph TD;\n  A-->B;\n```\n");
        assert!(html.contains("<pre class=\"code-block\" data-lang=\"mermaid\">"));
        assert!(html.contains("A--&gt;B;"));
        assert!(!html.contains("A-->B;"));
    }

    #[test]
    fn fenced_blocks_without_language_omit_the_lang_tag() {
        let html = render_markdown("```\nplain\n```\n");
        assert!(html.contains("<pre class=\"code-block\"><code>plain"));
        assert!(!html.contains("data-lang"));
    }

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(render_markdown(""), "");
    }
}
