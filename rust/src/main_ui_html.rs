pub fn build_main_ui_html() -> String {
    MAIN_UI_HTML.to_string()
}

const MAIN_UI_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Mermaid Diagram GPT Generator</title>
  <style>
    :root {
      --bg: #1f2024;
      --panel: #1b1c20;
      --line: #3f4248;
      --input-bg: #272a2f;
      --input-line: #4a4e55;
      --text: #f3f5f7;
      --muted: #9ca2ad;
      --btn-bg: #2a2d33;
      --btn-line: #5b616d;
      --error: #e06c6c;
      --ctrl-h: 28px;
      --font-sm: 12px;
    }
    * { box-sizing: border-box; }
    body {
      margin: 0;
      color: var(--text);
      background: var(--bg);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      font-size: 14px;
    }
    .wrap {
      width: 100%;
      min-height: 100vh;
      padding: 8px;
    }
    .frame {
      border: 1px solid var(--line);
      background: var(--panel);
      padding: 6px 10px 10px;
      width: 100%;
      min-height: calc(100vh - 16px);
      display: flex;
      flex-direction: column;
    }
    h1 {
      font-size: 16px;
      font-weight: 600;
      margin: 4px 0 8px;
      padding-bottom: 6px;
      border-bottom: 1px solid #2f3137;
    }
    .columns {
      display: grid;
      grid-template-columns: minmax(320px, 420px) 1fr;
      gap: 16px;
      flex: 1 1 auto;
      min-height: 0;
    }
    .field {
      margin-bottom: 10px;
    }
    .field > label.title {
      display: block;
      font-size: var(--font-sm);
      font-weight: 600;
      color: #ffffff;
      margin-bottom: 3px;
    }
    select, input[type="text"], button {
      font: inherit;
    }
    select, input[type="text"] {
      width: 100%;
      height: var(--ctrl-h);
      border: 1px solid var(--input-line);
      background: var(--input-bg);
      padding: 0 6px;
      border-radius: 4px;
      color: var(--text);
      outline: none;
      font-size: var(--font-sm);
    }
    select:focus, input[type="text"]:focus {
      border-color: #6f8099;
    }
    .radio-group, .check-group {
      display: flex;
      flex-direction: column;
      gap: 3px;
      font-size: var(--font-sm);
    }
    .radio-group label, .check-group label {
      display: flex;
      align-items: center;
      gap: 6px;
      cursor: pointer;
    }
    .help {
      color: var(--muted);
      font-size: 11px;
    }
    .field-error {
      color: var(--error);
      font-size: 11px;
      min-height: 13px;
      margin-top: 2px;
    }
    .actions {
      margin-top: 10px;
      display: flex;
      gap: 8px;
      justify-content: flex-end;
      align-items: center;
    }
    .btn {
      min-width: 90px;
      height: 30px;
      border: 1px solid var(--btn-line);
      background: var(--btn-bg);
      color: #ffffff;
      border-radius: 5px;
      font-weight: 500;
      padding: 0 12px;
      cursor: pointer;
      font-size: 12px;
    }
    .btn:hover {
      background: #343842;
    }
    .btn.primary {
      background: #2458a6;
      border-color: #3a6fbe;
    }
    .btn.primary:hover {
      background: #2c66bd;
    }
    .result-title {
      margin: 0 0 4px;
      font-size: var(--font-sm);
      font-weight: 600;
      color: #ffffff;
    }
    .result {
      border: 1px solid #5b5f67;
      background: #1a1b1f;
      padding: 10px 12px;
      min-height: 200px;
      max-height: calc(100vh - 140px);
      overflow-y: auto;
      font-size: 13px;
      line-height: 1.45;
    }
    .result h1, .result h2, .result h3 {
      border: none;
      margin: 8px 0 4px;
    }
    .result pre.code-block {
      background: #121316;
      border: 1px solid #2f3137;
      border-radius: 4px;
      padding: 8px 10px;
      overflow-x: auto;
      position: relative;
    }
    .result pre.code-block[data-lang]::before {
      content: attr(data-lang);
      position: absolute;
      top: 2px;
      right: 8px;
      color: var(--muted);
      font-size: 10px;
    }
    .copy-row {
      margin-top: 6px;
      display: flex;
      align-items: center;
      gap: 8px;
    }
    .status {
      margin-top: 6px;
      min-height: 16px;
      color: var(--muted);
      font-size: 11px;
    }
    .loading {
      padding: 24px;
      color: var(--muted);
    }
    @media (max-width: 900px) {
      .columns {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <main class="wrap">
    <section class="frame">
      <h1 id="formTitle">Mermaid Diagram GPT Generator</h1>
      <div id="loading" class="loading">Loading local state...</div>
      <div id="form" class="columns" style="display: none" aria-labelledby="formTitle">
        <div>
          <div class="field">
            <label class="title" for="source_folder_option">Source Folder</label>
            <select id="source_folder_option"></select>
            <div class="field-error" data-error-for="source_folder_option"></div>
          </div>

          <div class="field">
            <label class="title" for="git_ignore_file_path">Ignore File Path (optional)</label>
            <input type="text" id="git_ignore_file_path" placeholder=".gitignore" />
          </div>

          <div class="field check-group">
            <label>
              <input type="checkbox" id="include_folder_tree" />
              Include Folder Tree
            </label>
            <div class="help">Whether to include the project's folder tree.</div>
            <label>
              <input type="checkbox" id="include_python_code_outline" />
              Include Python Code Outline
            </label>
            <div class="help">Whether to include a simple outline of the project's python code.</div>
          </div>

          <div class="field">
            <label class="title" for="diagram_category">Select Diagram Category</label>
            <select id="diagram_category"></select>
          </div>

          <div class="field">
            <span class="title">Diagram Option</span>
            <div id="diagram_option" class="radio-group"></div>
            <div class="field-error" data-error-for="diagram_option"></div>
          </div>

          <div class="field">
            <label class="title" for="llm_vendor_for_instructions">Select LLM Vendor for Instructions</label>
            <select id="llm_vendor_for_instructions"></select>
          </div>

          <div class="field">
            <span class="title">Model</span>
            <div id="llm_model_for_instructions" class="radio-group"></div>
            <div class="field-error" data-error-for="llm_model_for_instructions"></div>
          </div>

          <div class="actions">
            <button id="prepare" class="btn primary" type="button">Prepare Design Instructions</button>
            <button id="cancel" class="btn" type="button">Cancel</button>
          </div>
          <div id="status" class="status"></div>
        </div>

        <div id="resultPane" style="display: none">
          <div class="result-title">Design Instructions</div>
          <div id="result" class="result"></div>
          <div class="copy-row">
            <button id="copy" class="btn" type="button">Copy All Content</button>
          </div>
        </div>
      </div>
    </section>
  </main>

  <script>
    const state = {
      values: null,
      errors: {},
      fullText: "",
    };

    function setStatus(message) {
      document.getElementById("status").textContent = message || "";
    }

    async function apiGet(path) {
      const res = await fetch(path, { method: "GET" });
      const data = await res.json();
      if (!res.ok || !data.ok) {
        throw new Error(data.error || "request failed");
      }
      return data;
    }

    async function apiPost(path, body) {
      const res = await fetch(path, {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify(body || {}),
      });
      const data = await res.json();
      if (!res.ok || !data.ok) {
        throw new Error(data.error || "request failed");
      }
      return data;
    }

    async function changeField(field, value) {
      try {
        const data = await apiPost("/app/field-change", { field, value });
        applySnapshot(data);
        setStatus("");
      } catch (err) {
        setStatus(`Save error: ${err.message}`);
      }
    }

    function fillSelect(id, options, selected) {
      const select = document.getElementById(id);
      select.innerHTML = "";
      for (const opt of options) {
        const option = document.createElement("option");
        option.value = opt.id;
        option.textContent = opt.label;
        if (opt.id === selected) {
          option.selected = true;
        }
        select.appendChild(option);
      }
    }

    function fillRadios(id, options, selected) {
      const root = document.getElementById(id);
      root.innerHTML = "";
      for (const opt of options) {
        const label = document.createElement("label");
        const radio = document.createElement("input");
        radio.type = "radio";
        radio.name = id;
        radio.value = opt.id;
        radio.checked = opt.id === selected;
        radio.addEventListener("change", () => changeField(id, opt.id));
        label.appendChild(radio);
        label.appendChild(document.createTextNode(opt.label));
        root.appendChild(label);
      }
    }

    function renderErrors() {
      for (const node of document.querySelectorAll("[data-error-for]")) {
        const field = node.getAttribute("data-error-for");
        node.textContent = state.errors[field] || "";
      }
    }

    function applySnapshot(data) {
      state.values = data.values;
      state.errors = data.errors || {};
      state.fullText = data.full_text || "";

      fillSelect("source_folder_option", data.source_folder_options, data.values.source_folder_option);
      fillSelect("diagram_category", data.diagram_category_options, data.values.diagram_category);
      fillRadios("diagram_option", data.diagram_options, data.values.diagram_option);
      fillSelect("llm_vendor_for_instructions", data.llm_vendor_options, data.values.llm_vendor_for_instructions);
      fillRadios("llm_model_for_instructions", data.model_options, data.values.llm_model_for_instructions);

      const ignoreInput = document.getElementById("git_ignore_file_path");
      if (document.activeElement !== ignoreInput) {
        ignoreInput.value = data.values.git_ignore_file_path;
      }
      document.getElementById("include_folder_tree").checked = data.values.include_folder_tree;
      document.getElementById("include_python_code_outline").checked = data.values.include_python_code_outline;

      const pane = document.getElementById("resultPane");
      if (state.fullText) {
        pane.style.display = "";
        document.getElementById("result").innerHTML = data.instructions_html;
      } else {
        pane.style.display = "none";
        document.getElementById("result").innerHTML = "";
      }

      renderErrors();
    }

    for (const id of ["source_folder_option", "diagram_category", "llm_vendor_for_instructions"]) {
      document.getElementById(id).addEventListener("change", (event) => {
        changeField(id, event.target.value);
      });
    }

    document.getElementById("git_ignore_file_path").addEventListener("input", (event) => {
      changeField("git_ignore_file_path", event.target.value);
    });

    for (const id of ["include_folder_tree", "include_python_code_outline"]) {
      document.getElementById(id).addEventListener("change", (event) => {
        changeField(id, event.target.checked);
      });
    }

    document.getElementById("prepare").addEventListener("click", async () => {
      try {
        setStatus("Preparing design instructions...");
        const data = await apiPost("/app/prepare", {});
        applySnapshot(data);
        setStatus("");
      } catch (err) {
        setStatus(`Prepare failed: ${err.message}`);
      }
    });

    document.getElementById("cancel").addEventListener("click", async () => {
      try {
        const data = await apiPost("/app/reset", {});
        applySnapshot(data);
        setStatus("");
      } catch (err) {
        setStatus(`Reset failed: ${err.message}`);
      }
    });

    document.getElementById("copy").addEventListener("click", async () => {
      if (!state.fullText) {
        return;
      }
      try {
        await navigator.clipboard.writeText(state.fullText);
        setStatus("All content copied to clipboard.");
      } catch (err) {
        setStatus(`Copy failed: ${err.message}`);
      }
    });

    async function init() {
      try {
        const data = await apiGet("/app/init");
        applySnapshot(data);
        document.getElementById("loading").style.display = "none";
        document.getElementById("form").style.display = "";
      } catch (err) {
        document.getElementById("loading").textContent = `Startup error: ${err.message}`;
      }
    }

    init();
  </script>
</body>
</html>
"#;
