use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use toml::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionDescriptor {
    pub id: String,
    pub label: String,
}

/// Parent key -> ordered selectable options for that key. Read-only once
/// loaded; the form never mutates the catalog.
pub type OptionMap = BTreeMap<String, Vec<OptionDescriptor>>;

#[derive(Debug, Clone)]
pub struct Catalog {
    pub diagram_category_options: Vec<OptionDescriptor>,
    pub diagram_categories: OptionMap,
    pub default_diagram_category: String,
    pub llm_vendor_options: Vec<OptionDescriptor>,
    pub llm_vendors: OptionMap,
    pub source_folder_options: Vec<OptionDescriptor>,
    pub server_port: u16,
    pub backend_base_url: String,
}

/// Options registered under `key`, or an empty slice when the key is absent.
/// Absence is a valid state, not an error.
pub fn resolve_dependent_options<'a>(key: &str, map: &'a OptionMap) -> &'a [OptionDescriptor] {
    map.get(key).map(Vec::as_slice).unwrap_or(&[])
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow!("catalog config not found: {}", path.display()));
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog config: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("failed to parse catalog config: {}", path.display()))
    }

    /// Loads `path` when it exists, otherwise the built-in catalog.
    pub fn load_or_built_in(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Self::built_in()
        }
    }

    pub fn built_in() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CATALOG_TOML).context("built-in catalog is invalid")
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let doc: Value = toml::from_str(text).context("failed to parse TOML")?;
        let root = doc
            .as_table()
            .ok_or_else(|| anyhow!("catalog root must be a table"))?;

        let app = root.get("app").and_then(Value::as_table);
        let server_port = app
            .and_then(|t| t.get("server_port"))
            .and_then(Value::as_integer)
            .and_then(|v| u16::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(3000);
        let backend_base_url = app
            .and_then(|t| t.get("backend_base_url"))
            .and_then(Value::as_str)
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "http://localhost:8000".to_string());

        let (diagram_category_options, diagram_categories) = read_option_groups(
            root.get("diagram")
                .and_then(Value::as_table)
                .and_then(|t| t.get("categories")),
            "options",
        );
        if diagram_category_options.is_empty() {
            return Err(anyhow!("catalog defines no diagram categories"));
        }

        let requested_default = root
            .get("diagram")
            .and_then(Value::as_table)
            .and_then(|t| t.get("default_category"))
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        let default_diagram_category = if diagram_categories.contains_key(requested_default) {
            requested_default.to_string()
        } else {
            diagram_category_options[0].id.clone()
        };

        let (llm_vendor_options, llm_vendors) = read_option_groups(
            root.get("llm")
                .and_then(Value::as_table)
                .and_then(|t| t.get("vendors")),
            "models",
        );
        if llm_vendor_options.is_empty() {
            return Err(anyhow!("catalog defines no llm vendors"));
        }

        let source_folder_options = root
            .get("source")
            .and_then(Value::as_table)
            .and_then(|t| t.get("folders"))
            .map(read_descriptor_list)
            .unwrap_or_default();

        Ok(Self {
            diagram_category_options,
            diagram_categories,
            default_diagram_category,
            llm_vendor_options,
            llm_vendors,
            source_folder_options,
            server_port,
            backend_base_url,
        })
    }
}

/// Reads an array-of-tables of `{ id, label, <child_key> = [...] }` into the
/// ordered parent descriptors plus the parent -> children map. Entries with
/// an empty id and duplicate ids are dropped.
fn read_option_groups(
    value: Option<&Value>,
    child_key: &str,
) -> (Vec<OptionDescriptor>, OptionMap) {
    let mut parents = Vec::new();
    let mut map = OptionMap::new();

    let Some(groups) = value.and_then(Value::as_array) else {
        return (parents, map);
    };

    for group_value in groups {
        let Some(group) = group_value.as_table() else {
            continue;
        };
        let id = group
            .get("id")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if id.is_empty() || map.contains_key(&id) {
            continue;
        }

        let label = group
            .get("label")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| id.clone());

        let children = group
            .get(child_key)
            .map(read_descriptor_list)
            .unwrap_or_default();

        parents.push(OptionDescriptor {
            id: id.clone(),
            label,
        });
        map.insert(id, children);
    }

    (parents, map)
}

/// Accepts `["id", ...]` or `[{ id, label }, ...]`, normalized and deduped.
fn read_descriptor_list(value: &Value) -> Vec<OptionDescriptor> {
    let mut descriptors: Vec<OptionDescriptor> = Vec::new();
    let Some(items) = value.as_array() else {
        return descriptors;
    };

    for item in items {
        let (id, label) = match item {
            Value::String(s) => (s.trim().to_string(), s.trim().to_string()),
            Value::Table(table) => {
                let id = table
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string();
                let label = table
                    .get("label")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToOwned::to_owned)
                    .unwrap_or_else(|| id.clone());
                (id, label)
            }
            _ => continue,
        };

        if id.is_empty() || descriptors.iter().any(|d| d.id == id) {
            continue;
        }
        descriptors.push(OptionDescriptor { id, label });
    }

    descriptors
}

pub const DEFAULT_CATALOG_TOML: &str = r#"
[app]
server_port = 3000
backend_base_url = "http://localhost:8000"

[source]
folders = ["./", "./app", "./src"]

[diagram]
default_category = "flowchart"

[[diagram.categories]]
id = "flowchart"
label = "Flowchart"
options = [
  { id = "basic_flowchart", label = "Basic Flowchart" },
  { id = "decision_flowchart", label = "Decision Flowchart" },
  { id = "subgraph_flowchart", label = "Flowchart with Subgraphs" },
]

[[diagram.categories]]
id = "sequence"
label = "Sequence Diagram"
options = [
  { id = "basic_sequence", label = "Basic Sequence Diagram" },
  { id = "loop_sequence", label = "Sequence Diagram with Loops" },
  { id = "alt_sequence", label = "Sequence Diagram with Alternatives" },
]

[[diagram.categories]]
id = "class"
label = "Class Diagram"
options = [
  { id = "basic_class", label = "Basic Class Diagram" },
  { id = "inheritance_class", label = "Class Diagram with Inheritance" },
]

[[diagram.categories]]
id = "state"
label = "State Diagram"
options = [
  { id = "basic_state", label = "Basic State Diagram" },
  { id = "composite_state", label = "State Diagram with Composite States" },
]

[[diagram.categories]]
id = "entity_relationship"
label = "Entity Relationship Diagram"
options = [
  { id = "basic_er", label = "Basic ER Diagram" },
  { id = "attribute_er", label = "ER Diagram with Attributes" },
]

[[diagram.categories]]
id = "gantt"
label = "Gantt Chart"
options = [
  { id = "basic_gantt", label = "Basic Gantt Chart" },
  { id = "milestone_gantt", label = "Gantt Chart with Milestones" },
]

[[diagram.categories]]
id = "mindmap"
label = "Mindmap"
options = [{ id = "basic_mindmap", label = "Basic Mindmap" }]

[[llm.vendors]]
id = "openai"
label = "OpenAI"
models = [
  { id = "gpt-3.5-turbo", label = "GPT-3.5 Turbo" },
  { id = "gpt-4", label = "GPT-4" },
  { id = "gpt-4-32k", label = "GPT-4 32k" },
]

[[llm.vendors]]
id = "anthropic"
label = "Anthropic"
models = [
  { id = "claude-2", label = "Claude 2" },
  { id = "claude-instant-1", label = "Claude Instant" },
]
"#;
