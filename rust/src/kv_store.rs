use anyhow::{anyhow, Context, Result};
use chrono::Local;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

/// Durable key/value storage for form state. Injected into the form session
/// so the persistence mechanism stays swappable; never accessed as an
/// ambient singleton.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: &Value) -> Result<()>;
}

/// One JSON document on disk. Every `set` rewrites the whole file and stamps
/// a `saved_at` field alongside the stored keys.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    doc: Map<String, Value>,
}

impl JsonFileStore {
    pub fn load(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                path,
                doc: Map::new(),
            });
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read state file: {}", path.display()))?;
        let parsed: Value = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse state file: {}", path.display()))?;
        let Value::Object(doc) = parsed else {
            return Err(anyhow!("state file root must be an object: {}", path.display()));
        };

        Ok(Self { path, doc })
    }

    fn save(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&Value::Object(self.doc.clone()))
            .context("failed to serialize state")?;
        fs::write(&self.path, text + "\n")
            .with_context(|| format!("failed to write state file: {}", self.path.display()))
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.doc.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        self.doc.insert(key.to_string(), value.clone());
        self.doc.insert(
            "saved_at".to_string(),
            Value::String(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        );
        self.save()
    }
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Map<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.doc.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        self.doc.insert(key.to_string(), value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonFileStore, KvStore};
    use serde_json::json;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::load(dir.path().join("state.json")).expect("load");
        assert!(store.get("formValues").is_none());
    }

    #[test]
    fn set_then_reload_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");

        let mut store = JsonFileStore::load(path.clone()).expect("load");
        store
            .set("formValues", &json!({ "diagram_category": "sequence" }))
            .expect("set");

        let reloaded = JsonFileStore::load(path).expect("reload");
        assert_eq!(
            reloaded.get("formValues"),
            Some(json!({ "diagram_category": "sequence" }))
        );
        assert!(reloaded.get("saved_at").is_some());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").expect("write fixture");

        assert!(JsonFileStore::load(path).is_err());
    }
}
