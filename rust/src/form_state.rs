use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::cascade::{apply_parent_change, CascadeField};
use crate::catalog::Catalog;
use crate::form_values::FormValues;
use crate::kv_store::KvStore;
use crate::{HYDRATION_EXEMPT_FIELDS, STORAGE_KEY};

/// In-memory form state mirrored into the injected store. `baseline` is the
/// snapshot hydration produced; any divergence from it marks the session
/// dirty and triggers a full overwrite of the stored record.
pub struct FormSession {
    values: FormValues,
    baseline: FormValues,
    store: Box<dyn KvStore + Send>,
}

impl FormSession {
    /// Builds the session from storage. Stored fields overlay the catalog
    /// defaults, except the hydration-exempt ones, which keep their defaults
    /// so stale generated output is not reloaded as if it were live.
    pub fn hydrate(store: Box<dyn KvStore + Send>, catalog: &Catalog) -> Self {
        let defaults = FormValues::defaults(catalog);
        let values = match store.get(STORAGE_KEY) {
            Some(stored) => overlay_stored(&defaults, &stored),
            None => defaults.clone(),
        };

        Self {
            baseline: values.clone(),
            values,
            store,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn dirty(&self) -> bool {
        self.values != self.baseline
    }

    /// Applies one user-triggered field change. Parent fields of a cascade
    /// also reset their dependent field within the same transition. Every
    /// accepted transition ends with persist-if-dirty.
    pub fn change_field(&mut self, name: &str, value: &Value, catalog: &Catalog) -> Result<()> {
        if let Some(cascade) = CascadeField::from_parent_name(name) {
            let key = expect_str(name, value)?;
            let map = match cascade {
                CascadeField::DiagramCategory => &catalog.diagram_categories,
                CascadeField::LlmVendor => &catalog.llm_vendors,
            };
            apply_parent_change(&mut self.values, cascade, key, map);
            return self.persist_if_dirty();
        }

        match name {
            "source_folder_option" => {
                self.values.source_folder_option = expect_str(name, value)?.to_string();
            }
            "git_ignore_file_path" => {
                self.values.git_ignore_file_path = expect_str(name, value)?.to_string();
            }
            "diagram_option" => {
                self.values.diagram_option = expect_str(name, value)?.to_string();
            }
            "llm_model_for_instructions" => {
                self.values.llm_model_for_instructions = expect_str(name, value)?.to_string();
            }
            "include_folder_tree" => {
                self.values.include_folder_tree = expect_bool(name, value)?;
            }
            "include_python_code_outline" => {
                self.values.include_python_code_outline = expect_bool(name, value)?;
            }
            "design_instructions" => {
                self.values.design_instructions = expect_str(name, value)?.to_string();
            }
            other => return Err(anyhow!("unknown field: {other}")),
        }

        self.persist_if_dirty()
    }

    /// Write path for the backend result. Same post-condition as any other
    /// field change.
    pub fn set_design_instructions(&mut self, text: String) -> Result<()> {
        self.values.design_instructions = text;
        self.persist_if_dirty()
    }

    /// Cancel action: back to catalog defaults.
    pub fn reset(&mut self, catalog: &Catalog) -> Result<()> {
        self.values = FormValues::defaults(catalog);
        self.persist_if_dirty()
    }

    fn persist_if_dirty(&mut self) -> Result<()> {
        if !self.dirty() {
            return Ok(());
        }

        let snapshot = serde_json::to_value(&self.values)?;
        self.store.set(STORAGE_KEY, &snapshot)?;
        tracing::debug!(key = STORAGE_KEY, "persisted form values");
        Ok(())
    }
}

/// Field-by-field overlay of the stored object onto the defaults, skipping
/// exempt fields and anything the current record does not know. A snapshot
/// that no longer deserializes falls back to pure defaults.
fn overlay_stored(defaults: &FormValues, stored: &Value) -> FormValues {
    let Value::Object(stored) = stored else {
        tracing::warn!("stored form values are not an object; using defaults");
        return defaults.clone();
    };

    let mut merged = match serde_json::to_value(defaults) {
        Ok(Value::Object(map)) => map,
        _ => return defaults.clone(),
    };

    for (field, value) in stored {
        if HYDRATION_EXEMPT_FIELDS.contains(&field.as_str()) {
            continue;
        }
        if merged.contains_key(field) {
            merged.insert(field.clone(), value.clone());
        }
    }

    match serde_json::from_value(Value::Object(merged)) {
        Ok(values) => values,
        Err(err) => {
            tracing::warn!(%err, "stored form values are unusable; using defaults");
            defaults.clone()
        }
    }
}

fn expect_str<'a>(name: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| anyhow!("field {name} expects a string"))
}

fn expect_bool(name: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| anyhow!("field {name} expects a boolean"))
}

#[cfg(test)]
mod tests {
    use super::FormSession;
    use crate::catalog::Catalog;
    use crate::form_values::FormValues;
    use crate::kv_store::{JsonFileStore, KvStore, MemoryStore};
    use crate::STORAGE_KEY;
    use serde_json::json;
    use std::path::PathBuf;

    fn catalog() -> Catalog {
        Catalog::built_in().expect("built-in catalog")
    }

    fn file_session(path: PathBuf, catalog: &Catalog) -> FormSession {
        let store = JsonFileStore::load(path).expect("load store");
        FormSession::hydrate(Box::new(store), catalog)
    }

    #[test]
    fn hydrates_defaults_when_storage_is_empty() {
        let catalog = catalog();
        let session = FormSession::hydrate(Box::new(MemoryStore::new()), &catalog);
        assert_eq!(*session.values(), FormValues::defaults(&catalog));
        assert!(!session.dirty());
    }

    #[test]
    fn round_trip_preserves_everything_but_exempt_fields() {
        let catalog = catalog();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("form_state.json");

        {
            let mut session = file_session(path.clone(), &catalog);
            session
                .change_field("diagram_category", &json!("sequence"), &catalog)
                .expect("category change");
            session
                .change_field("git_ignore_file_path", &json!(".gitignore"), &catalog)
                .expect("path change");
            session
                .change_field("include_folder_tree", &json!(false), &catalog)
                .expect("flag change");
            session
                .set_design_instructions("# stale output".to_string())
                .expect("instructions");
        }

        let rehydrated = file_session(path, &catalog);
        let values = rehydrated.values();
        assert_eq!(values.diagram_category, "sequence");
        assert_eq!(values.diagram_option, "basic_sequence");
        assert_eq!(values.git_ignore_file_path, ".gitignore");
        assert!(!values.include_folder_tree);
        // exempt: stored but not seeded back
        assert_eq!(values.design_instructions, "");
    }

    #[test]
    fn exempt_field_is_still_written_to_storage() {
        let catalog = catalog();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("form_state.json");

        {
            let mut session = file_session(path.clone(), &catalog);
            session
                .set_design_instructions("# Title\n- item".to_string())
                .expect("instructions");
        }

        let store = JsonFileStore::load(path).expect("reload store");
        let stored = store.get(STORAGE_KEY).expect("stored record");
        assert_eq!(stored["design_instructions"], json!("# Title\n- item"));
    }

    #[test]
    fn category_change_resets_option_and_persists() {
        let catalog = catalog();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("form_state.json");

        let mut session = file_session(path.clone(), &catalog);
        session
            .change_field("diagram_category", &json!("gantt"), &catalog)
            .expect("category change");
        assert_eq!(session.values().diagram_option, "basic_gantt");

        let store = JsonFileStore::load(path).expect("reload store");
        let stored = store.get(STORAGE_KEY).expect("stored record");
        assert_eq!(stored["diagram_category"], json!("gantt"));
        assert_eq!(stored["diagram_option"], json!("basic_gantt"));
    }

    #[test]
    fn rejects_unknown_fields_and_wrong_types() {
        let catalog = catalog();
        let mut session = FormSession::hydrate(Box::new(MemoryStore::new()), &catalog);

        assert!(session
            .change_field("not_a_field", &json!("x"), &catalog)
            .is_err());
        assert!(session
            .change_field("include_folder_tree", &json!("yes"), &catalog)
            .is_err());
    }

    #[test]
    fn reset_returns_to_defaults() {
        let catalog = catalog();
        let mut session = FormSession::hydrate(Box::new(MemoryStore::new()), &catalog);
        session
            .change_field("diagram_category", &json!("class"), &catalog)
            .expect("category change");
        assert!(session.dirty());

        session.reset(&catalog).expect("reset");
        assert_eq!(*session.values(), FormValues::defaults(&catalog));
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_defaults() {
        let catalog = catalog();
        let mut store = MemoryStore::new();
        store
            .set(STORAGE_KEY, &json!({ "include_folder_tree": "not-a-bool" }))
            .expect("seed store");

        let session = FormSession::hydrate(Box::new(store), &catalog);
        assert_eq!(*session.values(), FormValues::defaults(&catalog));
    }
}
