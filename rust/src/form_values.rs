use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{resolve_dependent_options, Catalog};

/// The complete form record. Field names double as the wire format: this is
/// what gets persisted under the storage key and POSTed to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormValues {
    pub source_folder_option: String,
    pub git_ignore_file_path: String,
    pub diagram_category: String,
    pub diagram_option: String,
    pub include_folder_tree: bool,
    pub include_python_code_outline: bool,
    pub llm_vendor_for_instructions: String,
    pub llm_model_for_instructions: String,
    pub design_instructions: String,
}

impl FormValues {
    pub fn defaults(catalog: &Catalog) -> Self {
        let diagram_category = catalog.default_diagram_category.clone();
        let diagram_option = first_option_id(&diagram_category, &catalog.diagram_categories);

        let llm_vendor = catalog
            .llm_vendor_options
            .first()
            .map(|v| v.id.clone())
            .unwrap_or_default();
        let llm_model = first_option_id(&llm_vendor, &catalog.llm_vendors);

        Self {
            source_folder_option: catalog
                .source_folder_options
                .first()
                .map(|o| o.id.clone())
                .unwrap_or_default(),
            git_ignore_file_path: String::new(),
            diagram_category,
            diagram_option,
            include_folder_tree: true,
            include_python_code_outline: true,
            llm_vendor_for_instructions: llm_vendor,
            llm_model_for_instructions: llm_model,
            design_instructions: String::new(),
        }
    }

    /// Per-field validation messages, keyed by field name. An empty map means
    /// the record is submittable. Errors never block editing other fields.
    pub fn validate(&self, catalog: &Catalog) -> BTreeMap<&'static str, String> {
        let mut errors = BTreeMap::new();

        if self.source_folder_option.trim().is_empty() {
            errors.insert(
                "source_folder_option",
                "Please select a source folder".to_string(),
            );
        }

        let diagram_options =
            resolve_dependent_options(&self.diagram_category, &catalog.diagram_categories);
        if !diagram_options.iter().any(|o| o.id == self.diagram_option) {
            errors.insert(
                "diagram_option",
                "Please select a diagram option".to_string(),
            );
        }

        let models = resolve_dependent_options(
            &self.llm_vendor_for_instructions,
            &catalog.llm_vendors,
        );
        if !models
            .iter()
            .any(|m| m.id == self.llm_model_for_instructions)
        {
            errors.insert(
                "llm_model_for_instructions",
                "Please select a model".to_string(),
            );
        }

        errors
    }
}

fn first_option_id(key: &str, map: &crate::catalog::OptionMap) -> String {
    resolve_dependent_options(key, map)
        .first()
        .map(|o| o.id.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::FormValues;
    use crate::catalog::Catalog;

    #[test]
    fn defaults_respect_catalog_ordering() {
        let catalog = Catalog::built_in().expect("built-in catalog");
        let values = FormValues::defaults(&catalog);

        assert_eq!(values.diagram_category, "flowchart");
        assert_eq!(values.diagram_option, "basic_flowchart");
        assert_eq!(values.llm_vendor_for_instructions, "openai");
        assert_eq!(values.llm_model_for_instructions, "gpt-3.5-turbo");
        assert!(values.include_folder_tree);
        assert!(values.include_python_code_outline);
        assert!(values.design_instructions.is_empty());
    }

    #[test]
    fn defaults_pass_validation() {
        let catalog = Catalog::built_in().expect("built-in catalog");
        let values = FormValues::defaults(&catalog);
        assert!(values.validate(&catalog).is_empty());
    }

    #[test]
    fn mismatched_dependents_produce_field_errors() {
        let catalog = Catalog::built_in().expect("built-in catalog");
        let mut values = FormValues::defaults(&catalog);
        values.diagram_option = "basic_sequence".to_string();
        values.llm_model_for_instructions = "not-a-model".to_string();
        values.source_folder_option = " ".to_string();

        let errors = values.validate(&catalog);
        assert!(errors.contains_key("diagram_option"));
        assert!(errors.contains_key("llm_model_for_instructions"));
        assert!(errors.contains_key("source_folder_option"));
    }
}
