use crate::catalog::{resolve_dependent_options, OptionMap};
use crate::form_values::FormValues;

/// The two parent/child field pairs that cascade: changing the parent resets
/// the child to the first option valid under the new parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeField {
    DiagramCategory,
    LlmVendor,
}

impl CascadeField {
    pub fn parent_name(self) -> &'static str {
        match self {
            Self::DiagramCategory => "diagram_category",
            Self::LlmVendor => "llm_vendor_for_instructions",
        }
    }

    pub fn child_name(self) -> &'static str {
        match self {
            Self::DiagramCategory => "diagram_option",
            Self::LlmVendor => "llm_model_for_instructions",
        }
    }

    pub fn from_parent_name(name: &str) -> Option<Self> {
        match name {
            "diagram_category" => Some(Self::DiagramCategory),
            "llm_vendor_for_instructions" => Some(Self::LlmVendor),
            _ => None,
        }
    }

    fn set_parent(self, values: &mut FormValues, key: String) {
        match self {
            Self::DiagramCategory => values.diagram_category = key,
            Self::LlmVendor => values.llm_vendor_for_instructions = key,
        }
    }

    fn set_child(self, values: &mut FormValues, option_id: String) {
        match self {
            Self::DiagramCategory => values.diagram_option = option_id,
            Self::LlmVendor => values.llm_model_for_instructions = option_id,
        }
    }
}

/// Sets the parent field to `new_key`, then the child field to the first
/// option registered under `new_key`, or clears the child when nothing is
/// registered. Both writes land in the same transition, so the dependent
/// field is never left pointing at an option from the previous parent.
pub fn apply_parent_change(
    values: &mut FormValues,
    cascade: CascadeField,
    new_key: &str,
    map: &OptionMap,
) {
    let first_child = resolve_dependent_options(new_key, map)
        .first()
        .map(|o| o.id.clone())
        .unwrap_or_default();

    cascade.set_parent(values, new_key.to_string());
    cascade.set_child(values, first_child);
}

#[cfg(test)]
mod tests {
    use super::{apply_parent_change, CascadeField};
    use crate::catalog::{Catalog, OptionDescriptor, OptionMap};
    use crate::form_values::FormValues;

    fn option_map(entries: &[(&str, &[&str])]) -> OptionMap {
        entries
            .iter()
            .map(|(key, ids)| {
                let options = ids
                    .iter()
                    .map(|id| OptionDescriptor {
                        id: (*id).to_string(),
                        label: (*id).to_string(),
                    })
                    .collect();
                ((*key).to_string(), options)
            })
            .collect()
    }

    fn base_values() -> FormValues {
        let catalog = Catalog::built_in().expect("built-in catalog");
        FormValues::defaults(&catalog)
    }

    #[test]
    fn category_change_selects_first_option_of_new_category() {
        let map = option_map(&[
            ("flowchart", &["start", "end"][..]),
            ("sequence", &["actor1", "actor2"][..]),
        ]);
        let mut values = base_values();
        values.diagram_category = "flowchart".to_string();
        values.diagram_option = "start".to_string();

        apply_parent_change(&mut values, CascadeField::DiagramCategory, "sequence", &map);

        assert_eq!(values.diagram_category, "sequence");
        assert_eq!(values.diagram_option, "actor1");
    }

    #[test]
    fn every_key_lands_on_its_first_option() {
        let catalog = Catalog::built_in().expect("built-in catalog");
        for parent in &catalog.diagram_category_options {
            let mut values = FormValues::defaults(&catalog);
            apply_parent_change(
                &mut values,
                CascadeField::DiagramCategory,
                &parent.id,
                &catalog.diagram_categories,
            );
            let expected = catalog.diagram_categories[&parent.id]
                .first()
                .map(|o| o.id.clone())
                .unwrap_or_default();
            assert_eq!(values.diagram_option, expected, "category {}", parent.id);
        }
    }

    #[test]
    fn absent_key_clears_the_dependent_field() {
        let map = option_map(&[("flowchart", &["start"][..])]);
        let mut values = base_values();
        values.diagram_option = "start".to_string();

        apply_parent_change(&mut values, CascadeField::DiagramCategory, "unknown", &map);

        assert_eq!(values.diagram_category, "unknown");
        assert_eq!(values.diagram_option, "");
    }

    #[test]
    fn vendor_change_is_idempotent() {
        let catalog = Catalog::built_in().expect("built-in catalog");
        let mut values = FormValues::defaults(&catalog);

        apply_parent_change(
            &mut values,
            CascadeField::LlmVendor,
            "anthropic",
            &catalog.llm_vendors,
        );
        let after_once = values.clone();

        apply_parent_change(
            &mut values,
            CascadeField::LlmVendor,
            "anthropic",
            &catalog.llm_vendors,
        );

        assert_eq!(values, after_once);
        assert_eq!(values.llm_model_for_instructions, "claude-2");
    }
}
