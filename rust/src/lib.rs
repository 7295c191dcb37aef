pub mod app;
pub mod backend;
pub mod cascade;
pub mod catalog;
pub mod form_state;
pub mod form_values;
pub mod kv_store;
pub mod main_ui_html;
pub mod markdown;
pub mod path_utils;
pub mod server;

pub const STORAGE_KEY: &str = "formValues";

/// Fields written to storage on every save but never seeded back as initial
/// values on the next hydration.
pub const HYDRATION_EXEMPT_FIELDS: &[&str] = &["design_instructions"];
