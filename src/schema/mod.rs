//! Schema translation, validation, and adapters into the schema IR.

pub mod json_schema;
pub mod translator;
pub mod validate;

pub use json_schema::from_json_schema;
pub use translator::translate;
