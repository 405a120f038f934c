//! Domain types for catalog documents.

pub mod document;
pub mod schema;
pub mod series;

pub use document::{ModelDocument, StoredModel, SubModel};
pub use schema::{schema_fields, FieldType};
pub use series::{Series, StoredSeries};
