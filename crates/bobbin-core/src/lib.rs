//! Bobbin Core - headless catalog library for sewing-machine product series.
//!
//! This crate stores per-category machine model documents and their parent
//! series in SQLite, and keeps the series → model reference lists consistent
//! with a reconciliation sweep. It can be used programmatically without the
//! HTTP layer; see the `bobbin-server` crate for the REST surface.
//!
//! # Example
//!
//! ```rust,ignore
//! use bobbin_core::{CatalogApi, Category};
//!
//! #[tokio::main]
//! async fn main() -> bobbin_core::Result<()> {
//!     let api = CatalogApi::new("/path/to/data")?;
//!
//!     let models = api.list_models(Category::Lockstitch).await?;
//!     println!("{} lockstitch models", models.len());
//!
//!     let report = api.reconcile().await?;
//!     println!("pruned {} dangling references", report.refs_pruned);
//!     Ok(())
//! }
//! ```

pub mod category;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod uploads;

mod api;

// Re-export commonly used types
pub use api::CatalogApi;
pub use category::Category;
pub use error::{BobbinError, Result};
pub use models::{
    schema_fields, FieldType, ModelDocument, Series, StoredModel, StoredSeries, SubModel,
};
pub use store::{CatalogStore, ReconcileReport};
pub use uploads::UploadStore;
