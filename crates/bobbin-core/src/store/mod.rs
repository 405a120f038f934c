//! SQLite-backed catalog storage and reference reconciliation.

pub mod catalog;
pub mod reconcile;

pub use catalog::CatalogStore;
pub use reconcile::{reconcile, ReconcileReport};
