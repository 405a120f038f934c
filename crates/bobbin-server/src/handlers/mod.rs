//! REST request handlers.

pub mod maintenance;
pub mod models;
pub mod series;
