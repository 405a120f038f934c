//! Series documents.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{BobbinError, Result};

fn star() -> String {
    "*".to_string()
}

/// A product series: a named group of machine models from one category.
///
/// `models` holds ids into the category's model table. The reconciliation
/// sweep keeps that list consistent; nothing else enforces it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,
    pub model_type: Category,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default = "star")]
    pub image: String,
}

impl Series {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BobbinError::Validation {
                field: "name".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// A persisted series document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSeries {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(flatten)]
    pub series: Series,
}
