//! Machine model documents.
//!
//! The legacy per-category schemas share one large field union: every
//! category stores the common trio (model name, short and detailed technical
//! description) plus whichever spec fields apply to it, with `"*"` standing
//! in for "not applicable". The union is kept as a single document type so
//! all eleven category tables speak the same shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BobbinError, Result};

fn star() -> String {
    "*".to_string()
}

/// A machine model document, as submitted by clients.
///
/// String spec fields default to `"*"`, booleans to `false`, numbers to
/// `0.0` and `subModels` to `[]`. `series` (the parent series id) is the
/// only field without a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelDocument {
    #[serde(default = "star")]
    pub model: String,
    #[serde(default = "star")]
    pub technical_description: String,
    #[serde(default = "star")]
    pub detailed_technical_description: String,

    // Stitching specs
    #[serde(default = "star")]
    pub functions: String,
    #[serde(default = "star")]
    pub needle_type: String,
    #[serde(default)]
    pub needle_feed: bool,
    #[serde(default)]
    pub needle_no: f64,
    #[serde(default = "star")]
    pub thread_no: String,
    #[serde(default = "star")]
    pub stitch_length: String,
    #[serde(default = "star")]
    pub stitch_width: String,
    #[serde(default)]
    pub stitch_length_range: f64,
    #[serde(default = "star")]
    pub double_needle_stitch_length: String,
    #[serde(default = "star")]
    pub needle_bar_stroke: String,
    #[serde(default = "star")]
    pub lift_height_range: String,
    #[serde(default = "star")]
    pub differential_ratio: String,
    #[serde(default)]
    pub has_auto_thread_trimmer: bool,
    #[serde(default)]
    pub has_auto_lift: bool,
    #[serde(default)]
    pub horizontal_hook: bool,
    #[serde(default)]
    pub vertical_hook: bool,

    // Material suitability
    #[serde(default)]
    pub is_suitable_for_light_material: bool,
    #[serde(default)]
    pub is_suitable_for_medium_material: bool,
    #[serde(default)]
    pub is_suitable_for_heavy_material: bool,

    // Cutting and fusing specs
    #[serde(default = "star")]
    pub table_size: String,
    #[serde(default = "star")]
    pub cutting_height: String,
    #[serde(default = "star")]
    pub arm_size: String,
    #[serde(default = "star")]
    pub knife_size: String,
    #[serde(default = "star")]
    pub cutting_length: String,
    #[serde(default = "star")]
    pub maximum_cutting: String,
    #[serde(default = "star")]
    pub cutting_speed: String,
    #[serde(default = "star")]
    pub maximum_blade_temperature: String,
    #[serde(default = "star")]
    pub temperature: String,
    #[serde(default = "star")]
    pub pressure: String,
    #[serde(default = "star")]
    pub belt_speed: String,
    #[serde(default = "star")]
    pub heating_time: String,
    #[serde(default = "star")]
    pub fusing_width: String,
    #[serde(default = "star")]
    pub recommended_air_pressure: String,

    // Power and electrics
    #[serde(default = "star")]
    pub voltage: String,
    #[serde(default = "star")]
    pub voltage_v: String,
    #[serde(default = "star")]
    pub frequency_hz: String,
    #[serde(default = "star")]
    pub power_kw: String,
    #[serde(default = "star")]
    pub power_supply: String,
    #[serde(default = "star")]
    pub rated_output: String,
    // Legacy wire name capitalizes the acronym.
    #[serde(default, rename = "speedInRPM")]
    pub speed_in_rpm: f64,
    #[serde(default)]
    pub oil: bool,

    // Physical dimensions
    #[serde(default = "star")]
    pub dimension: String,
    #[serde(default = "star")]
    pub weight: String,
    #[serde(default = "star")]
    pub net_weight: String,
    #[serde(default = "star")]
    pub packing_size: String,
    #[serde(default = "star")]
    pub package_size: String,

    // Media and references
    #[serde(default = "star")]
    pub image: String,
    /// Parent series id.
    pub series: String,
    #[serde(default)]
    pub sub_models: Vec<SubModel>,
}

/// A named sub-variant of a model. Spec fields differ per category, so
/// anything beyond the variant name is carried as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SubModel {
    #[serde(default = "star")]
    pub model: String,
    #[serde(flatten)]
    pub specs: Map<String, Value>,
}

impl ModelDocument {
    /// Check the fields the legacy schemas mark required.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("model", &self.model),
            ("technicalDescription", &self.technical_description),
            ("detailedTechnicalDescription", &self.detailed_technical_description),
        ] {
            if value.trim().is_empty() {
                return Err(BobbinError::Validation {
                    field: field.into(),
                    message: "must not be empty".into(),
                });
            }
        }
        if self.series.trim().is_empty() {
            return Err(BobbinError::Validation {
                field: "series".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Apply a partial update: fields present in `patch` replace stored
    /// values, everything else is kept.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<ModelDocument> {
        let mut value = serde_json::to_value(self)?;
        let object = value
            .as_object_mut()
            .ok_or_else(|| BobbinError::Other("document did not serialize to an object".into()))?;
        for (key, patch_value) in patch {
            object.insert(key.clone(), patch_value.clone());
        }
        let merged: ModelDocument = serde_json::from_value(value)?;
        merged.validate()?;
        Ok(merged)
    }
}

/// A persisted model document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredModel {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(flatten)]
    pub document: ModelDocument,
}
