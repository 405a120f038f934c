//! Product category registry.
//!
//! Every machine model lives in exactly one category, and each category is
//! backed by its own table in the catalog store. Series documents carry a
//! category discriminator (`modelType` on the wire) that selects which table
//! their model references are validated against.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BobbinError, Result};

/// The eleven product categories.
///
/// Wire names follow the legacy catalog's `modelType` values, casing
/// included, so existing clients keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Lockstitch,
    Overlock,
    Interlock,
    HeavyDuty,
    SpecialSeries,
    Zigzag,
    CuttingSeries,
    #[serde(rename = "Cuttingmachine")]
    CuttingMachine,
    #[serde(rename = "Fusingmachine")]
    FusingMachine,
    #[serde(rename = "Heattransfer")]
    HeatTransfer,
    #[serde(rename = "Needledetector")]
    NeedleDetector,
}

impl Category {
    /// All categories, in registry order.
    pub const ALL: [Category; 11] = [
        Category::Lockstitch,
        Category::Overlock,
        Category::Interlock,
        Category::HeavyDuty,
        Category::SpecialSeries,
        Category::Zigzag,
        Category::CuttingSeries,
        Category::CuttingMachine,
        Category::FusingMachine,
        Category::HeatTransfer,
        Category::NeedleDetector,
    ];

    /// Wire identifier (the series `modelType` value).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Lockstitch => "Lockstitch",
            Category::Overlock => "Overlock",
            Category::Interlock => "Interlock",
            Category::HeavyDuty => "HeavyDuty",
            Category::SpecialSeries => "SpecialSeries",
            Category::Zigzag => "Zigzag",
            Category::CuttingSeries => "CuttingSeries",
            Category::CuttingMachine => "Cuttingmachine",
            Category::FusingMachine => "Fusingmachine",
            Category::HeatTransfer => "Heattransfer",
            Category::NeedleDetector => "Needledetector",
        }
    }

    /// Human-readable name for logs and listings.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Lockstitch => "Lockstitch",
            Category::Overlock => "Overlock",
            Category::Interlock => "Interlock",
            Category::HeavyDuty => "Heavy Duty",
            Category::SpecialSeries => "Special Series",
            Category::Zigzag => "Zigzag",
            Category::CuttingSeries => "Cutting Series",
            Category::CuttingMachine => "Cutting Machine",
            Category::FusingMachine => "Fusing Machine",
            Category::HeatTransfer => "Heat Transfer",
            Category::NeedleDetector => "Needle Detector",
        }
    }

    /// Backing table in the catalog store.
    pub fn table_name(&self) -> &'static str {
        match self {
            Category::Lockstitch => "models_lockstitch",
            Category::Overlock => "models_overlock",
            Category::Interlock => "models_interlock",
            Category::HeavyDuty => "models_heavy_duty",
            Category::SpecialSeries => "models_special_series",
            Category::Zigzag => "models_zigzag",
            Category::CuttingSeries => "models_cutting_series",
            Category::CuttingMachine => "models_cutting_machine",
            Category::FusingMachine => "models_fusing_machine",
            Category::HeatTransfer => "models_heat_transfer",
            Category::NeedleDetector => "models_needle_detector",
        }
    }

    /// Parse a wire identifier (`modelType` value), exact casing.
    pub fn from_wire(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| BobbinError::UnknownCategory(s.to_string()))
    }

    /// Parse a URL slug, case-insensitively (`heavyduty`, `HeavyDuty`...).
    pub fn from_slug(s: &str) -> Result<Self> {
        let lowered = s.to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().to_ascii_lowercase() == lowered)
            .ok_or_else(|| BobbinError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
