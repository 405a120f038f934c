//! Static field/type table for model documents.
//!
//! Serves the schema-fields endpoint and drives coercion of multipart form
//! values, where every field arrives as text.

/// Wire type of a document field, named after the legacy schema instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Boolean,
    Number,
    ObjectId,
    Array,
}

impl FieldType {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "String",
            FieldType::Boolean => "Boolean",
            FieldType::Number => "Number",
            FieldType::ObjectId => "ObjectID",
            FieldType::Array => "Array",
        }
    }
}

/// The document fields in wire order, with their types.
pub fn schema_fields() -> &'static [(&'static str, FieldType)] {
    use FieldType::*;
    &[
        ("id", ObjectId),
        ("model", String),
        ("technicalDescription", String),
        ("detailedTechnicalDescription", String),
        ("functions", String),
        ("needleType", String),
        ("needleFeed", Boolean),
        ("needleNo", Number),
        ("threadNo", String),
        ("stitchLength", String),
        ("stitchWidth", String),
        ("stitchLengthRange", Number),
        ("doubleNeedleStitchLength", String),
        ("needleBarStroke", String),
        ("liftHeightRange", String),
        ("differentialRatio", String),
        ("hasAutoThreadTrimmer", Boolean),
        ("hasAutoLift", Boolean),
        ("horizontalHook", Boolean),
        ("verticalHook", Boolean),
        ("isSuitableForLightMaterial", Boolean),
        ("isSuitableForMediumMaterial", Boolean),
        ("isSuitableForHeavyMaterial", Boolean),
        ("tableSize", String),
        ("cuttingHeight", String),
        ("armSize", String),
        ("knifeSize", String),
        ("cuttingLength", String),
        ("maximumCutting", String),
        ("cuttingSpeed", String),
        ("maximumBladeTemperature", String),
        ("temperature", String),
        ("pressure", String),
        ("beltSpeed", String),
        ("heatingTime", String),
        ("fusingWidth", String),
        ("recommendedAirPressure", String),
        ("voltage", String),
        ("voltageV", String),
        ("frequencyHz", String),
        ("powerKw", String),
        ("powerSupply", String),
        ("ratedOutput", String),
        ("speedInRPM", Number),
        ("oil", Boolean),
        ("dimension", String),
        ("weight", String),
        ("netWeight", String),
        ("packingSize", String),
        ("packageSize", String),
        ("image", String),
        ("series", ObjectId),
        ("subModels", Array),
    ]
}

/// Look up a field's type by wire name.
pub fn field_type(name: &str) -> Option<FieldType> {
    schema_fields()
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, ty)| *ty)
}
