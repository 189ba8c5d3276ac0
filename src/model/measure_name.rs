use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureNameIn {
    pub name: String,
    #[serde(rename = "type")]
    pub measure_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureNameOut {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub measure_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measures: Option<Value>,
}

impl StoredModel for MeasureNameOut {
    const COLLECTION: Collection = Collection::MeasureNames;
}
