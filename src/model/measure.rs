use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};
use super::common::AdditionalProperty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureIn {
    pub measure_name_id: Option<String>,
    pub datatype: String,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureRelationIn {
    pub measure_name_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurePropertyIn {
    pub datatype: String,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureOut {
    pub id: String,
    #[serde(default)]
    pub measure_name_id: Option<String>,
    pub datatype: String,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure_name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_series: Option<Value>,
}

impl StoredModel for MeasureOut {
    const COLLECTION: Collection = Collection::Measures;
}
