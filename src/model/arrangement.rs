use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};
use super::common::AdditionalProperty;

/// Spatial setup an activity was executed in (personal, two-people,
/// group distance and so on).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrangementIn {
    pub arrangement_type: String,
    #[serde(default)]
    pub arrangement_distance: Option<String>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrangementOut {
    pub id: String,
    pub arrangement_type: String,
    #[serde(default)]
    pub arrangement_distance: Option<String>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_executions: Option<Value>,
}

impl StoredModel for ArrangementOut {
    const COLLECTION: Collection = Collection::Arrangements;
}
