use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};
use super::common::AdditionalProperty;

/// One run of an activity within an arrangement. Stored embedded inside its
/// activity document rather than in a collection of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityExecutionIn {
    pub activity_id: Option<String>,
    pub arrangement_id: Option<String>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

/// Relationship-only update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityExecutionRelationIn {
    pub activity_id: Option<String>,
    pub arrangement_id: Option<String>,
}

/// Property-only update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityExecutionPropertyIn {
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityExecutionOut {
    pub id: String,
    #[serde(default)]
    pub activity_id: Option<String>,
    #[serde(default)]
    pub arrangement_id: Option<String>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrangement: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiments: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participations: Option<Value>,
}

impl StoredModel for ActivityExecutionOut {
    const COLLECTION: Collection = Collection::ActivityExecutions;
}
