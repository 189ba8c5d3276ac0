use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};
use super::common::AdditionalProperty;

/// Kind of activity performed during an experiment (individual, two-people,
/// group and so on; the vocabulary is free-form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityIn {
    pub activity: String,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityOut {
    pub id: String,
    pub activity: String,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
    /// Embedded executions, hydrated children included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_executions: Option<Value>,
}

impl StoredModel for ActivityOut {
    const COLLECTION: Collection = Collection::Activities;
}
