use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};
use super::common::AdditionalProperty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentIn {
    pub experiment_name: String,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentOut {
    pub id: String,
    pub experiment_name: String,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<Value>,
}

impl StoredModel for ExperimentOut {
    const COLLECTION: Collection = Collection::Experiments;
}
