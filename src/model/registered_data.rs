use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};
use super::common::AdditionalProperty;

/// Where a registered channel's data came from (device, file, URI...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredDataIn {
    pub source: String,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredDataOut {
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_channels: Option<Value>,
}

impl StoredModel for RegisteredDataOut {
    const COLLECTION: Collection = Collection::RegisteredData;
}
