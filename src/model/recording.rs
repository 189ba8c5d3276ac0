use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};
use super::common::AdditionalProperty;

/// Signal capture of one participation through one registered channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingIn {
    #[serde(default)]
    pub participation_id: Option<String>,
    #[serde(default)]
    pub registered_channel_id: Option<String>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingRelationIn {
    #[serde(default)]
    pub participation_id: Option<String>,
    #[serde(default)]
    pub registered_channel_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingPropertyIn {
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingOut {
    pub id: String,
    #[serde(default)]
    pub participation_id: Option<String>,
    #[serde(default)]
    pub registered_channel_id: Option<String>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_channel: Option<Value>,
    /// Embedded children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observable_informations: Option<Value>,
}

impl StoredModel for RecordingOut {
    const COLLECTION: Collection = Collection::Recordings;
}
