use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};
use super::common::AdditionalProperty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantIn {
    pub name: String,
    /// Date-only strings are normalized to midnight-UTC timestamps on write.
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub disorder: Option<String>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantOut {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub disorder: Option<String>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_states: Option<Value>,
}

impl StoredModel for ParticipantOut {
    const COLLECTION: Collection = Collection::Participants;
}
