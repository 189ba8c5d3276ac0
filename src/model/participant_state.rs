use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};
use super::common::AdditionalProperty;

/// Snapshot of a participant at the time of a participation: age plus
/// personality and appearance references. Embedded inside its participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantStateIn {
    pub participant_id: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub personality_ids: Vec<String>,
    #[serde(default)]
    pub appearance_ids: Vec<String>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantStateRelationIn {
    pub participant_id: Option<String>,
    #[serde(default)]
    pub personality_ids: Vec<String>,
    #[serde(default)]
    pub appearance_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantStatePropertyIn {
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantStateOut {
    pub id: String,
    #[serde(default)]
    pub participant_id: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub personality_ids: Vec<String>,
    #[serde(default)]
    pub appearance_ids: Vec<String>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalities: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearances: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participations: Option<Value>,
}

impl StoredModel for ParticipantStateOut {
    const COLLECTION: Collection = Collection::ParticipantStates;
}
