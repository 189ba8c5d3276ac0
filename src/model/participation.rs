use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};

/// Join between a participant state and an activity execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationIn {
    #[serde(default)]
    pub activity_execution_id: Option<String>,
    #[serde(default)]
    pub participant_state_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationOut {
    pub id: String,
    #[serde(default)]
    pub activity_execution_id: Option<String>,
    #[serde(default)]
    pub participant_state_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_execution: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_state: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recordings: Option<Value>,
}

impl StoredModel for ParticipationOut {
    const COLLECTION: Collection = Collection::Participations;
}
