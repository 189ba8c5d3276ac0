use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};

/// What was observed in a recording: which modality it was registered with
/// and which life activity produced it. Embedded inside its recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservableInformationIn {
    pub recording_id: Option<String>,
    #[serde(default)]
    pub modality_id: Option<String>,
    #[serde(default)]
    pub life_activity_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservableInformationOut {
    pub id: String,
    #[serde(default)]
    pub recording_id: Option<String>,
    #[serde(default)]
    pub modality_id: Option<String>,
    #[serde(default)]
    pub life_activity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_activity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "timeSeries")]
    pub time_series: Option<Value>,
}

impl StoredModel for ObservableInformationOut {
    const COLLECTION: Collection = Collection::ObservableInformations;
}
