use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};

/// A channel as registered by a concrete data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredChannelIn {
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub registered_data_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredChannelOut {
    pub id: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub registered_data_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recordings: Option<Value>,
}

impl StoredModel for RegisteredChannelOut {
    const COLLECTION: Collection = Collection::RegisteredChannels;
}
