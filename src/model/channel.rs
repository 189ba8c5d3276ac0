use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};

/// A physical signal channel (audio, ECG, depth video, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelIn {
    #[serde(rename = "type")]
    pub channel_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelOut {
    pub id: String,
    #[serde(rename = "type")]
    pub channel_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_channels: Option<Value>,
}

impl StoredModel for ChannelOut {
    const COLLECTION: Collection = Collection::Channels;
}
