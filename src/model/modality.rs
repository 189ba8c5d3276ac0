use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};

/// Registration modality of an observation (facial expressions, EEG, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalityIn {
    pub modality: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalityOut {
    pub id: String,
    pub modality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observable_informations: Option<Value>,
}

impl StoredModel for ModalityOut {
    const COLLECTION: Collection = Collection::Modalities;
}
