use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};

/// Bodily activity a signal derives from (movement, sound, heart activity...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeActivityIn {
    pub life_activity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeActivityOut {
    pub id: String,
    pub life_activity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observable_informations: Option<Value>,
}

impl StoredModel for LifeActivityOut {
    const COLLECTION: Collection = Collection::LifeActivities;
}
