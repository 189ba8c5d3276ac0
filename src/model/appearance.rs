use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};

/// Occlusion-style appearance description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearanceOcclusionIn {
    pub beard: String,
    pub moustache: String,
    pub glasses: bool,
}

/// Somatotype scores; each axis must lie in `[1.0, 7.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearanceSomatotypeIn {
    pub ectomorph: f64,
    pub endomorph: f64,
    pub mesomorph: f64,
}

impl AppearanceSomatotypeIn {
    pub fn values_in_range(&self) -> bool {
        [self.ectomorph, self.endomorph, self.mesomorph]
            .iter()
            .all(|v| (1.0..=7.0).contains(v))
    }
}

/// Appearances are a single collection holding two sub-kinds, discriminated
/// by an explicit tag rather than by sniffing which fields happen to exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "appearance_type", rename_all = "snake_case")]
pub enum AppearanceOut {
    Occlusion {
        id: String,
        beard: String,
        moustache: String,
        glasses: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participant_states: Option<Value>,
    },
    Somatotype {
        id: String,
        ectomorph: f64,
        endomorph: f64,
        mesomorph: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participant_states: Option<Value>,
    },
}

impl AppearanceOut {
    pub const OCCLUSION_TAG: &'static str = "occlusion";
    pub const SOMATOTYPE_TAG: &'static str = "somatotype";
}

impl StoredModel for AppearanceOut {
    const COLLECTION: Collection = Collection::Appearances;
}
