use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};

/// Big Five factor scores; each factor must lie in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityBigFiveIn {
    pub agreeableness: f64,
    pub conscientiousness: f64,
    pub extroversion: f64,
    pub neuroticism: f64,
    pub openess: f64,
}

impl PersonalityBigFiveIn {
    pub fn values_in_range(&self) -> bool {
        [
            self.agreeableness,
            self.conscientiousness,
            self.extroversion,
            self.neuroticism,
            self.openess,
        ]
        .iter()
        .all(|v| (0.0..=1.0).contains(v))
    }
}

/// PANAS affect scores; both must lie in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityPanasIn {
    pub negative_affect: f64,
    pub positive_affect: f64,
}

impl PersonalityPanasIn {
    pub fn values_in_range(&self) -> bool {
        (0.0..=1.0).contains(&self.negative_affect) && (0.0..=1.0).contains(&self.positive_affect)
    }
}

/// Personalities share one collection; the sub-kind is an explicit tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "personality_type", rename_all = "snake_case")]
pub enum PersonalityOut {
    BigFive {
        id: String,
        agreeableness: f64,
        conscientiousness: f64,
        extroversion: f64,
        neuroticism: f64,
        openess: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participant_states: Option<Value>,
    },
    Panas {
        id: String,
        negative_affect: f64,
        positive_affect: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participant_states: Option<Value>,
    },
}

impl PersonalityOut {
    pub const BIG_FIVE_TAG: &'static str = "big_five";
    pub const PANAS_TAG: &'static str = "panas";
}

impl StoredModel for PersonalityOut {
    const COLLECTION: Collection = Collection::Personalities;
}
