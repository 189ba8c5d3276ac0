use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::activity_execution::ActivityExecutionIn;
use super::collections::{Collection, StoredModel};

/// Ordered plan of an experiment. Activity executions are kept as a list of
/// branches, each branch an ordered list of execution ids; parallel branches
/// model executions that ran concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioIn {
    #[serde(default)]
    pub experiment_id: Option<String>,
    /// Executions to create and chain into the first branch, in order.
    #[serde(default)]
    pub activity_executions: Vec<ActivityExecutionIn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOut {
    pub id: String,
    #[serde(default)]
    pub experiment_id: Option<String>,
    /// Branches of execution ids, or hydrated objects after traversal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_executions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment: Option<Value>,
}

/// Request to move an execution directly after another scenario element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderChangeIn {
    pub previous_id: String,
    pub activity_execution_id: String,
}

impl StoredModel for ScenarioOut {
    const COLLECTION: Collection = Collection::Scenarios;
}
