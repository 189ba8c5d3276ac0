use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collections::{Collection, StoredModel};
use super::common::AdditionalProperty;

/// How samples of a series are stamped: single instants or begin/end epochs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSeriesType {
    Timestamp,
    Epoch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalValue {
    pub value: Value,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

/// One sample. `timestamp` is used for [`TimeSeriesType::Timestamp`] series,
/// the start/end pair for [`TimeSeriesType::Epoch`] series; all three are in
/// unix seconds on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalIn {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub start_timestamp: Option<i64>,
    #[serde(default)]
    pub end_timestamp: Option<i64>,
    pub signal_value: SignalValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesIn {
    #[serde(rename = "type")]
    pub series_type: TimeSeriesType,
    #[serde(default)]
    pub measure_id: Option<String>,
    #[serde(default)]
    pub observable_information_ids: Vec<String>,
    /// Single-id compatibility field, folded into the list on write.
    #[serde(default)]
    pub observable_information_id: Option<String>,
    #[serde(default)]
    pub signal_values: Vec<SignalIn>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRelationIn {
    #[serde(default)]
    pub measure_id: Option<String>,
    #[serde(default)]
    pub observable_information_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPropertyIn {
    #[serde(rename = "type")]
    pub series_type: TimeSeriesType,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesOut {
    pub id: String,
    #[serde(rename = "type")]
    pub series_type: TimeSeriesType,
    #[serde(default)]
    pub measure_id: Option<String>,
    #[serde(default)]
    pub observable_information_ids: Vec<String>,
    #[serde(default)]
    pub signal_values: Vec<SignalIn>,
    #[serde(default)]
    pub additional_properties: Vec<AdditionalProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observable_informations: Option<Value>,
}

impl StoredModel for TimeSeriesOut {
    const COLLECTION: Collection = Collection::TimeSeries;
}
