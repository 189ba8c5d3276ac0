use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use itertools::Itertools;
use serde_json::{json, Value};

use super::query::{is_id_field, Query};
use super::traits::DocumentBackend;
use crate::model::{Collection, Document, ObjectId, Outcome, TimeSeriesIn, TimeSeriesType};

/// Store facade the services talk to. Wraps a raw [`DocumentBackend`] and
/// owns the conventions raw documents follow:
///
/// * documents are keyed by a hex `_id`, which is renamed to `id` on the way
///   out; id-like fields in payloads and queries are canonicalized to hex,
/// * a logical time series is fanned out into one record per signal sample,
///   each carrying a shared `metadata` block, and reassembled on read,
/// * the cross-entity time-series filters are resolved as joins over the
///   entity collections, intersected per filtered kind.
#[derive(Clone)]
pub struct DocStore {
    backend: Arc<dyn DocumentBackend>,
}

const MISSING: &str = "document not found";
const INVALID_ID: &str = "not a valid document id";

impl DocStore {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        DocStore { backend }
    }

    pub fn backend(&self) -> &Arc<dyn DocumentBackend> {
        &self.backend
    }

    pub async fn create_document_in(
        &self,
        mut doc: Document,
        collection: Collection,
        dataset: &str,
    ) -> Result<String> {
        normalize_doc_ids(&mut doc);
        doc.remove("id");
        let id = ObjectId::new().to_hex();
        doc.insert("_id".to_owned(), Value::String(id.clone()));
        self.backend
            .insert_one(dataset, collection.name(), doc)
            .await?;
        Ok(id)
    }

    pub async fn get_document(
        &self,
        id: &str,
        collection: Collection,
        dataset: &str,
    ) -> Result<Outcome<Document>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(id, INVALID_ID)),
        };
        match self
            .backend
            .find_by_id(dataset, collection.name(), &oid.to_hex())
            .await?
        {
            Some(doc) => Ok(Outcome::Ok(out_doc(doc))),
            None => Ok(Outcome::not_found(id, MISSING)),
        }
    }

    pub async fn get_documents(
        &self,
        query: Query,
        collection: Collection,
        dataset: &str,
    ) -> Result<Vec<Document>> {
        let docs = self
            .backend
            .find(dataset, collection.name(), &query.normalize_ids())
            .await?;
        Ok(docs.into_iter().map(out_doc).collect())
    }

    pub async fn replace_document(
        &self,
        id: &str,
        mut doc: Document,
        collection: Collection,
        dataset: &str,
    ) -> Result<Outcome<()>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(id, INVALID_ID)),
        };
        normalize_doc_ids(&mut doc);
        doc.remove("id");
        doc.insert("_id".to_owned(), Value::String(oid.to_hex()));
        if self
            .backend
            .replace_by_id(dataset, collection.name(), &oid.to_hex(), doc)
            .await?
        {
            Ok(Outcome::Ok(()))
        } else {
            Ok(Outcome::not_found(id, MISSING))
        }
    }

    pub async fn delete_document(
        &self,
        id: &str,
        collection: Collection,
        dataset: &str,
    ) -> Result<Outcome<()>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(id, INVALID_ID)),
        };
        if self
            .backend
            .delete_by_id(dataset, collection.name(), &oid.to_hex())
            .await?
        {
            Ok(Outcome::Ok(()))
        } else {
            Ok(Outcome::not_found(id, MISSING))
        }
    }

    // ------------------------------------------------------------------
    // time series
    // ------------------------------------------------------------------

    /// Fans a logical series out into one record per sample and inserts them
    /// all. Returns the shared series id.
    pub async fn create_time_series(&self, series: &TimeSeriesIn, dataset: &str) -> Result<String> {
        let id = ObjectId::new().to_hex();
        let records = signal_records(series, &id)?;
        self.backend
            .insert_many(dataset, Collection::TimeSeries.name(), records)
            .await?;
        Ok(id)
    }

    /// Reassembles one series. `min`/`max` bound the signal values kept in
    /// the result; the series itself is found regardless, so an
    /// over-restrictive range yields an empty `signal_values`, not a miss.
    pub async fn get_time_series(
        &self,
        id: &str,
        dataset: &str,
        min_value: Option<f64>,
        max_value: Option<f64>,
    ) -> Result<Outcome<Document>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(id, INVALID_ID)),
        };
        let records = self
            .backend
            .find(
                dataset,
                Collection::TimeSeries.name(),
                &Query::eq("metadata.id", oid.to_hex()),
            )
            .await?;
        if records.is_empty() {
            return Ok(Outcome::not_found(id, MISSING));
        }
        // keep the shared metadata block so an all-filtering range still
        // reassembles the series whole
        let metadata = records
            .first()
            .and_then(|r| r.get("metadata"))
            .and_then(Value::as_object)
            .cloned();
        let range = Query::new().and_range("value", min_value, max_value);
        let kept = records.into_iter().filter(|r| range.matches(r)).collect();
        match assemble_series(kept, metadata) {
            Some(doc) => Ok(Outcome::Ok(doc)),
            None => Ok(Outcome::not_found(id, MISSING)),
        }
    }

    /// All series whose records match the query, reassembled in first-seen
    /// order.
    pub async fn get_many_time_series(&self, query: Query, dataset: &str) -> Result<Vec<Document>> {
        let records = self
            .backend
            .find(
                dataset,
                Collection::TimeSeries.name(),
                &query.normalize_ids(),
            )
            .await?;
        Ok(group_series(records))
    }

    pub async fn delete_time_series(&self, id: &str, dataset: &str) -> Result<Outcome<()>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(id, INVALID_ID)),
        };
        let deleted = self
            .backend
            .delete_matching(
                dataset,
                Collection::TimeSeries.name(),
                &Query::eq("metadata.id", oid.to_hex()),
            )
            .await?;
        if deleted == 0 {
            Ok(Outcome::not_found(id, MISSING))
        } else {
            Ok(Outcome::Ok(()))
        }
    }

    /// Updates the shared metadata block across every record of a series.
    pub async fn set_time_series_metadata(
        &self,
        id: &str,
        mut fields: Document,
        dataset: &str,
    ) -> Result<Outcome<()>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(id, INVALID_ID)),
        };
        normalize_doc_ids(&mut fields);
        let fields: Vec<(String, Value)> = fields
            .into_iter()
            .map(|(k, v)| (format!("metadata.{k}"), v))
            .collect();
        let updated = self
            .backend
            .set_matching(
                dataset,
                Collection::TimeSeries.name(),
                &Query::eq("metadata.id", oid.to_hex()),
                &fields,
            )
            .await?;
        if updated == 0 {
            Ok(Outcome::not_found(id, MISSING))
        } else {
            Ok(Outcome::Ok(()))
        }
    }

    /// Swaps the full signal payload of a series in one atomic step, keeping
    /// its id and relationships. A failure while building the replacement
    /// leaves the stored series untouched.
    pub async fn replace_time_series_signals(
        &self,
        id: &str,
        series: &TimeSeriesIn,
        dataset: &str,
    ) -> Result<Outcome<()>> {
        let existing = match self.get_time_series(id, dataset, None, None).await? {
            Outcome::Ok(doc) => doc,
            other => return Ok(other.map(|_| ())),
        };
        let mut preserved = series.clone();
        preserved.measure_id = existing
            .get("measure_id")
            .and_then(Value::as_str)
            .map(str::to_owned);
        preserved.observable_information_ids = existing
            .get("observable_information_ids")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        let series_id = existing
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or(id)
            .to_owned();
        let records = signal_records(&preserved, &series_id)?;
        self.backend
            .replace_matching(
                dataset,
                Collection::TimeSeries.name(),
                &Query::eq("metadata.id", series_id),
                records,
            )
            .await?;
        Ok(Outcome::Ok(()))
    }

    // ------------------------------------------------------------------
    // cross-entity time-series filters
    // ------------------------------------------------------------------

    /// Resolves `<entityKind>_<property>` filter params to the series they
    /// select. Each filtered kind contributes a candidate id set; the sets
    /// are intersected, so filters across kinds combine with AND semantics.
    /// With no recognized params every series is returned.
    pub async fn filtered_time_series(
        &self,
        dataset: &str,
        params: &[(String, String)],
    ) -> Result<Vec<Document>> {
        let groups: HashMap<String, Vec<(String, Value)>> = params
            .iter()
            .filter_map(|(key, value)| {
                key.split_once('_')
                    .map(|(kind, prop)| (kind.to_owned(), (prop.to_owned(), param_value(value))))
            })
            .into_group_map();

        let mut id_sets: Vec<HashSet<String>> = Vec::new();
        if let Some(props) = groups.get("recording") {
            id_sets.push(self.series_ids_by_recording(dataset, props).await?);
        }
        let state_props = groups.get("participantstate");
        let participant_props = groups.get("participant");
        if state_props.is_some() || participant_props.is_some() {
            id_sets.push(
                self.series_ids_by_participant(
                    dataset,
                    state_props.map(Vec::as_slice).unwrap_or(&[]),
                    participant_props.map(Vec::as_slice).unwrap_or(&[]),
                )
                .await?,
            );
        }
        if let Some(props) = groups.get("experiment") {
            id_sets.push(self.series_ids_by_experiment(dataset, props).await?);
        }

        let Some(first) = id_sets.first().cloned() else {
            return self.get_many_time_series(Query::new(), dataset).await;
        };
        let ids: Vec<Value> = id_sets[1..]
            .iter()
            .fold(first, |acc, set| acc.intersection(set).cloned().collect())
            .into_iter()
            .map(Value::String)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.get_many_time_series(Query::is_in("metadata.id", ids), dataset)
            .await
    }

    /// recordings matching the props -> their embedded observable
    /// informations -> series referencing those.
    async fn series_ids_by_recording(
        &self,
        dataset: &str,
        props: &[(String, Value)],
    ) -> Result<HashSet<String>> {
        let recordings = self
            .backend
            .find(
                dataset,
                Collection::Recordings.name(),
                &props_query(props).normalize_ids(),
            )
            .await?;
        let oi_ids = embedded_child_ids(&recordings, Collection::ObservableInformations.name());
        self.series_ids_by_observations(dataset, oi_ids).await
    }

    /// participants -> matching embedded states -> participations ->
    /// recordings -> observable informations -> series.
    async fn series_ids_by_participant(
        &self,
        dataset: &str,
        state_props: &[(String, Value)],
        participant_props: &[(String, Value)],
    ) -> Result<HashSet<String>> {
        let participant_query = props_query(participant_props);
        let state_query = props_query_embedded(state_props);
        let combined = state_props.iter().fold(
            participant_query,
            |query, (prop, value)| {
                let path = if prop == "id" {
                    format!("{}.id", Collection::ParticipantStates.name())
                } else {
                    format!("{}.{}", Collection::ParticipantStates.name(), prop)
                };
                match value {
                    Value::Array(items) => query.and_in(path, items.clone()),
                    other => query.and_eq(path, other.clone()),
                }
            },
        );
        let participants = self
            .backend
            .find(
                dataset,
                Collection::Participants.name(),
                &combined.normalize_ids(),
            )
            .await?;

        let normalized_state_query = state_query.normalize_ids();
        let mut state_ids: Vec<Value> = Vec::new();
        for participant in &participants {
            let Some(states) = participant
                .get(Collection::ParticipantStates.name())
                .and_then(Value::as_array)
            else {
                continue;
            };
            for state in states.iter().filter_map(Value::as_object) {
                if normalized_state_query.matches(state) {
                    if let Some(id) = state.get("id").and_then(Value::as_str) {
                        state_ids.push(Value::String(id.to_owned()));
                    }
                }
            }
        }
        self.series_ids_by_participations(dataset, state_ids).await
    }

    /// experiments matching the props -> their scenarios -> the executions in
    /// every branch -> participations -> recordings -> series.
    async fn series_ids_by_experiment(
        &self,
        dataset: &str,
        props: &[(String, Value)],
    ) -> Result<HashSet<String>> {
        let experiments = self
            .backend
            .find(
                dataset,
                Collection::Experiments.name(),
                &props_query(props).normalize_ids(),
            )
            .await?;
        let experiment_ids = raw_ids(&experiments);
        let scenarios = self
            .backend
            .find(
                dataset,
                Collection::Scenarios.name(),
                &Query::is_in("experiment_id", experiment_ids),
            )
            .await?;
        let execution_ids: Vec<Value> = scenarios
            .iter()
            .filter_map(|s| s.get("activity_executions"))
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(Value::as_array)
            .flatten()
            .cloned()
            .collect();
        let participations = self
            .backend
            .find(
                dataset,
                Collection::Participations.name(),
                &Query::is_in("activity_execution_id", execution_ids),
            )
            .await?;
        self.series_ids_by_recordings_of(dataset, raw_ids(&participations))
            .await
    }

    async fn series_ids_by_participations(
        &self,
        dataset: &str,
        state_ids: Vec<Value>,
    ) -> Result<HashSet<String>> {
        let participations = self
            .backend
            .find(
                dataset,
                Collection::Participations.name(),
                &Query::is_in("participant_state_id", state_ids),
            )
            .await?;
        self.series_ids_by_recordings_of(dataset, raw_ids(&participations))
            .await
    }

    async fn series_ids_by_recordings_of(
        &self,
        dataset: &str,
        participation_ids: Vec<Value>,
    ) -> Result<HashSet<String>> {
        let recordings = self
            .backend
            .find(
                dataset,
                Collection::Recordings.name(),
                &Query::is_in("participation_id", participation_ids),
            )
            .await?;
        let oi_ids = embedded_child_ids(&recordings, Collection::ObservableInformations.name());
        self.series_ids_by_observations(dataset, oi_ids).await
    }

    async fn series_ids_by_observations(
        &self,
        dataset: &str,
        oi_ids: Vec<Value>,
    ) -> Result<HashSet<String>> {
        if oi_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let records = self
            .backend
            .find(
                dataset,
                Collection::TimeSeries.name(),
                &Query::is_in("metadata.observable_information_ids", oi_ids),
            )
            .await?;
        Ok(records
            .iter()
            .filter_map(|r| r.get("metadata"))
            .filter_map(|m| m.get("id"))
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect())
    }
}

/// `id` goes to `_id` for top-level kinds; embedded children keep `id`.
fn props_query(props: &[(String, Value)]) -> Query {
    props.iter().fold(Query::new(), |query, (prop, value)| {
        let path = if prop == "id" { "_id" } else { prop.as_str() };
        match value {
            Value::Array(items) => query.and_in(path, items.clone()),
            other => query.and_eq(path, other.clone()),
        }
    })
}

fn props_query_embedded(props: &[(String, Value)]) -> Query {
    props.iter().fold(Query::new(), |query, (prop, value)| {
        match value {
            Value::Array(items) => query.and_in(prop.as_str(), items.clone()),
            other => query.and_eq(prop.as_str(), other.clone()),
        }
    })
}

/// Filter params arrive as strings; integers are compared numerically.
fn param_value(raw: &str) -> Value {
    match raw.parse::<i64>() {
        Ok(n) => json!(n),
        Err(_) => Value::String(raw.to_owned()),
    }
}

fn raw_ids(docs: &[Document]) -> Vec<Value> {
    docs.iter()
        .filter_map(|d| d.get("_id"))
        .cloned()
        .collect()
}

fn embedded_child_ids(parents: &[Document], field: &str) -> Vec<Value> {
    parents
        .iter()
        .filter_map(|p| p.get(field))
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|child| child.get("id"))
        .cloned()
        .collect()
}

/// Renames the storage key to the external `id`.
fn out_doc(mut doc: Document) -> Document {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id".to_owned(), id);
    }
    doc
}

/// Canonicalizes every id-like string field (and id-list field) to lowercase
/// hex, recursing through nested objects and arrays. Strings that do not
/// parse as ids are left as they are.
pub fn normalize_doc_ids(doc: &mut Document) {
    for (key, value) in doc.iter_mut() {
        normalize_value(key, value);
    }
}

fn normalize_value(key: &str, value: &mut Value) {
    match value {
        Value::String(s) if is_id_field(key) => {
            if let Ok(oid) = ObjectId::parse_str(s) {
                *s = oid.to_hex();
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                normalize_value(key, item);
            }
        }
        Value::Object(map) => {
            for (k, v) in map.iter_mut() {
                normalize_value(k, v);
            }
        }
        _ => {}
    }
}

/// Builds the stored per-sample records for a series.
fn signal_records(series: &TimeSeriesIn, series_id: &str) -> Result<Vec<Document>> {
    let mut observable_ids = series.observable_information_ids.clone();
    if observable_ids.is_empty() {
        if let Some(single) = &series.observable_information_id {
            observable_ids.push(single.clone());
        }
    }
    let mut metadata = Document::new();
    metadata.insert("id".to_owned(), Value::String(series_id.to_owned()));
    metadata.insert("type".to_owned(), serde_json::to_value(series.series_type)?);
    metadata.insert(
        "measure_id".to_owned(),
        series
            .measure_id
            .as_ref()
            .map(|id| Value::String(id.clone()))
            .unwrap_or(Value::Null),
    );
    metadata.insert(
        "observable_information_ids".to_owned(),
        Value::Array(observable_ids.into_iter().map(Value::String).collect()),
    );
    metadata.insert(
        "additional_properties".to_owned(),
        serde_json::to_value(&series.additional_properties)?,
    );
    normalize_doc_ids(&mut metadata);

    let mut records = Vec::with_capacity(series.signal_values.len());
    for signal in &series.signal_values {
        let mut record = Document::new();
        record.insert(
            "_id".to_owned(),
            Value::String(ObjectId::new().to_hex()),
        );
        match series.series_type {
            TimeSeriesType::Timestamp => {
                record.insert(
                    "timestamp".to_owned(),
                    stamp_value(signal.timestamp.unwrap_or(0)),
                );
            }
            TimeSeriesType::Epoch => {
                record.insert(
                    "start_timestamp".to_owned(),
                    stamp_value(signal.start_timestamp.unwrap_or(0)),
                );
                record.insert(
                    "end_timestamp".to_owned(),
                    stamp_value(signal.end_timestamp.unwrap_or(0)),
                );
            }
        }
        record.insert("value".to_owned(), coerce_value(&signal.signal_value.value));
        record.insert(
            "additional_properties".to_owned(),
            serde_json::to_value(&signal.signal_value.additional_properties)?,
        );
        record.insert("metadata".to_owned(), Value::Object(metadata.clone()));
        records.push(record);
    }
    Ok(records)
}

/// Numeric strings become numbers so value-range filters behave.
fn coerce_value(value: &Value) -> Value {
    match value {
        Value::String(s) => match s.parse::<i64>() {
            Ok(n) => json!(n),
            Err(_) => value.clone(),
        },
        _ => value.clone(),
    }
}

fn stamp_value(unix_secs: i64) -> Value {
    Value::String(
        Utc.timestamp_opt(unix_secs, 0)
            .single()
            .unwrap_or_else(|| Utc.timestamp_opt(0, 0).single().unwrap_or_default())
            .to_rfc3339(),
    )
}

fn stamp_secs(value: Option<&Value>) -> Option<i64> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.timestamp())
}

/// Groups records by their series id and reassembles each series, keeping
/// first-seen order.
fn group_series(records: Vec<Document>) -> Vec<Document> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Document>> = HashMap::new();
    for record in records {
        let Some(series_id) = record
            .get("metadata")
            .and_then(|m| m.get("id"))
            .and_then(Value::as_str)
            .map(str::to_owned)
        else {
            continue;
        };
        groups.entry(series_id.clone()).or_insert_with(|| {
            order.push(series_id.clone());
            Vec::new()
        });
        if let Some(bucket) = groups.get_mut(&series_id) {
            bucket.push(record);
        }
    }
    order
        .into_iter()
        .filter_map(|id| assemble_series(groups.remove(&id)?, None))
        .collect()
}

/// Rebuilds the logical series document from its per-sample records. With no
/// surviving records `fallback_metadata` (the series' shared block) still
/// lets an empty series come back with its type and relations intact.
fn assemble_series(records: Vec<Document>, fallback_metadata: Option<Document>) -> Option<Document> {
    let metadata: Document = match records.first() {
        Some(first) => first.get("metadata")?.as_object()?.clone(),
        None => fallback_metadata?,
    };
    let series_type: Option<TimeSeriesType> = metadata
        .get("type")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok());

    let mut out = Document::new();
    out.insert(
        "id".to_owned(),
        metadata.get("id").cloned().unwrap_or(Value::Null),
    );
    out.insert(
        "type".to_owned(),
        metadata.get("type").cloned().unwrap_or(Value::Null),
    );
    out.insert(
        "measure_id".to_owned(),
        metadata.get("measure_id").cloned().unwrap_or(Value::Null),
    );
    out.insert(
        "observable_information_ids".to_owned(),
        metadata
            .get("observable_information_ids")
            .cloned()
            .unwrap_or_else(|| json!([])),
    );
    out.insert(
        "additional_properties".to_owned(),
        metadata
            .get("additional_properties")
            .cloned()
            .unwrap_or_else(|| json!([])),
    );

    let signals: Vec<Value> = records
        .into_iter()
        .map(|record| {
            let mut signal = Document::new();
            match series_type {
                Some(TimeSeriesType::Epoch) => {
                    signal.insert(
                        "start_timestamp".to_owned(),
                        stamp_secs(record.get("start_timestamp"))
                            .map(|s| json!(s))
                            .unwrap_or(Value::Null),
                    );
                    signal.insert(
                        "end_timestamp".to_owned(),
                        stamp_secs(record.get("end_timestamp"))
                            .map(|s| json!(s))
                            .unwrap_or(Value::Null),
                    );
                }
                _ => {
                    signal.insert(
                        "timestamp".to_owned(),
                        stamp_secs(record.get("timestamp"))
                            .map(|s| json!(s))
                            .unwrap_or(Value::Null),
                    );
                }
            }
            let mut signal_value = Document::new();
            signal_value.insert(
                "value".to_owned(),
                record.get("value").cloned().unwrap_or(Value::Null),
            );
            signal_value.insert(
                "additional_properties".to_owned(),
                record
                    .get("additional_properties")
                    .cloned()
                    .unwrap_or_else(|| json!([])),
            );
            signal.insert("signal_value".to_owned(), Value::Object(signal_value));
            Value::Object(signal)
        })
        .collect();
    out.insert("signal_values".to_owned(), Value::Array(signals));
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{to_document, SignalIn, SignalValue};
    use crate::store::MemoryBackend;

    fn store() -> DocStore {
        DocStore::new(Arc::new(MemoryBackend::new()))
    }

    fn series(values: Vec<(i64, Value)>) -> TimeSeriesIn {
        TimeSeriesIn {
            series_type: TimeSeriesType::Timestamp,
            measure_id: None,
            observable_information_ids: Vec::new(),
            observable_information_id: None,
            signal_values: values
                .into_iter()
                .map(|(ts, value)| SignalIn {
                    timestamp: Some(ts),
                    start_timestamp: None,
                    end_timestamp: None,
                    signal_value: SignalValue {
                        value,
                        additional_properties: Vec::new(),
                    },
                })
                .collect(),
            additional_properties: Vec::new(),
        }
    }

    #[tokio::test]
    async fn documents_round_trip_with_renamed_id() {
        let store = store();
        let doc = to_document(&json!({"type": "Audio"})).unwrap();
        let id = store
            .create_document_in(doc, Collection::Channels, "ds")
            .await
            .unwrap();
        let fetched = store
            .get_document(&id, Collection::Channels, "ds")
            .await
            .unwrap()
            .ok()
            .unwrap();
        assert_eq!(fetched["id"], json!(id));
        assert_eq!(fetched["type"], json!("Audio"));
        assert!(fetched.get("_id").is_none());
    }

    #[tokio::test]
    async fn malformed_id_reads_miss_instead_of_failing() {
        let store = store();
        let outcome = store
            .get_document("definitely-not-hex", Collection::Channels, "ds")
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::NotFound(_)));
    }

    #[tokio::test]
    async fn series_fan_out_and_reassembly() {
        let store = store();
        let id = store
            .create_time_series(&series(vec![(10, json!(1)), (20, json!("5"))]), "ds")
            .await
            .unwrap();

        // one record per sample
        let raw = store
            .backend()
            .find("ds", Collection::TimeSeries.name(), &Query::new())
            .await
            .unwrap();
        assert_eq!(raw.len(), 2);

        let doc = store
            .get_time_series(&id, "ds", None, None)
            .await
            .unwrap()
            .ok()
            .unwrap();
        let signals = doc["signal_values"].as_array().unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0]["timestamp"], json!(10));
        // numeric strings are coerced on write
        assert_eq!(signals[1]["signal_value"]["value"], json!(5));
    }

    #[tokio::test]
    async fn value_range_trims_signals_but_keeps_the_series() {
        let store = store();
        let id = store
            .create_time_series(
                &series(vec![(1, json!(2)), (2, json!(8)), (3, json!(5))]),
                "ds",
            )
            .await
            .unwrap();
        let doc = store
            .get_time_series(&id, "ds", Some(4.0), Some(8.0))
            .await
            .unwrap()
            .ok()
            .unwrap();
        let signals = doc["signal_values"].as_array().unwrap();
        assert_eq!(signals.len(), 2);
        let doc = store
            .get_time_series(&id, "ds", Some(100.0), None)
            .await
            .unwrap()
            .ok()
            .unwrap();
        assert!(doc["signal_values"].as_array().unwrap().is_empty());
        // the shared metadata still comes back whole
        assert_eq!(doc["id"], json!(id));
        assert_eq!(doc["type"], json!("timestamp"));
    }
}
