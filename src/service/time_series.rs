use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::generic::EntityService;
use super::measure::MeasureService;
use super::observable_information::ObservableInformationService;
use super::wired;
use crate::model::{
    docs_to_array, field_str, Collection, Document, Outcome, Source, TimeSeriesIn, TimeSeriesOut,
    TimeSeriesPropertyIn, TimeSeriesRelationIn,
};
use crate::store::{DocStore, Query};
use crate::try_outcome;

/// Time series are stored fanned out, one record per sample; the store
/// adapter reassembles them, so queries written against the logical series
/// are rewritten onto the shared `metadata` block here.
pub struct TimeSeriesService {
    store: DocStore,
    pub(crate) measure_service: OnceLock<Arc<MeasureService>>,
    pub(crate) observable_information_service: OnceLock<Arc<ObservableInformationService>>,
}

impl TimeSeriesService {
    pub fn new(store: DocStore) -> Self {
        TimeSeriesService {
            store,
            measure_service: OnceLock::new(),
            observable_information_service: OnceLock::new(),
        }
    }

    fn measures(&self) -> &Arc<MeasureService> {
        wired(&self.measure_service)
    }

    fn observable_informations(&self) -> &Arc<ObservableInformationService> {
        wired(&self.observable_information_service)
    }

    async fn check_relations(
        &self,
        measure_id: Option<&String>,
        observable_information_ids: &[String],
        dataset: &str,
    ) -> Result<Option<String>> {
        if !observable_information_ids.is_empty() {
            let found = self
                .observable_informations()
                .get_multiple(
                    dataset,
                    Query::is_in(
                        "id",
                        observable_information_ids
                            .iter()
                            .cloned()
                            .map(Value::String)
                            .collect(),
                    ),
                    0,
                    Source::NONE,
                )
                .await?;
            if found.len() != observable_information_ids.len() {
                return Ok(Some(
                    "given observable information does not exist".to_owned(),
                ));
            }
        }
        if let Some(measure_id) = measure_id {
            let measure = self
                .measures()
                .get_single_dict(measure_id, dataset, 0, Source::NONE)
                .await?;
            if !measure.is_ok() {
                return Ok(Some("given measure does not exist".to_owned()));
            }
        }
        Ok(None)
    }

    pub async fn save_time_series(
        &self,
        mut series: TimeSeriesIn,
        dataset: &str,
    ) -> Result<Outcome<TimeSeriesOut>> {
        if series.observable_information_ids.is_empty() {
            if let Some(single) = series.observable_information_id.take() {
                series.observable_information_ids.push(single);
            }
        }
        if let Some(error) = self
            .check_relations(
                series.measure_id.as_ref(),
                &series.observable_information_ids,
                dataset,
            )
            .await?
        {
            return Ok(Outcome::Invalid(error));
        }
        let id = self.store.create_time_series(&series, dataset).await?;
        self.get_time_series(&id, dataset, 0, None, None).await
    }

    pub async fn get_time_series(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
        signal_min_value: Option<f64>,
        signal_max_value: Option<f64>,
    ) -> Result<Outcome<TimeSeriesOut>> {
        self.get_time_series_dict(id, dataset, depth, signal_min_value, signal_max_value, Source::NONE)
            .await?
            .parse()
    }

    async fn get_time_series_dict(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
        signal_min_value: Option<f64>,
        signal_max_value: Option<f64>,
        source: Source,
    ) -> Result<Outcome<Document>> {
        let mut doc = try_outcome!(
            self.store
                .get_time_series(id, dataset, signal_min_value, signal_max_value)
                .await?
        );
        self.add_related(&mut doc, dataset, depth, source, None)
            .await?;
        Ok(Outcome::Ok(doc))
    }

    /// Series filtered by `<entityKind>_<property>` params resolved through
    /// the entity graph; kinds combine with AND, no params means everything.
    pub async fn get_time_series_nodes(
        &self,
        dataset: &str,
        params: &[(String, String)],
    ) -> Result<Vec<Document>> {
        self.store.filtered_time_series(dataset, params).await
    }

    pub async fn get_time_series_for_observable_information(
        &self,
        observable_information_id: &str,
        dataset: &str,
        depth: u32,
        source: Source,
    ) -> Result<Vec<Document>> {
        self.get_multiple(
            dataset,
            Query::eq(
                "metadata.observable_information_ids",
                observable_information_id,
            ),
            depth,
            source,
        )
        .await
    }

    /// Property update: rewrites the shared metadata block on every record.
    pub async fn update_time_series(
        &self,
        id: &str,
        series: TimeSeriesPropertyIn,
        dataset: &str,
    ) -> Result<Outcome<TimeSeriesOut>> {
        let mut fields = Document::new();
        fields.insert("type".to_owned(), serde_json::to_value(series.series_type)?);
        fields.insert(
            "additional_properties".to_owned(),
            serde_json::to_value(&series.additional_properties)?,
        );
        try_outcome!(
            self.store
                .set_time_series_metadata(id, fields, dataset)
                .await?
        );
        self.get_time_series(id, dataset, 0, None, None).await
    }

    pub async fn update_time_series_relationships(
        &self,
        id: &str,
        series: TimeSeriesRelationIn,
        dataset: &str,
    ) -> Result<Outcome<TimeSeriesOut>> {
        if let Some(error) = self
            .check_relations(
                series.measure_id.as_ref(),
                &series.observable_information_ids,
                dataset,
            )
            .await?
        {
            return Ok(Outcome::Invalid(error));
        }
        let mut fields = Document::new();
        fields.insert(
            "measure_id".to_owned(),
            series
                .measure_id
                .map(Value::String)
                .unwrap_or(Value::Null),
        );
        fields.insert(
            "observable_information_ids".to_owned(),
            Value::Array(
                series
                    .observable_information_ids
                    .into_iter()
                    .map(Value::String)
                    .collect(),
            ),
        );
        try_outcome!(
            self.store
                .set_time_series_metadata(id, fields, dataset)
                .await?
        );
        self.get_time_series(id, dataset, 0, None, None).await
    }

    /// Replaces the whole signal payload atomically; the series keeps its id
    /// and relationships even when the sample set changes completely.
    pub async fn update_time_series_signals(
        &self,
        id: &str,
        series: TimeSeriesIn,
        dataset: &str,
    ) -> Result<Outcome<TimeSeriesOut>> {
        try_outcome!(
            self.store
                .replace_time_series_signals(id, &series, dataset)
                .await?
        );
        self.get_time_series(id, dataset, 0, None, None).await
    }

    pub async fn delete_time_series(&self, id: &str, dataset: &str) -> Result<Outcome<TimeSeriesOut>> {
        let existing = try_outcome!(
            self.get_time_series_dict(id, dataset, 0, None, None, Source::NONE)
                .await?
        );
        try_outcome!(self.store.delete_time_series(id, dataset).await?);
        Outcome::Ok(existing).parse()
    }
}

/// Logical series fields live under `metadata` in the stored records; bare
/// paths are rewritten, record-level fields and already-prefixed paths pass
/// through.
fn series_query(query: Query) -> Query {
    query
        .clauses()
        .iter()
        .cloned()
        .fold(Query::new(), |q, (path, cond)| {
            let record_level = path.starts_with("metadata.")
                || matches!(
                    path.as_str(),
                    "value" | "timestamp" | "start_timestamp" | "end_timestamp" | "_id"
                );
            if record_level {
                q.and_cond(path, cond)
            } else if path == "id" {
                q.and_cond("metadata.id", cond)
            } else {
                q.and_cond(format!("metadata.{path}"), cond)
            }
        })
}

#[async_trait]
impl EntityService for TimeSeriesService {
    fn collection(&self) -> Collection {
        Collection::TimeSeries
    }

    fn store(&self) -> &DocStore {
        &self.store
    }

    async fn get_single_dict(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
        source: Source,
    ) -> Result<Outcome<Document>> {
        self.get_time_series_dict(id, dataset, depth, None, None, source)
            .await
    }

    async fn get_multiple(
        &self,
        dataset: &str,
        query: Query,
        depth: u32,
        source: Source,
    ) -> Result<Vec<Document>> {
        let docs = self
            .store
            .get_many_time_series(series_query(query), dataset)
            .await?;
        let mut hydrated = Vec::with_capacity(docs.len());
        for mut doc in docs {
            self.add_related(&mut doc, dataset, depth, source, None)
                .await?;
            hydrated.push(doc);
        }
        Ok(hydrated)
    }

    async fn add_related(
        &self,
        doc: &mut Document,
        dataset: &str,
        depth: u32,
        source: Source,
        _parent: Option<&Document>,
    ) -> Result<()> {
        if depth == 0 {
            return Ok(());
        }
        let origin: Source = Collection::TimeSeries.into();
        if !source.is(Collection::Measures) {
            if let Some(measure_id) = field_str(doc, "measure_id").map(str::to_owned) {
                if let Outcome::Ok(measure) = self
                    .measures()
                    .get_single_dict(&measure_id, dataset, depth - 1, origin)
                    .await?
                {
                    doc.insert("measure".to_owned(), Value::Object(measure));
                }
            }
        }
        if !source.is(Collection::ObservableInformations) {
            let ids: Vec<Value> = doc
                .get("observable_information_ids")
                .and_then(Value::as_array)
                .map(|ids| ids.to_vec())
                .unwrap_or_default();
            if !ids.is_empty() {
                let related = self
                    .observable_informations()
                    .get_multiple(dataset, Query::is_in("id", ids), depth - 1, origin)
                    .await?;
                doc.insert(
                    "observable_informations".to_owned(),
                    docs_to_array(related),
                );
            }
        }
        Ok(())
    }
}
