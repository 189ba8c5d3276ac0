use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::generic::EntityService;
use super::measure_name::MeasureNameService;
use super::time_series::TimeSeriesService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, field_str, to_document, Collection, Document, MeasureIn, MeasureOut,
    MeasurePropertyIn, MeasureRelationIn, Outcome, Source,
};
use crate::store::{DocStore, Query};

pub struct MeasureService {
    store: DocStore,
    pub(crate) measure_name_service: OnceLock<Arc<MeasureNameService>>,
    pub(crate) time_series_service: OnceLock<Arc<TimeSeriesService>>,
}

impl MeasureService {
    pub fn new(store: DocStore) -> Self {
        MeasureService {
            store,
            measure_name_service: OnceLock::new(),
            time_series_service: OnceLock::new(),
        }
    }

    fn measure_names(&self) -> &Arc<MeasureNameService> {
        wired(&self.measure_name_service)
    }

    fn time_series(&self) -> &Arc<TimeSeriesService> {
        wired(&self.time_series_service)
    }

    async fn check_relations(
        &self,
        measure_name_id: Option<&String>,
        dataset: &str,
    ) -> Result<Option<String>> {
        if let Some(measure_name_id) = measure_name_id {
            let measure_name = self
                .measure_names()
                .get_single_dict(measure_name_id, dataset, 0, Source::NONE)
                .await?;
            if !measure_name.is_ok() {
                return Ok(Some("given measure name does not exist".to_owned()));
            }
        }
        Ok(None)
    }

    pub async fn save_measure(
        &self,
        measure: MeasureIn,
        dataset: &str,
    ) -> Result<Outcome<MeasureOut>> {
        if let Some(error) = self
            .check_relations(measure.measure_name_id.as_ref(), dataset)
            .await?
        {
            return Ok(Outcome::Invalid(error));
        }
        self.create_entity(to_document(&measure)?, dataset)
            .await?
            .parse()
    }

    pub async fn get_measure(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<MeasureOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_measures(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }

    pub async fn update_measure(
        &self,
        id: &str,
        measure: MeasurePropertyIn,
        dataset: &str,
    ) -> Result<Outcome<MeasureOut>> {
        let mut existing = match self.get_single_dict(id, dataset, 0, Source::NONE).await? {
            Outcome::Ok(doc) => doc,
            other => return other.parse(),
        };
        for (key, value) in to_document(&measure)? {
            existing.insert(key, value);
        }
        self.update_entity(id, existing, dataset).await?.parse()
    }

    pub async fn update_measure_relationships(
        &self,
        id: &str,
        measure: MeasureRelationIn,
        dataset: &str,
    ) -> Result<Outcome<MeasureOut>> {
        if let Some(error) = self
            .check_relations(measure.measure_name_id.as_ref(), dataset)
            .await?
        {
            return Ok(Outcome::Invalid(error));
        }
        let mut existing = match self.get_single_dict(id, dataset, 0, Source::NONE).await? {
            Outcome::Ok(doc) => doc,
            other => return other.parse(),
        };
        for (key, value) in to_document(&measure)? {
            existing.insert(key, value);
        }
        self.update_entity(id, existing, dataset).await?.parse()
    }

    pub async fn delete_measure(&self, id: &str, dataset: &str) -> Result<Outcome<Document>> {
        self.delete_entity(id, dataset).await
    }
}

#[async_trait]
impl EntityService for MeasureService {
    fn collection(&self) -> Collection {
        Collection::Measures
    }

    fn store(&self) -> &DocStore {
        &self.store
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
        if !source.is(Collection::TimeSeries) {
            if let Some(id) = doc_id(doc).map(str::to_owned) {
                let series = self
                    .time_series()
                    .get_multiple(
                        dataset,
                        Query::eq("measure_id", id),
                        depth - 1,
                        Collection::Measures.into(),
                    )
                    .await?;
                doc.insert("time_series".to_owned(), docs_to_array(series));
            }
        }
        if !source.is(Collection::MeasureNames) {
            if let Some(measure_name_id) = field_str(doc, "measure_name_id").map(str::to_owned) {
                if let Outcome::Ok(measure_name) = self
                    .measure_names()
                    .get_single_dict(
                        &measure_name_id,
                        dataset,
                        depth - 1,
                        Collection::Measures.into(),
                    )
                    .await?
                {
                    doc.insert("measure_name".to_owned(), Value::Object(measure_name));
                }
            }
        }
        Ok(())
    }
}
