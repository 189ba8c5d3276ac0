use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;

use super::generic::EntityService;
use super::measure::MeasureService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, to_document, Collection, Document, MeasureNameIn, MeasureNameOut,
    Outcome, Source,
};
use crate::store::{DocStore, Query};

pub struct MeasureNameService {
    store: DocStore,
    pub(crate) measure_service: OnceLock<Arc<MeasureService>>,
}

impl MeasureNameService {
    pub fn new(store: DocStore) -> Self {
        MeasureNameService {
            store,
            measure_service: OnceLock::new(),
        }
    }

    fn measures(&self) -> &Arc<MeasureService> {
        wired(&self.measure_service)
    }

    pub async fn save_measure_name(
        &self,
        measure_name: MeasureNameIn,
        dataset: &str,
    ) -> Result<Outcome<MeasureNameOut>> {
        self.create_entity(to_document(&measure_name)?, dataset)
            .await?
            .parse()
    }

    pub async fn get_measure_name(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<MeasureNameOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_measure_names(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }
}

#[async_trait]
impl EntityService for MeasureNameService {
    fn collection(&self) -> Collection {
        Collection::MeasureNames
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
        if depth == 0 || source.is(Collection::Measures) {
            return Ok(());
        }
        let Some(id) = doc_id(doc).map(str::to_owned) else {
            return Ok(());
        };
        let related = self
            .measures()
            .get_multiple(
                dataset,
                Query::eq("measure_name_id", id),
                depth - 1,
                Collection::MeasureNames.into(),
            )
            .await?;
        doc.insert("measures".to_owned(), docs_to_array(related));
        Ok(())
    }
}
