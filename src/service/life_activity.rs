use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;

use super::generic::EntityService;
use super::observable_information::ObservableInformationService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, to_document, Collection, Document, LifeActivityIn, LifeActivityOut,
    Outcome, Source,
};
use crate::store::{DocStore, Query};

pub struct LifeActivityService {
    store: DocStore,
    pub(crate) observable_information_service: OnceLock<Arc<ObservableInformationService>>,
}

impl LifeActivityService {
    pub fn new(store: DocStore) -> Self {
        LifeActivityService {
            store,
            observable_information_service: OnceLock::new(),
        }
    }

    fn observable_informations(&self) -> &Arc<ObservableInformationService> {
        wired(&self.observable_information_service)
    }

    pub async fn save_life_activity(
        &self,
        life_activity: LifeActivityIn,
        dataset: &str,
    ) -> Result<Outcome<LifeActivityOut>> {
        self.create_entity(to_document(&life_activity)?, dataset)
            .await?
            .parse()
    }

    pub async fn get_life_activity(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<LifeActivityOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_life_activities(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }
}

#[async_trait]
impl EntityService for LifeActivityService {
    fn collection(&self) -> Collection {
        Collection::LifeActivities
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
        if depth == 0 || source.is(Collection::ObservableInformations) {
            return Ok(());
        }
        let Some(id) = doc_id(doc).map(str::to_owned) else {
            return Ok(());
        };
        let related = self
            .observable_informations()
            .get_multiple(
                dataset,
                Query::eq("life_activity_id", id),
                depth - 1,
                Collection::LifeActivities.into(),
            )
            .await?;
        doc.insert(
            "observable_informations".to_owned(),
            docs_to_array(related),
        );
        Ok(())
    }
}
