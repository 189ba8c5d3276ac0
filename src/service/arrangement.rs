use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;

use super::activity_execution::ActivityExecutionService;
use super::generic::EntityService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, to_document, ArrangementIn, ArrangementOut, Collection, Document,
    Outcome, Source,
};
use crate::store::{DocStore, Query};

pub struct ArrangementService {
    store: DocStore,
    pub(crate) activity_execution_service: OnceLock<Arc<ActivityExecutionService>>,
}

impl ArrangementService {
    pub fn new(store: DocStore) -> Self {
        ArrangementService {
            store,
            activity_execution_service: OnceLock::new(),
        }
    }

    fn activity_executions(&self) -> &Arc<ActivityExecutionService> {
        wired(&self.activity_execution_service)
    }

    pub async fn save_arrangement(
        &self,
        arrangement: ArrangementIn,
        dataset: &str,
    ) -> Result<Outcome<ArrangementOut>> {
        self.create_entity(to_document(&arrangement)?, dataset)
            .await?
            .parse()
    }

    pub async fn get_arrangement(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<ArrangementOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_arrangements(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }
}

#[async_trait]
impl EntityService for ArrangementService {
    fn collection(&self) -> Collection {
        Collection::Arrangements
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
        if depth == 0 || source.is(Collection::ActivityExecutions) {
            return Ok(());
        }
        let Some(id) = doc_id(doc).map(str::to_owned) else {
            return Ok(());
        };
        let related = self
            .activity_executions()
            .get_multiple(
                dataset,
                Query::eq("arrangement_id", id),
                depth - 1,
                Collection::Arrangements.into(),
            )
            .await?;
        doc.insert("activity_executions".to_owned(), docs_to_array(related));
        Ok(())
    }
}
