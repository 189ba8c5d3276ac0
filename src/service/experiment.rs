use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;

use super::generic::EntityService;
use super::scenario::ScenarioService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, to_document, Collection, Document, ExperimentIn, ExperimentOut,
    Outcome, Source,
};
use crate::store::{DocStore, Query};

pub struct ExperimentService {
    store: DocStore,
    pub(crate) scenario_service: OnceLock<Arc<ScenarioService>>,
}

impl ExperimentService {
    pub fn new(store: DocStore) -> Self {
        ExperimentService {
            store,
            scenario_service: OnceLock::new(),
        }
    }

    fn scenarios(&self) -> &Arc<ScenarioService> {
        wired(&self.scenario_service)
    }

    pub async fn save_experiment(
        &self,
        experiment: ExperimentIn,
        dataset: &str,
    ) -> Result<Outcome<ExperimentOut>> {
        self.create_entity(to_document(&experiment)?, dataset)
            .await?
            .parse()
    }

    pub async fn get_experiment(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<ExperimentOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_experiments(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }

    pub async fn update_experiment(
        &self,
        id: &str,
        experiment: ExperimentIn,
        dataset: &str,
    ) -> Result<Outcome<ExperimentOut>> {
        let mut existing = match self.get_single_dict(id, dataset, 0, Source::NONE).await? {
            Outcome::Ok(doc) => doc,
            other => return other.parse(),
        };
        for (key, value) in to_document(&experiment)? {
            existing.insert(key, value);
        }
        self.update_entity(id, existing, dataset).await?.parse()
    }

    pub async fn delete_experiment(&self, id: &str, dataset: &str) -> Result<Outcome<Document>> {
        self.delete_entity(id, dataset).await
    }
}

#[async_trait]
impl EntityService for ExperimentService {
    fn collection(&self) -> Collection {
        Collection::Experiments
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
        // scenarios are transparent in traversal, so reaching the scenarios
        // costs no hop; an execution origin is suppressed the same way a
        // scenario origin would be
        if depth == 0
            || source.is(Collection::Scenarios)
            || source.is(Collection::Experiments)
            || source.is(Collection::ActivityExecutions)
        {
            return Ok(());
        }
        let source = source.or(Collection::Experiments);
        let Some(id) = doc_id(doc).map(str::to_owned) else {
            return Ok(());
        };
        if let Outcome::Ok(scenarios) = self
            .scenarios()
            .get_scenarios_by_experiment(&id, dataset, depth, source)
            .await?
        {
            doc.insert("scenarios".to_owned(), docs_to_array(scenarios));
        }
        Ok(())
    }
}
