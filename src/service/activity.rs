use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::activity_execution::ActivityExecutionService;
use super::generic::EntityService;
use super::wired;
use crate::model::{
    to_document, ActivityIn, ActivityOut, Collection, Document, Outcome, Source,
};
use crate::store::{DocStore, Query};

/// Activities carry their executions as embedded children; hydrating an
/// activity delegates each child to the execution service with this activity
/// as parent.
pub struct ActivityService {
    store: DocStore,
    pub(crate) activity_execution_service: OnceLock<Arc<ActivityExecutionService>>,
}

impl ActivityService {
    pub fn new(store: DocStore) -> Self {
        ActivityService {
            store,
            activity_execution_service: OnceLock::new(),
        }
    }

    fn activity_executions(&self) -> &Arc<ActivityExecutionService> {
        wired(&self.activity_execution_service)
    }

    pub async fn save_activity(
        &self,
        activity: ActivityIn,
        dataset: &str,
    ) -> Result<Outcome<ActivityOut>> {
        self.create_entity(to_document(&activity)?, dataset)
            .await?
            .parse()
    }

    pub async fn get_activity(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<ActivityOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_activities(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }
}

#[async_trait]
impl EntityService for ActivityService {
    fn collection(&self) -> Collection {
        Collection::Activities
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
        let field = Collection::ActivityExecutions.name();
        if let Some(Value::Array(children)) = doc.get(field).cloned() {
            let mut parent = doc.clone();
            parent.remove(field);
            let mut hydrated = Vec::with_capacity(children.len());
            for child in children {
                let Value::Object(mut child) = child else {
                    continue;
                };
                self.activity_executions()
                    .add_related(
                        &mut child,
                        dataset,
                        depth - 1,
                        Collection::Activities.into(),
                        Some(&parent),
                    )
                    .await?;
                hydrated.push(Value::Object(child));
            }
            doc.insert(field.to_owned(), Value::Array(hydrated));
        }
        Ok(())
    }
}
