use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::activity::ActivityService;
use super::arrangement::ArrangementService;
use super::embedded::{children_of, find_child, push_child, remove_child, replace_child};
use super::generic::EntityService;
use super::participation::ParticipationService;
use super::scenario::ScenarioService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, field_str, to_document, ActivityExecutionIn, ActivityExecutionOut,
    ActivityExecutionPropertyIn, ActivityExecutionRelationIn, Collection, Document, ObjectId,
    Outcome, Source,
};
use crate::store::{DocStore, Query};

/// Activity executions live embedded inside their activity document; reads
/// locate them through the activities collection and writes splice the
/// parent's child array.
pub struct ActivityExecutionService {
    store: DocStore,
    pub(crate) activity_service: OnceLock<Arc<ActivityService>>,
    pub(crate) arrangement_service: OnceLock<Arc<ArrangementService>>,
    pub(crate) scenario_service: OnceLock<Arc<ScenarioService>>,
    pub(crate) participation_service: OnceLock<Arc<ParticipationService>>,
}

impl ActivityExecutionService {
    pub fn new(store: DocStore) -> Self {
        ActivityExecutionService {
            store,
            activity_service: OnceLock::new(),
            arrangement_service: OnceLock::new(),
            scenario_service: OnceLock::new(),
            participation_service: OnceLock::new(),
        }
    }

    fn activities(&self) -> &Arc<ActivityService> {
        wired(&self.activity_service)
    }

    fn arrangements(&self) -> &Arc<ArrangementService> {
        wired(&self.arrangement_service)
    }

    fn scenarios(&self) -> &Arc<ScenarioService> {
        wired(&self.scenario_service)
    }

    fn participations(&self) -> &Arc<ParticipationService> {
        wired(&self.participation_service)
    }

    fn child_field(&self) -> &'static str {
        Collection::ActivityExecutions.name()
    }

    /// The owning activity is mandatory; the arrangement only needs to exist
    /// when given.
    async fn check_relations(
        &self,
        activity_id: Option<&String>,
        arrangement_id: Option<&String>,
        dataset: &str,
    ) -> Result<Option<String>> {
        match activity_id {
            Some(activity_id) => {
                let activity = self
                    .activities()
                    .get_single_dict(activity_id, dataset, 0, Source::NONE)
                    .await?;
                if !activity.is_ok() {
                    return Ok(Some("given activity does not exist".to_owned()));
                }
            }
            None => return Ok(Some("given activity does not exist".to_owned())),
        }
        if let Some(arrangement_id) = arrangement_id {
            let arrangement = self
                .arrangements()
                .get_single_dict(arrangement_id, dataset, 0, Source::NONE)
                .await?;
            if !arrangement.is_ok() {
                return Ok(Some("given arrangement does not exist".to_owned()));
            }
        }
        Ok(None)
    }

    /// Raw parent activity containing the child, straight from the store.
    async fn parent_of(&self, child_id: &str, dataset: &str) -> Result<Outcome<Document>> {
        let oid = match ObjectId::parse_str(child_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(child_id, "not a valid document id")),
        };
        let parents = self
            .store
            .get_documents(
                Query::eq(format!("{}.id", self.child_field()), oid.to_hex()),
                Collection::Activities,
                dataset,
            )
            .await?;
        match parents.into_iter().next() {
            Some(parent) => Ok(Outcome::Ok(parent)),
            None => Ok(Outcome::not_found(child_id, "document not found")),
        }
    }

    pub async fn save_activity_execution(
        &self,
        execution: ActivityExecutionIn,
        dataset: &str,
    ) -> Result<Outcome<ActivityExecutionOut>> {
        if let Some(error) = self
            .check_relations(
                execution.activity_id.as_ref(),
                execution.arrangement_id.as_ref(),
                dataset,
            )
            .await?
        {
            return Ok(Outcome::Invalid(error));
        }
        let activity_id = execution.activity_id.clone().unwrap_or_default();
        let mut parent = match self
            .store
            .get_document(&activity_id, Collection::Activities, dataset)
            .await?
        {
            Outcome::Ok(doc) => doc,
            other => return other.parse(),
        };
        let mut child = to_document(&execution)?;
        let child_id = ObjectId::new().to_hex();
        child.insert("id".to_owned(), Value::String(child_id.clone()));
        push_child(&mut parent, self.child_field(), child);
        match self
            .store
            .replace_document(&activity_id, parent, Collection::Activities, dataset)
            .await?
        {
            Outcome::Ok(()) => self.get_activity_execution(&child_id, dataset, 0).await,
            Outcome::NotFound(nf) => Ok(Outcome::NotFound(nf)),
            Outcome::Invalid(msg) => Ok(Outcome::Invalid(msg)),
        }
    }

    pub async fn get_activity_execution(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<ActivityExecutionOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_activity_executions(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }

    pub async fn update_activity_execution(
        &self,
        id: &str,
        execution: ActivityExecutionPropertyIn,
        dataset: &str,
    ) -> Result<Outcome<ActivityExecutionOut>> {
        let mut parent = match self.parent_of(id, dataset).await? {
            Outcome::Ok(doc) => doc,
            other => return other.parse(),
        };
        let parent_id = doc_id(&parent).unwrap_or_default().to_owned();
        let oid = ObjectId::parse_str(id)?;
        let mut child = match find_child(&parent, self.child_field(), &oid.to_hex()) {
            Some(child) => child,
            None => return Ok(Outcome::not_found(id, "document not found")),
        };
        for (key, value) in to_document(&execution)? {
            child.insert(key, value);
        }
        replace_child(&mut parent, self.child_field(), &oid.to_hex(), child);
        self.store
            .replace_document(&parent_id, parent, Collection::Activities, dataset)
            .await?;
        self.get_activity_execution(id, dataset, 0).await
    }

    /// Overlays the relation fields; a changed `activity_id` moves the child
    /// to its new parent activity.
    pub async fn update_activity_execution_relationships(
        &self,
        id: &str,
        execution: ActivityExecutionRelationIn,
        dataset: &str,
    ) -> Result<Outcome<ActivityExecutionOut>> {
        if let Some(error) = self
            .check_relations(
                execution.activity_id.as_ref(),
                execution.arrangement_id.as_ref(),
                dataset,
            )
            .await?
        {
            return Ok(Outcome::Invalid(error));
        }
        let mut parent = match self.parent_of(id, dataset).await? {
            Outcome::Ok(doc) => doc,
            other => return other.parse(),
        };
        let parent_id = doc_id(&parent).unwrap_or_default().to_owned();
        let oid = ObjectId::parse_str(id)?;
        let mut child = match find_child(&parent, self.child_field(), &oid.to_hex()) {
            Some(child) => child,
            None => return Ok(Outcome::not_found(id, "document not found")),
        };
        for (key, value) in to_document(&execution)? {
            child.insert(key, value);
        }

        let target_id = execution.activity_id.clone().unwrap_or_default();
        let moved = ObjectId::parse_str(&target_id)
            .map(|t| ObjectId::parse_str(&parent_id).map(|p| t != p).unwrap_or(true))
            .unwrap_or(false);
        if moved {
            remove_child(&mut parent, self.child_field(), &oid.to_hex());
            let outcome = self
                .store
                .replace_document(&parent_id, parent, Collection::Activities, dataset)
                .await?;
            if let Outcome::Ok(()) = outcome {
                let mut target = match self
                    .store
                    .get_document(&target_id, Collection::Activities, dataset)
                    .await?
                {
                    Outcome::Ok(doc) => doc,
                    other => return other.parse(),
                };
                push_child(&mut target, self.child_field(), child);
                self.store
                    .replace_document(&target_id, target, Collection::Activities, dataset)
                    .await?;
            }
        } else {
            replace_child(&mut parent, self.child_field(), &oid.to_hex(), child);
            self.store
                .replace_document(&parent_id, parent, Collection::Activities, dataset)
                .await?;
        }
        self.get_activity_execution(id, dataset, 0).await
    }

    pub async fn delete_activity_execution(
        &self,
        id: &str,
        dataset: &str,
    ) -> Result<Outcome<Document>> {
        let mut parent = match self.parent_of(id, dataset).await? {
            Outcome::Ok(doc) => doc,
            Outcome::NotFound(nf) => return Ok(Outcome::NotFound(nf)),
            Outcome::Invalid(msg) => return Ok(Outcome::Invalid(msg)),
        };
        let parent_id = doc_id(&parent).unwrap_or_default().to_owned();
        let oid = ObjectId::parse_str(id)?;
        let Some(child) = remove_child(&mut parent, self.child_field(), &oid.to_hex()) else {
            return Ok(Outcome::not_found(id, "document not found"));
        };
        self.store
            .replace_document(&parent_id, parent, Collection::Activities, dataset)
            .await?;
        Ok(Outcome::Ok(child))
    }
}

#[async_trait]
impl EntityService for ActivityExecutionService {
    fn collection(&self) -> Collection {
        Collection::ActivityExecutions
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
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(id, "not a valid document id")),
        };
        let parents = self
            .activities()
            .get_multiple(
                dataset,
                Query::eq(format!("{}.id", self.child_field()), oid.to_hex()),
                depth.saturating_sub(1),
                Collection::ActivityExecutions.into(),
            )
            .await?;
        let Some(mut parent) = parents.into_iter().next() else {
            return Ok(Outcome::not_found(id, "document not found"));
        };
        let Some(mut child) = find_child(&parent, self.child_field(), &oid.to_hex()) else {
            return Ok(Outcome::not_found(id, "document not found"));
        };
        parent.remove(self.child_field());
        self.add_related(&mut child, dataset, depth, source, Some(&parent))
            .await?;
        Ok(Outcome::Ok(child))
    }

    async fn get_multiple(
        &self,
        dataset: &str,
        query: Query,
        depth: u32,
        source: Source,
    ) -> Result<Vec<Document>> {
        let parents = self
            .activities()
            .get_multiple(
                dataset,
                query.clone().prefixed(self.child_field()).normalize_ids(),
                depth.saturating_sub(1),
                Collection::ActivityExecutions.into(),
            )
            .await?;
        let child_query = query.normalize_ids();
        let mut children = Vec::new();
        for mut parent in parents {
            let own = children_of(&parent, self.child_field());
            parent.remove(self.child_field());
            for mut child in own.into_iter().filter(|c| child_query.matches(c)) {
                self.add_related(&mut child, dataset, depth, source, Some(&parent))
                    .await?;
                children.push(child);
            }
        }
        Ok(children)
    }

    async fn add_related(
        &self,
        doc: &mut Document,
        dataset: &str,
        depth: u32,
        source: Source,
        parent: Option<&Document>,
    ) -> Result<()> {
        if depth == 0 {
            return Ok(());
        }
        // executions reached without a marked origin behave as the origin
        // themselves, and their outgoing hops carry that marker along
        let source = source.or(Collection::ActivityExecutions);
        if let Some(arrangement_id) = field_str(doc, "arrangement_id").map(str::to_owned) {
            if !source.is(Collection::Arrangements) {
                if let Outcome::Ok(arrangement) = self
                    .arrangements()
                    .get_single_dict(&arrangement_id, dataset, depth - 1, source)
                    .await?
                {
                    doc.insert("arrangement".to_owned(), Value::Object(arrangement));
                }
            }
        }
        if !source.is(Collection::Experiments) && !source.is(Collection::Scenarios) {
            if let Some(id) = doc_id(doc).map(str::to_owned) {
                if let Outcome::Ok(scenarios) = self
                    .scenarios()
                    .get_scenarios_by_activity_execution(&id, dataset, depth, source)
                    .await?
                {
                    let experiments: Vec<Value> = scenarios
                        .iter()
                        .filter_map(|s| s.get("experiment"))
                        .cloned()
                        .collect();
                    doc.insert("experiments".to_owned(), Value::Array(experiments));
                }
            }
        }
        if !source.is(Collection::Participations) {
            if let Some(id) = doc_id(doc).map(str::to_owned) {
                let participations = self
                    .participations()
                    .get_multiple(
                        dataset,
                        Query::eq("activity_execution_id", id),
                        depth - 1,
                        source,
                    )
                    .await?;
                doc.insert("participations".to_owned(), docs_to_array(participations));
            }
        }
        if !source.is(Collection::Activities) {
            if let Some(parent) = parent {
                doc.insert("activity".to_owned(), Value::Object(parent.clone()));
            }
        }
        Ok(())
    }
}
