use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::activity_execution::ActivityExecutionService;
use super::generic::EntityService;
use super::participant_state::ParticipantStateService;
use super::recording::RecordingService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, field_str, to_document, Collection, Document, Outcome,
    ParticipationIn, ParticipationOut, Source,
};
use crate::store::{DocStore, Query};

pub struct ParticipationService {
    store: DocStore,
    pub(crate) activity_execution_service: OnceLock<Arc<ActivityExecutionService>>,
    pub(crate) participant_state_service: OnceLock<Arc<ParticipantStateService>>,
    pub(crate) recording_service: OnceLock<Arc<RecordingService>>,
}

impl ParticipationService {
    pub fn new(store: DocStore) -> Self {
        ParticipationService {
            store,
            activity_execution_service: OnceLock::new(),
            participant_state_service: OnceLock::new(),
            recording_service: OnceLock::new(),
        }
    }

    fn activity_executions(&self) -> &Arc<ActivityExecutionService> {
        wired(&self.activity_execution_service)
    }

    fn participant_states(&self) -> &Arc<ParticipantStateService> {
        wired(&self.participant_state_service)
    }

    fn recordings(&self) -> &Arc<RecordingService> {
        wired(&self.recording_service)
    }

    async fn check_relations(
        &self,
        activity_execution_id: Option<&String>,
        participant_state_id: Option<&String>,
        dataset: &str,
    ) -> Result<Option<String>> {
        if let Some(activity_execution_id) = activity_execution_id {
            let execution = self
                .activity_executions()
                .get_single_dict(activity_execution_id, dataset, 0, Source::NONE)
                .await?;
            if !execution.is_ok() {
                return Ok(Some("given activity execution does not exist".to_owned()));
            }
        }
        if let Some(participant_state_id) = participant_state_id {
            let state = self
                .participant_states()
                .get_single_dict(participant_state_id, dataset, 0, Source::NONE)
                .await?;
            if !state.is_ok() {
                return Ok(Some("given participant state does not exist".to_owned()));
            }
        }
        Ok(None)
    }

    pub async fn save_participation(
        &self,
        participation: ParticipationIn,
        dataset: &str,
    ) -> Result<Outcome<ParticipationOut>> {
        if let Some(error) = self
            .check_relations(
                participation.activity_execution_id.as_ref(),
                participation.participant_state_id.as_ref(),
                dataset,
            )
            .await?
        {
            return Ok(Outcome::Invalid(error));
        }
        self.create_entity(to_document(&participation)?, dataset)
            .await?
            .parse()
    }

    pub async fn get_participation(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<ParticipationOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_participations(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }

    pub async fn update_participation_relationships(
        &self,
        id: &str,
        participation: ParticipationIn,
        dataset: &str,
    ) -> Result<Outcome<ParticipationOut>> {
        if let Some(error) = self
            .check_relations(
                participation.activity_execution_id.as_ref(),
                participation.participant_state_id.as_ref(),
                dataset,
            )
            .await?
        {
            return Ok(Outcome::Invalid(error));
        }
        let mut existing = match self.get_single_dict(id, dataset, 0, Source::NONE).await? {
            Outcome::Ok(doc) => doc,
            other => return other.parse(),
        };
        for (key, value) in to_document(&participation)? {
            existing.insert(key, value);
        }
        self.update_entity(id, existing, dataset).await?.parse()
    }

    pub async fn delete_participation(&self, id: &str, dataset: &str) -> Result<Outcome<Document>> {
        self.delete_entity(id, dataset).await
    }
}

#[async_trait]
impl EntityService for ParticipationService {
    fn collection(&self) -> Collection {
        Collection::Participations
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
        if !source.is(Collection::Recordings) {
            if let Some(id) = doc_id(doc).map(str::to_owned) {
                let recordings = self
                    .recordings()
                    .get_multiple(
                        dataset,
                        Query::eq("participation_id", id),
                        depth - 1,
                        Collection::Participations.into(),
                    )
                    .await?;
                doc.insert("recordings".to_owned(), docs_to_array(recordings));
            }
        }
        if !source.is(Collection::ParticipantStates) {
            if let Some(state_id) = field_str(doc, "participant_state_id").map(str::to_owned) {
                if let Outcome::Ok(state) = self
                    .participant_states()
                    .get_single_dict(
                        &state_id,
                        dataset,
                        depth - 1,
                        Collection::Participations.into(),
                    )
                    .await?
                {
                    doc.insert("participant_state".to_owned(), Value::Object(state));
                }
            }
        }
        // the execution is fetched with itself as the marked origin, so its
        // own hydration runs in stand-alone form
        if !source.is(Collection::ActivityExecutions) && !source.is(Collection::Experiments) {
            if let Some(execution_id) = field_str(doc, "activity_execution_id").map(str::to_owned)
            {
                if let Outcome::Ok(execution) = self
                    .activity_executions()
                    .get_single_dict(
                        &execution_id,
                        dataset,
                        depth - 1,
                        Collection::ActivityExecutions.into(),
                    )
                    .await?
                {
                    doc.insert("activity_execution".to_owned(), Value::Object(execution));
                }
            }
        }
        Ok(())
    }
}
