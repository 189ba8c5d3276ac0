use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::generic::EntityService;
use super::participant_state::ParticipantStateService;
use super::wired;
use crate::model::{
    to_document, Collection, Document, Outcome, ParticipantIn, ParticipantOut, Source,
};
use crate::store::{DocStore, Query};

/// Participants carry their states as embedded children.
pub struct ParticipantService {
    store: DocStore,
    pub(crate) participant_state_service: OnceLock<Arc<ParticipantStateService>>,
}

impl ParticipantService {
    pub fn new(store: DocStore) -> Self {
        ParticipantService {
            store,
            participant_state_service: OnceLock::new(),
        }
    }

    fn participant_states(&self) -> &Arc<ParticipantStateService> {
        wired(&self.participant_state_service)
    }

    pub async fn save_participant(
        &self,
        participant: ParticipantIn,
        dataset: &str,
    ) -> Result<Outcome<ParticipantOut>> {
        self.create_entity(to_document(&participant)?, dataset)
            .await?
            .parse()
    }

    pub async fn get_participant(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<ParticipantOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_participants(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }

    /// Property update; the embedded states survive the replace.
    pub async fn update_participant(
        &self,
        id: &str,
        participant: ParticipantIn,
        dataset: &str,
    ) -> Result<Outcome<ParticipantOut>> {
        let mut existing = match self.get_single_dict(id, dataset, 0, Source::NONE).await? {
            Outcome::Ok(doc) => doc,
            other => return other.parse(),
        };
        for (key, value) in to_document(&participant)? {
            existing.insert(key, value);
        }
        self.update_entity(id, existing, dataset).await?.parse()
    }

    pub async fn delete_participant(&self, id: &str, dataset: &str) -> Result<Outcome<Document>> {
        self.delete_entity(id, dataset).await
    }
}

#[async_trait]
impl EntityService for ParticipantService {
    fn collection(&self) -> Collection {
        Collection::Participants
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
        if depth == 0 || source.is(Collection::ParticipantStates) {
            return Ok(());
        }
        let field = Collection::ParticipantStates.name();
        if let Some(Value::Array(children)) = doc.get(field).cloned() {
            let mut parent = doc.clone();
            parent.remove(field);
            let mut hydrated = Vec::with_capacity(children.len());
            for child in children {
                let Value::Object(mut child) = child else {
                    continue;
                };
                self.participant_states()
                    .add_related(
                        &mut child,
                        dataset,
                        depth - 1,
                        Collection::Participants.into(),
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
