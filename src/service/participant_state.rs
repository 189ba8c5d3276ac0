use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::appearance::AppearanceService;
use super::embedded::{children_of, find_child, push_child, remove_child, replace_child};
use super::generic::EntityService;
use super::participant::ParticipantService;
use super::participation::ParticipationService;
use super::personality::PersonalityService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, to_document, Collection, Document, ObjectId, Outcome, ParticipantStateIn,
    ParticipantStateOut, ParticipantStatePropertyIn, ParticipantStateRelationIn, Source,
};
use crate::store::{DocStore, Query};

/// Participant states live embedded inside their participant document.
pub struct ParticipantStateService {
    store: DocStore,
    pub(crate) participant_service: OnceLock<Arc<ParticipantService>>,
    pub(crate) personality_service: OnceLock<Arc<PersonalityService>>,
    pub(crate) appearance_service: OnceLock<Arc<AppearanceService>>,
    pub(crate) participation_service: OnceLock<Arc<ParticipationService>>,
}

impl ParticipantStateService {
    pub fn new(store: DocStore) -> Self {
        ParticipantStateService {
            store,
            participant_service: OnceLock::new(),
            personality_service: OnceLock::new(),
            appearance_service: OnceLock::new(),
            participation_service: OnceLock::new(),
        }
    }

    fn participants(&self) -> &Arc<ParticipantService> {
        wired(&self.participant_service)
    }

    fn personalities(&self) -> &Arc<PersonalityService> {
        wired(&self.personality_service)
    }

    fn appearances(&self) -> &Arc<AppearanceService> {
        wired(&self.appearance_service)
    }

    fn participations(&self) -> &Arc<ParticipationService> {
        wired(&self.participation_service)
    }

    fn child_field(&self) -> &'static str {
        Collection::ParticipantStates.name()
    }

    /// The owning participant is mandatory; every referenced personality and
    /// appearance must exist.
    async fn check_relations(
        &self,
        participant_id: Option<&String>,
        personality_ids: &[String],
        appearance_ids: &[String],
        dataset: &str,
    ) -> Result<Option<String>> {
        match participant_id {
            Some(participant_id) => {
                let participant = self
                    .participants()
                    .get_single_dict(participant_id, dataset, 0, Source::NONE)
                    .await?;
                if !participant.is_ok() {
                    return Ok(Some("given participant does not exist".to_owned()));
                }
            }
            None => return Ok(Some("given participant does not exist".to_owned())),
        }
        if !personality_ids.is_empty() {
            let found = self
                .personalities()
                .get_multiple(
                    dataset,
                    Query::is_in(
                        "_id",
                        personality_ids.iter().cloned().map(Value::String).collect(),
                    ),
                    0,
                    Source::NONE,
                )
                .await?;
            if found.len() != personality_ids.len() {
                return Ok(Some("given personality does not exist".to_owned()));
            }
        }
        if !appearance_ids.is_empty() {
            let found = self
                .appearances()
                .get_multiple(
                    dataset,
                    Query::is_in(
                        "_id",
                        appearance_ids.iter().cloned().map(Value::String).collect(),
                    ),
                    0,
                    Source::NONE,
                )
                .await?;
            if found.len() != appearance_ids.len() {
                return Ok(Some("given appearance does not exist".to_owned()));
            }
        }
        Ok(None)
    }

    /// Raw parent participant containing the child.
    async fn parent_of(&self, child_id: &str, dataset: &str) -> Result<Outcome<Document>> {
        let oid = match ObjectId::parse_str(child_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(Outcome::not_found(child_id, "not a valid document id")),
        };
        let parents = self
            .store
            .get_documents(
                Query::eq(format!("{}.id", self.child_field()), oid.to_hex()),
                Collection::Participants,
                dataset,
            )
            .await?;
        match parents.into_iter().next() {
            Some(parent) => Ok(Outcome::Ok(parent)),
            None => Ok(Outcome::not_found(child_id, "document not found")),
        }
    }

    pub async fn save_participant_state(
        &self,
        state: ParticipantStateIn,
        dataset: &str,
    ) -> Result<Outcome<ParticipantStateOut>> {
        if let Some(error) = self
            .check_relations(
                state.participant_id.as_ref(),
                &state.personality_ids,
                &state.appearance_ids,
                dataset,
            )
            .await?
        {
            return Ok(Outcome::Invalid(error));
        }
        let participant_id = state.participant_id.clone().unwrap_or_default();
        let mut parent = match self
            .store
            .get_document(&participant_id, Collection::Participants, dataset)
            .await?
        {
            Outcome::Ok(doc) => doc,
            other => return other.parse(),
        };
        let mut child = to_document(&state)?;
        let child_id = ObjectId::new().to_hex();
        child.insert("id".to_owned(), Value::String(child_id.clone()));
        push_child(&mut parent, self.child_field(), child);
        match self
            .store
            .replace_document(&participant_id, parent, Collection::Participants, dataset)
            .await?
        {
            Outcome::Ok(()) => self.get_participant_state(&child_id, dataset, 0).await,
            Outcome::NotFound(nf) => Ok(Outcome::NotFound(nf)),
            Outcome::Invalid(msg) => Ok(Outcome::Invalid(msg)),
        }
    }

    pub async fn get_participant_state(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<ParticipantStateOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_participant_states(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }

    pub async fn update_participant_state(
        &self,
        id: &str,
        state: ParticipantStatePropertyIn,
        dataset: &str,
    ) -> Result<Outcome<ParticipantStateOut>> {
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
        for (key, value) in to_document(&state)? {
            child.insert(key, value);
        }
        replace_child(&mut parent, self.child_field(), &oid.to_hex(), child);
        self.store
            .replace_document(&parent_id, parent, Collection::Participants, dataset)
            .await?;
        self.get_participant_state(id, dataset, 0).await
    }

    /// Overlays the relation fields; a changed `participant_id` moves the
    /// child to its new parent participant.
    pub async fn update_participant_state_relationships(
        &self,
        id: &str,
        state: ParticipantStateRelationIn,
        dataset: &str,
    ) -> Result<Outcome<ParticipantStateOut>> {
        if let Some(error) = self
            .check_relations(
                state.participant_id.as_ref(),
                &state.personality_ids,
                &state.appearance_ids,
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
        for (key, value) in to_document(&state)? {
            child.insert(key, value);
        }

        let target_id = state.participant_id.clone().unwrap_or_default();
        let moved = ObjectId::parse_str(&target_id)
            .map(|t| ObjectId::parse_str(&parent_id).map(|p| t != p).unwrap_or(true))
            .unwrap_or(false);
        if moved {
            remove_child(&mut parent, self.child_field(), &oid.to_hex());
            let outcome = self
                .store
                .replace_document(&parent_id, parent, Collection::Participants, dataset)
                .await?;
            if let Outcome::Ok(()) = outcome {
                let mut target = match self
                    .store
                    .get_document(&target_id, Collection::Participants, dataset)
                    .await?
                {
                    Outcome::Ok(doc) => doc,
                    other => return other.parse(),
                };
                push_child(&mut target, self.child_field(), child);
                self.store
                    .replace_document(&target_id, target, Collection::Participants, dataset)
                    .await?;
            }
        } else {
            replace_child(&mut parent, self.child_field(), &oid.to_hex(), child);
            self.store
                .replace_document(&parent_id, parent, Collection::Participants, dataset)
                .await?;
        }
        self.get_participant_state(id, dataset, 0).await
    }

    pub async fn delete_participant_state(
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
            .replace_document(&parent_id, parent, Collection::Participants, dataset)
            .await?;
        Ok(Outcome::Ok(child))
    }
}

#[async_trait]
impl EntityService for ParticipantStateService {
    fn collection(&self) -> Collection {
        Collection::ParticipantStates
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
            .participants()
            .get_multiple(
                dataset,
                Query::eq(format!("{}.id", self.child_field()), oid.to_hex()),
                depth.saturating_sub(1),
                Collection::ParticipantStates.into(),
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
            .participants()
            .get_multiple(
                dataset,
                query.clone().prefixed(self.child_field()).normalize_ids(),
                depth.saturating_sub(1),
                Collection::ParticipantStates.into(),
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
        let origin: Source = Collection::ParticipantStates.into();
        if !source.is(Collection::Personalities) {
            let ids: Vec<Value> = doc
                .get("personality_ids")
                .and_then(Value::as_array)
                .map(|ids| ids.to_vec())
                .unwrap_or_default();
            if !ids.is_empty() {
                let related = self
                    .personalities()
                    .get_multiple(dataset, Query::is_in("_id", ids), depth - 1, origin)
                    .await?;
                doc.insert("personalities".to_owned(), docs_to_array(related));
            }
        }
        if !source.is(Collection::Appearances) {
            let ids: Vec<Value> = doc
                .get("appearance_ids")
                .and_then(Value::as_array)
                .map(|ids| ids.to_vec())
                .unwrap_or_default();
            if !ids.is_empty() {
                let related = self
                    .appearances()
                    .get_multiple(dataset, Query::is_in("_id", ids), depth - 1, origin)
                    .await?;
                doc.insert("appearances".to_owned(), docs_to_array(related));
            }
        }
        if !source.is(Collection::Participations) {
            if let Some(id) = doc_id(doc).map(str::to_owned) {
                let related = self
                    .participations()
                    .get_multiple(
                        dataset,
                        Query::eq("participant_state_id", id),
                        depth - 1,
                        origin,
                    )
                    .await?;
                doc.insert("participations".to_owned(), docs_to_array(related));
            }
        }
        if !source.is(Collection::Participants) {
            if let Some(parent) = parent {
                doc.insert("participant".to_owned(), Value::Object(parent.clone()));
            }
        }
        Ok(())
    }
}
