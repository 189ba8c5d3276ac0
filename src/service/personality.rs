use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;

use super::generic::EntityService;
use super::participant_state::ParticipantStateService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, field_str, to_document, Collection, Document, Outcome,
    PersonalityBigFiveIn, PersonalityOut, PersonalityPanasIn, Source,
};
use crate::store::{DocStore, Query};
use crate::try_outcome;

const FACTOR_RANGE_ERROR: &str = "personality factor values must be between 0 and 1";

/// One collection, two sub-kinds (Big Five and PANAS), discriminated by the
/// `personality_type` tag. Updates cannot cross sub-kinds.
pub struct PersonalityService {
    store: DocStore,
    pub(crate) participant_state_service: OnceLock<Arc<ParticipantStateService>>,
}

impl PersonalityService {
    pub fn new(store: DocStore) -> Self {
        PersonalityService {
            store,
            participant_state_service: OnceLock::new(),
        }
    }

    fn participant_states(&self) -> &Arc<ParticipantStateService> {
        wired(&self.participant_state_service)
    }

    pub async fn save_personality_big_five(
        &self,
        personality: PersonalityBigFiveIn,
        dataset: &str,
    ) -> Result<Outcome<PersonalityOut>> {
        if !personality.values_in_range() {
            return Ok(Outcome::Invalid(FACTOR_RANGE_ERROR.to_owned()));
        }
        let mut doc = to_document(&personality)?;
        doc.insert(
            "personality_type".to_owned(),
            PersonalityOut::BIG_FIVE_TAG.into(),
        );
        self.create_entity(doc, dataset).await?.parse()
    }

    pub async fn save_personality_panas(
        &self,
        personality: PersonalityPanasIn,
        dataset: &str,
    ) -> Result<Outcome<PersonalityOut>> {
        if !personality.values_in_range() {
            return Ok(Outcome::Invalid(FACTOR_RANGE_ERROR.to_owned()));
        }
        let mut doc = to_document(&personality)?;
        doc.insert(
            "personality_type".to_owned(),
            PersonalityOut::PANAS_TAG.into(),
        );
        self.create_entity(doc, dataset).await?.parse()
    }

    pub async fn get_personality(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<PersonalityOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_personalities(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }

    pub async fn update_personality_big_five(
        &self,
        id: &str,
        personality: PersonalityBigFiveIn,
        dataset: &str,
    ) -> Result<Outcome<PersonalityOut>> {
        if !personality.values_in_range() {
            return Ok(Outcome::Invalid(FACTOR_RANGE_ERROR.to_owned()));
        }
        let existing = try_outcome!(self.get_single_dict(id, dataset, 0, Source::NONE).await?);
        if field_str(&existing, "personality_type") != Some(PersonalityOut::BIG_FIVE_TAG) {
            return Ok(Outcome::not_found(id, "document not found"));
        }
        let mut doc = to_document(&personality)?;
        doc.insert(
            "personality_type".to_owned(),
            PersonalityOut::BIG_FIVE_TAG.into(),
        );
        self.update_entity(id, doc, dataset).await?.parse()
    }

    pub async fn update_personality_panas(
        &self,
        id: &str,
        personality: PersonalityPanasIn,
        dataset: &str,
    ) -> Result<Outcome<PersonalityOut>> {
        if !personality.values_in_range() {
            return Ok(Outcome::Invalid(FACTOR_RANGE_ERROR.to_owned()));
        }
        let existing = try_outcome!(self.get_single_dict(id, dataset, 0, Source::NONE).await?);
        if field_str(&existing, "personality_type") != Some(PersonalityOut::PANAS_TAG) {
            return Ok(Outcome::not_found(id, "document not found"));
        }
        let mut doc = to_document(&personality)?;
        doc.insert(
            "personality_type".to_owned(),
            PersonalityOut::PANAS_TAG.into(),
        );
        self.update_entity(id, doc, dataset).await?.parse()
    }

    pub async fn delete_personality(&self, id: &str, dataset: &str) -> Result<Outcome<Document>> {
        self.delete_entity(id, dataset).await
    }
}

#[async_trait]
impl EntityService for PersonalityService {
    fn collection(&self) -> Collection {
        Collection::Personalities
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
        let Some(id) = doc_id(doc).map(str::to_owned) else {
            return Ok(());
        };
        let related = self
            .participant_states()
            .get_multiple(
                dataset,
                Query::eq("personality_ids", id),
                depth - 1,
                Collection::Personalities.into(),
            )
            .await?;
        doc.insert("participant_states".to_owned(), docs_to_array(related));
        Ok(())
    }
}
