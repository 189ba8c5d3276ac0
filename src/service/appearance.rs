use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;

use super::generic::EntityService;
use super::participant_state::ParticipantStateService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, field_str, to_document, AppearanceOcclusionIn, AppearanceOut,
    AppearanceSomatotypeIn, Collection, Document, Outcome, Source,
};
use crate::store::{DocStore, Query};
use crate::try_outcome;

const SOMATOTYPE_RANGE_ERROR: &str = "somatotype values must be between 1 and 7";

/// One collection, two sub-kinds (occlusion and somatotype), discriminated by
/// the `appearance_type` tag. An update may not change the sub-kind: updating
/// an occlusion through the somatotype operation misses, and vice versa.
pub struct AppearanceService {
    store: DocStore,
    pub(crate) participant_state_service: OnceLock<Arc<ParticipantStateService>>,
}

impl AppearanceService {
    pub fn new(store: DocStore) -> Self {
        AppearanceService {
            store,
            participant_state_service: OnceLock::new(),
        }
    }

    fn participant_states(&self) -> &Arc<ParticipantStateService> {
        wired(&self.participant_state_service)
    }

    pub async fn save_appearance_occlusion(
        &self,
        appearance: AppearanceOcclusionIn,
        dataset: &str,
    ) -> Result<Outcome<AppearanceOut>> {
        let mut doc = to_document(&appearance)?;
        doc.insert(
            "appearance_type".to_owned(),
            AppearanceOut::OCCLUSION_TAG.into(),
        );
        self.create_entity(doc, dataset).await?.parse()
    }

    pub async fn save_appearance_somatotype(
        &self,
        appearance: AppearanceSomatotypeIn,
        dataset: &str,
    ) -> Result<Outcome<AppearanceOut>> {
        if !appearance.values_in_range() {
            return Ok(Outcome::Invalid(SOMATOTYPE_RANGE_ERROR.to_owned()));
        }
        let mut doc = to_document(&appearance)?;
        doc.insert(
            "appearance_type".to_owned(),
            AppearanceOut::SOMATOTYPE_TAG.into(),
        );
        self.create_entity(doc, dataset).await?.parse()
    }

    pub async fn get_appearance(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<AppearanceOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_appearances(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }

    pub async fn update_appearance_occlusion(
        &self,
        id: &str,
        appearance: AppearanceOcclusionIn,
        dataset: &str,
    ) -> Result<Outcome<AppearanceOut>> {
        let existing = try_outcome!(self.get_single_dict(id, dataset, 0, Source::NONE).await?);
        if field_str(&existing, "appearance_type") != Some(AppearanceOut::OCCLUSION_TAG) {
            return Ok(Outcome::not_found(id, "document not found"));
        }
        let mut doc = to_document(&appearance)?;
        doc.insert(
            "appearance_type".to_owned(),
            AppearanceOut::OCCLUSION_TAG.into(),
        );
        self.update_entity(id, doc, dataset).await?.parse()
    }

    pub async fn update_appearance_somatotype(
        &self,
        id: &str,
        appearance: AppearanceSomatotypeIn,
        dataset: &str,
    ) -> Result<Outcome<AppearanceOut>> {
        if !appearance.values_in_range() {
            return Ok(Outcome::Invalid(SOMATOTYPE_RANGE_ERROR.to_owned()));
        }
        let existing = try_outcome!(self.get_single_dict(id, dataset, 0, Source::NONE).await?);
        if field_str(&existing, "appearance_type") != Some(AppearanceOut::SOMATOTYPE_TAG) {
            return Ok(Outcome::not_found(id, "document not found"));
        }
        let mut doc = to_document(&appearance)?;
        doc.insert(
            "appearance_type".to_owned(),
            AppearanceOut::SOMATOTYPE_TAG.into(),
        );
        self.update_entity(id, doc, dataset).await?.parse()
    }

    pub async fn delete_appearance(&self, id: &str, dataset: &str) -> Result<Outcome<Document>> {
        self.delete_entity(id, dataset).await
    }
}

#[async_trait]
impl EntityService for AppearanceService {
    fn collection(&self) -> Collection {
        Collection::Appearances
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
                Query::eq("appearance_ids", id),
                depth - 1,
                Collection::Appearances.into(),
            )
            .await?;
        doc.insert("participant_states".to_owned(), docs_to_array(related));
        Ok(())
    }
}
