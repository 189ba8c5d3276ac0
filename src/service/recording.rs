use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::generic::EntityService;
use super::observable_information::ObservableInformationService;
use super::participation::ParticipationService;
use super::registered_channel::RegisteredChannelService;
use super::wired;
use crate::model::{
    field_str, to_document, Collection, Document, Outcome, RecordingIn, RecordingOut,
    RecordingPropertyIn, RecordingRelationIn, Source,
};
use crate::store::{DocStore, Query};

/// Recordings own the embedded observable informations; hydration of the
/// children is delegated to their service with this recording as parent.
pub struct RecordingService {
    store: DocStore,
    pub(crate) participation_service: OnceLock<Arc<ParticipationService>>,
    pub(crate) registered_channel_service: OnceLock<Arc<RegisteredChannelService>>,
    pub(crate) observable_information_service: OnceLock<Arc<ObservableInformationService>>,
}

impl RecordingService {
    pub fn new(store: DocStore) -> Self {
        RecordingService {
            store,
            participation_service: OnceLock::new(),
            registered_channel_service: OnceLock::new(),
            observable_information_service: OnceLock::new(),
        }
    }

    fn participations(&self) -> &Arc<ParticipationService> {
        wired(&self.participation_service)
    }

    fn registered_channels(&self) -> &Arc<RegisteredChannelService> {
        wired(&self.registered_channel_service)
    }

    fn observable_informations(&self) -> &Arc<ObservableInformationService> {
        wired(&self.observable_information_service)
    }

    async fn check_relations(
        &self,
        participation_id: Option<&String>,
        registered_channel_id: Option<&String>,
        dataset: &str,
    ) -> Result<Option<String>> {
        if let Some(participation_id) = participation_id {
            let participation = self
                .participations()
                .get_single_dict(participation_id, dataset, 0, Source::NONE)
                .await?;
            if !participation.is_ok() {
                return Ok(Some("given participation does not exist".to_owned()));
            }
        }
        if let Some(registered_channel_id) = registered_channel_id {
            let registered_channel = self
                .registered_channels()
                .get_single_dict(registered_channel_id, dataset, 0, Source::NONE)
                .await?;
            if !registered_channel.is_ok() {
                return Ok(Some("given registered channel does not exist".to_owned()));
            }
        }
        Ok(None)
    }

    pub async fn save_recording(
        &self,
        recording: RecordingIn,
        dataset: &str,
    ) -> Result<Outcome<RecordingOut>> {
        if let Some(error) = self
            .check_relations(
                recording.participation_id.as_ref(),
                recording.registered_channel_id.as_ref(),
                dataset,
            )
            .await?
        {
            return Ok(Outcome::Invalid(error));
        }
        self.create_entity(to_document(&recording)?, dataset)
            .await?
            .parse()
    }

    pub async fn get_recording(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<RecordingOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_recordings(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }

    pub async fn update_recording(
        &self,
        id: &str,
        recording: RecordingPropertyIn,
        dataset: &str,
    ) -> Result<Outcome<RecordingOut>> {
        let mut existing = match self.get_single_dict(id, dataset, 0, Source::NONE).await? {
            Outcome::Ok(doc) => doc,
            other => return other.parse(),
        };
        for (key, value) in to_document(&recording)? {
            existing.insert(key, value);
        }
        self.update_entity(id, existing, dataset).await?.parse()
    }

    pub async fn update_recording_relationships(
        &self,
        id: &str,
        recording: RecordingRelationIn,
        dataset: &str,
    ) -> Result<Outcome<RecordingOut>> {
        if let Some(error) = self
            .check_relations(
                recording.participation_id.as_ref(),
                recording.registered_channel_id.as_ref(),
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
        for (key, value) in to_document(&recording)? {
            existing.insert(key, value);
        }
        self.update_entity(id, existing, dataset).await?.parse()
    }

    pub async fn delete_recording(&self, id: &str, dataset: &str) -> Result<Outcome<Document>> {
        self.delete_entity(id, dataset).await
    }
}

#[async_trait]
impl EntityService for RecordingService {
    fn collection(&self) -> Collection {
        Collection::Recordings
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
        if !source.is(Collection::RegisteredChannels) {
            if let Some(rc_id) = field_str(doc, "registered_channel_id").map(str::to_owned) {
                if let Outcome::Ok(registered_channel) = self
                    .registered_channels()
                    .get_single_dict(&rc_id, dataset, depth - 1, Collection::Recordings.into())
                    .await?
                {
                    doc.insert(
                        "registered_channel".to_owned(),
                        Value::Object(registered_channel),
                    );
                }
            }
        }
        if !source.is(Collection::Participations) {
            if let Some(participation_id) = field_str(doc, "participation_id").map(str::to_owned) {
                if let Outcome::Ok(participation) = self
                    .participations()
                    .get_single_dict(
                        &participation_id,
                        dataset,
                        depth - 1,
                        Collection::Recordings.into(),
                    )
                    .await?
                {
                    doc.insert("participation".to_owned(), Value::Object(participation));
                }
            }
        }
        if !source.is(Collection::ObservableInformations) {
            let field = Collection::ObservableInformations.name();
            if let Some(Value::Array(children)) = doc.get(field).cloned() {
                let mut parent = doc.clone();
                parent.remove(field);
                let mut hydrated = Vec::with_capacity(children.len());
                for child in children {
                    let Value::Object(mut child) = child else {
                        continue;
                    };
                    self.observable_informations()
                        .add_related(
                            &mut child,
                            dataset,
                            depth - 1,
                            Collection::Recordings.into(),
                            Some(&parent),
                        )
                        .await?;
                    hydrated.push(Value::Object(child));
                }
                doc.insert(field.to_owned(), Value::Array(hydrated));
            }
        }
        Ok(())
    }
}
