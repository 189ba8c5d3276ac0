use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::channel::ChannelService;
use super::generic::EntityService;
use super::recording::RecordingService;
use super::registered_data::RegisteredDataService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, field_str, to_document, Collection, Document, Outcome,
    RegisteredChannelIn, RegisteredChannelOut, Source,
};
use crate::store::{DocStore, Query};

pub struct RegisteredChannelService {
    store: DocStore,
    pub(crate) channel_service: OnceLock<Arc<ChannelService>>,
    pub(crate) registered_data_service: OnceLock<Arc<RegisteredDataService>>,
    pub(crate) recording_service: OnceLock<Arc<RecordingService>>,
}

impl RegisteredChannelService {
    pub fn new(store: DocStore) -> Self {
        RegisteredChannelService {
            store,
            channel_service: OnceLock::new(),
            registered_data_service: OnceLock::new(),
            recording_service: OnceLock::new(),
        }
    }

    fn channels(&self) -> &Arc<ChannelService> {
        wired(&self.channel_service)
    }

    fn registered_data(&self) -> &Arc<RegisteredDataService> {
        wired(&self.registered_data_service)
    }

    fn recordings(&self) -> &Arc<RecordingService> {
        wired(&self.recording_service)
    }

    /// Both referenced entities must exist before the link is stored.
    async fn check_relations(
        &self,
        registered_channel: &RegisteredChannelIn,
        dataset: &str,
    ) -> Result<Option<String>> {
        if let Some(channel_id) = &registered_channel.channel_id {
            let channel = self
                .channels()
                .get_single_dict(channel_id, dataset, 0, Source::NONE)
                .await?;
            if !channel.is_ok() {
                return Ok(Some("given channel does not exist".to_owned()));
            }
        }
        if let Some(registered_data_id) = &registered_channel.registered_data_id {
            let registered_data = self
                .registered_data()
                .get_single_dict(registered_data_id, dataset, 0, Source::NONE)
                .await?;
            if !registered_data.is_ok() {
                return Ok(Some("given registered data does not exist".to_owned()));
            }
        }
        Ok(None)
    }

    pub async fn save_registered_channel(
        &self,
        registered_channel: RegisteredChannelIn,
        dataset: &str,
    ) -> Result<Outcome<RegisteredChannelOut>> {
        if let Some(error) = self.check_relations(&registered_channel, dataset).await? {
            return Ok(Outcome::Invalid(error));
        }
        self.create_entity(to_document(&registered_channel)?, dataset)
            .await?
            .parse()
    }

    pub async fn get_registered_channel(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<RegisteredChannelOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_registered_channels(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }

    pub async fn update_registered_channel_relationships(
        &self,
        id: &str,
        registered_channel: RegisteredChannelIn,
        dataset: &str,
    ) -> Result<Outcome<RegisteredChannelOut>> {
        if let Some(error) = self.check_relations(&registered_channel, dataset).await? {
            return Ok(Outcome::Invalid(error));
        }
        let mut existing = match self.get_single_dict(id, dataset, 0, Source::NONE).await? {
            Outcome::Ok(doc) => doc,
            other => return other.parse(),
        };
        for (key, value) in to_document(&registered_channel)? {
            existing.insert(key, value);
        }
        self.update_entity(id, existing, dataset).await?.parse()
    }

    pub async fn delete_registered_channel(
        &self,
        id: &str,
        dataset: &str,
    ) -> Result<Outcome<Document>> {
        self.delete_entity(id, dataset).await
    }
}

#[async_trait]
impl EntityService for RegisteredChannelService {
    fn collection(&self) -> Collection {
        Collection::RegisteredChannels
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
        let id = doc_id(doc).map(str::to_owned);
        if !source.is(Collection::Recordings) {
            if let Some(id) = &id {
                let recordings = self
                    .recordings()
                    .get_multiple(
                        dataset,
                        Query::eq("registered_channel_id", id.clone()),
                        depth - 1,
                        Collection::RegisteredChannels.into(),
                    )
                    .await?;
                doc.insert("recordings".to_owned(), docs_to_array(recordings));
            }
        }
        if !source.is(Collection::Channels) {
            if let Some(channel_id) = field_str(doc, "channel_id").map(str::to_owned) {
                if let Outcome::Ok(channel) = self
                    .channels()
                    .get_single_dict(
                        &channel_id,
                        dataset,
                        depth - 1,
                        Collection::RegisteredChannels.into(),
                    )
                    .await?
                {
                    doc.insert("channel".to_owned(), Value::Object(channel));
                }
            }
        }
        if !source.is(Collection::RegisteredData) {
            if let Some(rd_id) = field_str(doc, "registered_data_id").map(str::to_owned) {
                if let Outcome::Ok(registered_data) = self
                    .registered_data()
                    .get_single_dict(
                        &rd_id,
                        dataset,
                        depth - 1,
                        Collection::RegisteredChannels.into(),
                    )
                    .await?
                {
                    doc.insert("registered_data".to_owned(), Value::Object(registered_data));
                }
            }
        }
        Ok(())
    }
}
