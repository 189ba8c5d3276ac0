use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;

use super::generic::EntityService;
use super::registered_channel::RegisteredChannelService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, to_document, ChannelIn, ChannelOut, Collection, Document, Outcome,
    Source,
};
use crate::store::{DocStore, Query};

pub struct ChannelService {
    store: DocStore,
    pub(crate) registered_channel_service: OnceLock<Arc<RegisteredChannelService>>,
}

impl ChannelService {
    pub fn new(store: DocStore) -> Self {
        ChannelService {
            store,
            registered_channel_service: OnceLock::new(),
        }
    }

    fn registered_channels(&self) -> &Arc<RegisteredChannelService> {
        wired(&self.registered_channel_service)
    }

    pub async fn save_channel(&self, channel: ChannelIn, dataset: &str) -> Result<Outcome<ChannelOut>> {
        self.create_entity(to_document(&channel)?, dataset)
            .await?
            .parse()
    }

    pub async fn get_channel(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<ChannelOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_channels(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }
}

#[async_trait]
impl EntityService for ChannelService {
    fn collection(&self) -> Collection {
        Collection::Channels
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
        if depth == 0 || source.is(Collection::RegisteredChannels) {
            return Ok(());
        }
        let Some(id) = doc_id(doc).map(str::to_owned) else {
            return Ok(());
        };
        let related = self
            .registered_channels()
            .get_multiple(
                dataset,
                Query::eq("channel_id", id),
                depth - 1,
                Collection::Channels.into(),
            )
            .await?;
        doc.insert("registered_channels".to_owned(), docs_to_array(related));
        Ok(())
    }
}
