use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;

use super::generic::EntityService;
use super::registered_channel::RegisteredChannelService;
use super::wired;
use crate::model::{
    doc_id, docs_to_array, to_document, Collection, Document, Outcome, RegisteredDataIn,
    RegisteredDataOut, Source,
};
use crate::store::{DocStore, Query};

pub struct RegisteredDataService {
    store: DocStore,
    pub(crate) registered_channel_service: OnceLock<Arc<RegisteredChannelService>>,
}

impl RegisteredDataService {
    pub fn new(store: DocStore) -> Self {
        RegisteredDataService {
            store,
            registered_channel_service: OnceLock::new(),
        }
    }

    fn registered_channels(&self) -> &Arc<RegisteredChannelService> {
        wired(&self.registered_channel_service)
    }

    pub async fn save_registered_data(
        &self,
        registered_data: RegisteredDataIn,
        dataset: &str,
    ) -> Result<Outcome<RegisteredDataOut>> {
        self.create_entity(to_document(&registered_data)?, dataset)
            .await?
            .parse()
    }

    pub async fn get_registered_data(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
    ) -> Result<Outcome<RegisteredDataOut>> {
        self.get_single_dict(id, dataset, depth, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_registered_data_nodes(&self, dataset: &str) -> Result<Vec<Document>> {
        self.get_multiple(dataset, Query::new(), 0, Source::NONE)
            .await
    }

    pub async fn update_registered_data(
        &self,
        id: &str,
        registered_data: RegisteredDataIn,
        dataset: &str,
    ) -> Result<Outcome<RegisteredDataOut>> {
        self.update_entity(id, to_document(&registered_data)?, dataset)
            .await?
            .parse()
    }

    pub async fn delete_registered_data(
        &self,
        id: &str,
        dataset: &str,
    ) -> Result<Outcome<Document>> {
        self.delete_entity(id, dataset).await
    }
}

#[async_trait]
impl EntityService for RegisteredDataService {
    fn collection(&self) -> Collection {
        Collection::RegisteredData
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
                Query::eq("registered_data_id", id),
                depth - 1,
                Collection::RegisteredData.into(),
            )
            .await?;
        doc.insert("registered_channels".to_owned(), docs_to_array(related));
        Ok(())
    }
}
