use anyhow::Result;
use async_trait::async_trait;

use super::generic::EntityService;
use crate::model::{to_document, Collection, DatasetIn, DatasetOut, Document, Outcome, Source};
use crate::seed;
use crate::store::{DocStore, Query};

/// Dataset records live in a dedicated metadata database, separate from the
/// datasets they describe.
pub struct DatasetService {
    store: DocStore,
    metadata_dataset: String,
}

impl DatasetService {
    pub fn new(store: DocStore, metadata_dataset: impl Into<String>) -> Self {
        DatasetService {
            store,
            metadata_dataset: metadata_dataset.into(),
        }
    }

    /// Records the dataset and prepares its backing collections.
    pub async fn save_dataset(&self, dataset: DatasetIn) -> Result<Outcome<DatasetOut>> {
        let name = dataset.name.clone();
        let outcome = self
            .create_entity(to_document(&dataset)?, &self.metadata_dataset)
            .await?;
        if outcome.is_ok() {
            seed::prepare_dataset(&self.store, &name).await?;
        }
        outcome.parse()
    }

    pub async fn get_dataset(&self, id: &str) -> Result<Outcome<DatasetOut>> {
        self.get_single_dict(id, &self.metadata_dataset, 0, Source::NONE)
            .await?
            .parse()
    }

    pub async fn get_datasets(&self) -> Result<Vec<Document>> {
        self.get_multiple(&self.metadata_dataset, Query::new(), 0, Source::NONE)
            .await
    }

    /// Removes the dataset record. The dataset's contents are left behind;
    /// they become unreachable through the API.
    pub async fn delete_dataset(&self, id: &str) -> Result<Outcome<DatasetOut>> {
        self.delete_entity(id, &self.metadata_dataset)
            .await?
            .parse()
    }
}

#[async_trait]
impl EntityService for DatasetService {
    fn collection(&self) -> Collection {
        Collection::Datasets
    }

    fn store(&self) -> &DocStore {
        &self.store
    }

    async fn add_related(
        &self,
        _doc: &mut Document,
        _dataset: &str,
        _depth: u32,
        _source: Source,
        _parent: Option<&Document>,
    ) -> Result<()> {
        Ok(())
    }
}
