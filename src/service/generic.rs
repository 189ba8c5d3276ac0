use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::model::{normalize_date_fields, Collection, Document, Outcome, Source};
use crate::store::{DocStore, Query};
use crate::try_outcome;

/// Shared CRUD and hydration plumbing for entity services.
///
/// Every read path finishes with [`add_related`](EntityService::add_related):
/// the service attaches neighbouring documents, spending one hop of `depth`
/// per traversal and skipping the edge back to `source`. Kinds embedded in a
/// parent document override the read methods to locate themselves inside the
/// parent collection instead.
#[async_trait]
pub trait EntityService: Send + Sync {
    fn collection(&self) -> Collection;

    fn store(&self) -> &DocStore;

    /// Attaches related documents in place. `depth` is the remaining hop
    /// budget, `source` the collection the traversal arrived from (its
    /// back-edge is not followed), `parent` the enclosing document for
    /// embedded kinds.
    async fn add_related(
        &self,
        doc: &mut Document,
        dataset: &str,
        depth: u32,
        source: Source,
        parent: Option<&Document>,
    ) -> Result<()>;

    async fn create_entity(&self, mut doc: Document, dataset: &str) -> Result<Outcome<Document>> {
        normalize_date_fields(&mut doc);
        let id = self
            .store()
            .create_document_in(doc, self.collection(), dataset)
            .await?;
        debug!("created {} {id} in dataset {dataset}", self.collection());
        self.get_single_dict(&id, dataset, 0, Source::NONE).await
    }

    async fn get_multiple(
        &self,
        dataset: &str,
        query: Query,
        depth: u32,
        source: Source,
    ) -> Result<Vec<Document>> {
        let docs = self
            .store()
            .get_documents(query, self.collection(), dataset)
            .await?;
        let mut hydrated = Vec::with_capacity(docs.len());
        for mut doc in docs {
            self.add_related(&mut doc, dataset, depth, source, None)
                .await?;
            hydrated.push(doc);
        }
        Ok(hydrated)
    }

    async fn get_single_dict(
        &self,
        id: &str,
        dataset: &str,
        depth: u32,
        source: Source,
    ) -> Result<Outcome<Document>> {
        match self
            .store()
            .get_document(id, self.collection(), dataset)
            .await?
        {
            Outcome::Ok(mut doc) => {
                self.add_related(&mut doc, dataset, depth, source, None)
                    .await?;
                Ok(Outcome::Ok(doc))
            }
            other => Ok(other),
        }
    }

    /// Full-document replace; the entity must already exist. Returns the
    /// stored document re-read after the write.
    async fn update_entity(
        &self,
        id: &str,
        mut doc: Document,
        dataset: &str,
    ) -> Result<Outcome<Document>> {
        try_outcome!(
            self.store()
                .get_document(id, self.collection(), dataset)
                .await?
        );
        normalize_date_fields(&mut doc);
        try_outcome!(
            self.store()
                .replace_document(id, doc, self.collection(), dataset)
                .await?
        );
        self.get_single_dict(id, dataset, 0, Source::NONE).await
    }

    /// Deletes the entity and returns it as it was stored.
    async fn delete_entity(&self, id: &str, dataset: &str) -> Result<Outcome<Document>> {
        let existing = try_outcome!(self.get_single_dict(id, dataset, 0, Source::NONE).await?);
        try_outcome!(
            self.store()
                .delete_document(id, self.collection(), dataset)
                .await?
        );
        debug!("deleted {} {id} from dataset {dataset}", self.collection());
        Ok(Outcome::Ok(existing))
    }
}
