use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::query::Query;
use crate::model::Document;

/// Raw document storage: datasets hold named collections, collections hold
/// documents keyed by their `_id` field. Implementations only deal in plain
/// documents; id conventions and joins live a layer up in [`super::DocStore`].
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn insert_one(&self, dataset: &str, collection: &str, doc: Document) -> Result<()>;

    async fn insert_many(&self, dataset: &str, collection: &str, docs: Vec<Document>)
        -> Result<()>;

    async fn find_by_id(&self, dataset: &str, collection: &str, id: &str)
        -> Result<Option<Document>>;

    async fn find(&self, dataset: &str, collection: &str, query: &Query) -> Result<Vec<Document>>;

    /// Replaces the document with the given `_id`; returns whether one existed.
    async fn replace_by_id(
        &self,
        dataset: &str,
        collection: &str,
        id: &str,
        doc: Document,
    ) -> Result<bool>;

    async fn delete_by_id(&self, dataset: &str, collection: &str, id: &str) -> Result<bool>;

    async fn delete_matching(&self, dataset: &str, collection: &str, query: &Query) -> Result<u64>;

    /// Sets dotted-path fields on every matching document, creating
    /// intermediate objects as needed.
    async fn set_matching(
        &self,
        dataset: &str,
        collection: &str,
        query: &Query,
        fields: &[(String, Value)],
    ) -> Result<u64>;

    /// Atomically deletes every matching document and inserts the
    /// replacements; a failure must leave the collection unchanged.
    async fn replace_matching(
        &self,
        dataset: &str,
        collection: &str,
        query: &Query,
        docs: Vec<Document>,
    ) -> Result<()>;

    /// Prepares a collection optimized for time-stamped records. A no-op for
    /// backends without a dedicated representation.
    async fn create_timeseries_collection(
        &self,
        dataset: &str,
        collection: &str,
        time_field: &str,
        meta_field: &str,
    ) -> Result<()>;
}
