use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::query::Query;
use super::traits::DocumentBackend;
use crate::model::Document;

type CollectionMap = HashMap<String, Vec<Document>>;

/// In-memory [`DocumentBackend`]. Datasets and collections spring into
/// existence on first write; everything lives behind a single `RwLock`, so
/// each call is atomic with respect to every other.
#[derive(Default)]
pub struct MemoryBackend {
    datasets: RwLock<HashMap<String, CollectionMap>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend::default()
    }
}

fn doc_raw_id(doc: &Document) -> Option<&str> {
    doc.get("_id").and_then(Value::as_str)
}

/// Sets a dotted-path field, creating intermediate objects along the way.
fn set_path(doc: &mut Document, path: &str, value: Value) {
    match path.split_once('.') {
        Some((head, rest)) => {
            let entry = doc
                .entry(head.to_owned())
                .or_insert_with(|| Value::Object(Document::new()));
            if !entry.is_object() {
                *entry = Value::Object(Document::new());
            }
            if let Value::Object(inner) = entry {
                set_path(inner, rest, value);
            }
        }
        None => {
            doc.insert(path.to_owned(), value);
        }
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn insert_one(&self, dataset: &str, collection: &str, doc: Document) -> Result<()> {
        let mut datasets = self.datasets.write();
        datasets
            .entry(dataset.to_owned())
            .or_default()
            .entry(collection.to_owned())
            .or_default()
            .push(doc);
        Ok(())
    }

    async fn insert_many(
        &self,
        dataset: &str,
        collection: &str,
        docs: Vec<Document>,
    ) -> Result<()> {
        let mut datasets = self.datasets.write();
        datasets
            .entry(dataset.to_owned())
            .or_default()
            .entry(collection.to_owned())
            .or_default()
            .extend(docs);
        Ok(())
    }

    async fn find_by_id(
        &self,
        dataset: &str,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>> {
        let datasets = self.datasets.read();
        Ok(datasets
            .get(dataset)
            .and_then(|cols| cols.get(collection))
            .and_then(|docs| docs.iter().find(|d| doc_raw_id(d) == Some(id)))
            .cloned())
    }

    async fn find(&self, dataset: &str, collection: &str, query: &Query) -> Result<Vec<Document>> {
        let datasets = self.datasets.read();
        Ok(datasets
            .get(dataset)
            .and_then(|cols| cols.get(collection))
            .map(|docs| docs.iter().filter(|d| query.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn replace_by_id(
        &self,
        dataset: &str,
        collection: &str,
        id: &str,
        doc: Document,
    ) -> Result<bool> {
        let mut datasets = self.datasets.write();
        let Some(docs) = datasets
            .get_mut(dataset)
            .and_then(|cols| cols.get_mut(collection))
        else {
            return Ok(false);
        };
        match docs.iter_mut().find(|d| doc_raw_id(d) == Some(id)) {
            Some(slot) => {
                *slot = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, dataset: &str, collection: &str, id: &str) -> Result<bool> {
        let mut datasets = self.datasets.write();
        let Some(docs) = datasets
            .get_mut(dataset)
            .and_then(|cols| cols.get_mut(collection))
        else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| doc_raw_id(d) != Some(id));
        Ok(docs.len() < before)
    }

    async fn delete_matching(&self, dataset: &str, collection: &str, query: &Query) -> Result<u64> {
        let mut datasets = self.datasets.write();
        let Some(docs) = datasets
            .get_mut(dataset)
            .and_then(|cols| cols.get_mut(collection))
        else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !query.matches(d));
        Ok((before - docs.len()) as u64)
    }

    async fn set_matching(
        &self,
        dataset: &str,
        collection: &str,
        query: &Query,
        fields: &[(String, Value)],
    ) -> Result<u64> {
        let mut datasets = self.datasets.write();
        let Some(docs) = datasets
            .get_mut(dataset)
            .and_then(|cols| cols.get_mut(collection))
        else {
            return Ok(0);
        };
        let mut updated = 0;
        for doc in docs.iter_mut().filter(|d| query.matches(d)) {
            for (path, value) in fields {
                set_path(doc, path, value.clone());
            }
            updated += 1;
        }
        Ok(updated)
    }

    async fn replace_matching(
        &self,
        dataset: &str,
        collection: &str,
        query: &Query,
        replacements: Vec<Document>,
    ) -> Result<()> {
        // one write lock spans the delete and the insert
        let mut datasets = self.datasets.write();
        let docs = datasets
            .entry(dataset.to_owned())
            .or_default()
            .entry(collection.to_owned())
            .or_default();
        docs.retain(|d| !query.matches(d));
        docs.extend(replacements);
        Ok(())
    }

    async fn create_timeseries_collection(
        &self,
        dataset: &str,
        collection: &str,
        _time_field: &str,
        _meta_field: &str,
    ) -> Result<()> {
        let mut datasets = self.datasets.write();
        datasets
            .entry(dataset.to_owned())
            .or_default()
            .entry(collection.to_owned())
            .or_default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::to_document;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        to_document(&value).unwrap()
    }

    #[tokio::test]
    async fn insert_find_replace_delete() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("ds", "channels", doc(json!({"_id": "1", "type": "Audio"})))
            .await
            .unwrap();

        let found = backend.find_by_id("ds", "channels", "1").await.unwrap().unwrap();
        assert_eq!(found["type"], json!("Audio"));

        let replaced = backend
            .replace_by_id("ds", "channels", "1", doc(json!({"_id": "1", "type": "ECG"})))
            .await
            .unwrap();
        assert!(replaced);
        let found = backend.find_by_id("ds", "channels", "1").await.unwrap().unwrap();
        assert_eq!(found["type"], json!("ECG"));

        assert!(backend.delete_by_id("ds", "channels", "1").await.unwrap());
        assert!(backend.find_by_id("ds", "channels", "1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn datasets_are_isolated() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("a", "channels", doc(json!({"_id": "1"})))
            .await
            .unwrap();
        assert!(backend.find_by_id("b", "channels", "1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_matching_creates_nested_paths() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("ds", "timeSeries", doc(json!({"_id": "1", "metadata": {"id": "x"}})))
            .await
            .unwrap();
        let updated = backend
            .set_matching(
                "ds",
                "timeSeries",
                &Query::eq("metadata.id", "x"),
                &[("metadata.type".to_owned(), json!("epoch"))],
            )
            .await
            .unwrap();
        assert_eq!(updated, 1);
        let found = backend.find_by_id("ds", "timeSeries", "1").await.unwrap().unwrap();
        assert_eq!(found["metadata"]["type"], json!("epoch"));
    }

    #[tokio::test]
    async fn replace_matching_swaps_only_matching_docs() {
        let backend = MemoryBackend::new();
        backend
            .insert_many(
                "ds",
                "timeSeries",
                vec![
                    doc(json!({"_id": "1", "metadata": {"id": "x"}})),
                    doc(json!({"_id": "2", "metadata": {"id": "y"}})),
                ],
            )
            .await
            .unwrap();
        backend
            .replace_matching(
                "ds",
                "timeSeries",
                &Query::eq("metadata.id", "x"),
                vec![doc(json!({"_id": "3", "metadata": {"id": "x"}}))],
            )
            .await
            .unwrap();
        let all = backend.find("ds", "timeSeries", &Query::new()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|d| d["_id"] == json!("3")));
        assert!(all.iter().any(|d| d["_id"] == json!("2")));
        assert!(!all.iter().any(|d| d["_id"] == json!("1")));
    }
}
