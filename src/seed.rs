//! One-time preparation of a dataset's backing collections.

use anyhow::Result;
use chrono::Utc;
use log::{debug, info};
use serde_json::Value;

use crate::model::{Collection, Document};
use crate::store::{DocStore, Query};

/// Bumped when preparation gains a new step, so existing datasets get the
/// missing steps on the next startup.
pub const SEED_VERSION: i64 = 1;

const META_COLLECTION: &str = "meta";

/// Prepares the collections a dataset needs, guarded by a version marker so
/// repeated calls are cheap.
pub async fn prepare_dataset(store: &DocStore, dataset: &str) -> Result<()> {
    let backend = store.backend();
    let marker = Query::eq("seed_version", SEED_VERSION);
    if !backend
        .find(dataset, META_COLLECTION, &marker)
        .await?
        .is_empty()
    {
        debug!("dataset {dataset} already prepared at version {SEED_VERSION}");
        return Ok(());
    }

    backend
        .create_timeseries_collection(
            dataset,
            Collection::TimeSeries.name(),
            "timestamp",
            "metadata",
        )
        .await?;

    let mut doc = Document::new();
    doc.insert("seed_version".to_owned(), Value::from(SEED_VERSION));
    doc.insert(
        "prepared_at".to_owned(),
        Value::String(Utc::now().to_rfc3339()),
    );
    backend.insert_one(dataset, META_COLLECTION, doc).await?;

    info!("prepared dataset {dataset} at version {SEED_VERSION}");
    Ok(())
}
