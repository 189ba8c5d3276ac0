//! Data access layer for a document database holding graphs of experiment
//! entities: experiments, scenarios, activity executions, participants and
//! their states, recordings, and the time series captured during them.
//!
//! Reads hydrate relationships in place. Every getter takes a `depth` bound
//! on how many hops to expand and threads a `source` marker through the
//! traversal so an entity never re-embeds the neighbor it was just reached
//! from.

#![recursion_limit = "512"]

pub mod config;
pub mod model;
pub mod seed;
pub mod service;
pub mod store;

pub use config::AppConfig;
pub use model::*;
pub use service::ServiceGraph;
pub use store::{DocStore, DocumentBackend, MemoryBackend, Query};

use std::sync::Arc;

/// Builds a wired service graph over the given backend, preparing the
/// metadata database when the configuration asks for it.
pub async fn build_services(
    config: &AppConfig,
    backend: Arc<dyn DocumentBackend>,
) -> anyhow::Result<ServiceGraph> {
    let store = DocStore::new(backend);
    if config.database.seed_on_start {
        seed::prepare_dataset(&store, &config.database.metadata_dataset).await?;
    }
    Ok(ServiceGraph::new(
        store,
        config.database.metadata_dataset.clone(),
    ))
}

/// Initializes logging for binaries and integration tests.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
