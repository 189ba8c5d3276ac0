use std::sync::Arc;

use labgraph::{DocStore, MemoryBackend, Outcome, ServiceGraph};

pub const DATASET: &str = "lab";

pub fn graph() -> ServiceGraph {
    let store = DocStore::new(Arc::new(MemoryBackend::new()));
    ServiceGraph::new(store, "datasets")
}

/// Unwraps the `Ok` arm, failing the test with the domain error otherwise.
pub fn ok<T>(outcome: Outcome<T>) -> T {
    match outcome {
        Outcome::Ok(value) => value,
        Outcome::NotFound(nf) => panic!("unexpected not found: {}", nf.errors),
        Outcome::Invalid(msg) => panic!("unexpected invalid: {msg}"),
    }
}
