use serde::{Deserialize, Serialize};

use super::collections::{Collection, StoredModel};

/// A named bucket all other entities live inside. Dataset records themselves
/// are stored in a dedicated metadata database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetIn {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOut {
    pub id: String,
    pub name: String,
}

impl StoredModel for DatasetOut {
    const COLLECTION: Collection = Collection::Datasets;
}
