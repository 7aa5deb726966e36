//! Whole-collection persistence.
//!
//! A store holds one flat collection and only knows two operations: load
//! everything, replace everything. Services edit the loaded list in memory
//! and write the full list back. Nothing here serializes those cycles, so
//! two overlapping mutations can lose an update.

mod json_file;
mod memory;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use mission_core::CoreError;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON array of records.
    #[error("malformed data in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The collection could not be encoded.
    #[error("failed to encode collection: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Storage(err.to_string())
    }
}

/// Load/replace-all persistence contract for a collection of `T`.
#[async_trait]
pub trait Store<T>: Send + Sync {
    /// Return the full collection, or an empty one if nothing was persisted yet.
    async fn load_all(&self) -> Result<Vec<T>, StoreError>;

    /// Overwrite the entire collection.
    async fn replace_all(&self, items: &[T]) -> Result<(), StoreError>;
}
