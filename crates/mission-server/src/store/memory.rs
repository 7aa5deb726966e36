//! In-process store for tests and throwaway runs.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Store, StoreError};

/// Store that keeps the collection in memory.
pub struct MemoryStore<T> {
    items: RwLock<Vec<T>>,
}

impl<T> MemoryStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// Create a store seeded with existing records.
    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Store<T> for MemoryStore<T>
where
    T: Clone + Send + Sync,
{
    async fn load_all(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.items.read().await.clone())
    }

    async fn replace_all(&self, items: &[T]) -> Result<(), StoreError> {
        *self.items.write().await = items.to_vec();
        Ok(())
    }
}
