//! Optional serialization of read-modify-write cycles.

use tokio::sync::{Mutex, MutexGuard};

/// Gate around mutating service operations.
///
/// Disabled by default: every mutation loads, edits and rewrites the whole
/// collection on its own, and overlapping cycles can lose an update. When
/// enabled, mutations of one service run one at a time.
#[derive(Debug, Default)]
pub(crate) struct WriteGuard {
    lock: Option<Mutex<()>>,
}

impl WriteGuard {
    /// Guard that lets cycles overlap.
    pub(crate) fn disabled() -> Self {
        Self { lock: None }
    }

    /// Guard that runs cycles one at a time.
    pub(crate) fn serialized() -> Self {
        Self {
            lock: Some(Mutex::new(())),
        }
    }

    /// Returns true if cycles are serialized.
    pub(crate) fn is_serialized(&self) -> bool {
        self.lock.is_some()
    }

    /// Enter a mutation. Hold the returned value until the write is done.
    pub(crate) async fn enter(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}
