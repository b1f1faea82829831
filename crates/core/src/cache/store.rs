//! Injectable store abstraction over named cache generations.
//!
//! The proxy never touches a storage backend directly; everything goes
//! through [`GenerationStore`] so lifecycle tests can substitute the
//! in-memory fake for the SQLite backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use super::entry::CachedResponse;
use crate::Error;

/// Storage backend for named cache generations.
///
/// Generations are created idempotently and deleted atomically: after
/// `delete_generation` returns, no reader observes any of its entries.
/// Writing an entry replaces any prior entry with the same signature
/// wholesale. Writing into a generation that was never created is an error.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Create a generation if it does not already exist.
    async fn create_generation(&self, name: &str) -> Result<(), Error>;

    /// All generation names, sorted.
    async fn list_generations(&self) -> Result<Vec<String>, Error>;

    /// Delete a generation and all of its entries. Returns false when no
    /// generation had that name.
    async fn delete_generation(&self, name: &str) -> Result<bool, Error>;

    /// Look up an entry by request signature. A miss is `None`, not an error.
    async fn get(&self, generation: &str, signature: &str) -> Result<Option<CachedResponse>, Error>;

    /// Write an entry, replacing any prior entry with the same signature.
    async fn put(&self, generation: &str, entry: &CachedResponse) -> Result<(), Error>;

    /// Number of entries owned by a generation (0 when it does not exist).
    async fn count_entries(&self, generation: &str) -> Result<u64, Error>;
}

/// In-memory store used by tests and as a reference implementation.
#[derive(Default)]
pub struct MemoryStore {
    generations: Mutex<BTreeMap<String, HashMap<String, CachedResponse>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, HashMap<String, CachedResponse>>> {
        // A poisoned lock only means a writer panicked mid-update; the map
        // itself is still usable.
        self.generations.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl GenerationStore for MemoryStore {
    async fn create_generation(&self, name: &str) -> Result<(), Error> {
        self.lock().entry(name.to_string()).or_default();
        Ok(())
    }

    async fn list_generations(&self) -> Result<Vec<String>, Error> {
        Ok(self.lock().keys().cloned().collect())
    }

    async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        Ok(self.lock().remove(name).is_some())
    }

    async fn get(&self, generation: &str, signature: &str) -> Result<Option<CachedResponse>, Error> {
        Ok(self
            .lock()
            .get(generation)
            .and_then(|entries| entries.get(signature))
            .cloned())
    }

    async fn put(&self, generation: &str, entry: &CachedResponse) -> Result<(), Error> {
        let mut generations = self.lock();
        let entries = generations
            .get_mut(generation)
            .ok_or_else(|| Error::NotFound(format!("generation {generation}")))?;
        entries.insert(entry.signature.clone(), entry.clone());
        Ok(())
    }

    async fn count_entries(&self, generation: &str) -> Result<u64, Error> {
        Ok(self.lock().get(generation).map_or(0, |entries| entries.len() as u64))
    }
}
