//! Generation lifecycle: creation, enumeration, retirement.

use std::sync::Arc;

use super::entry::CachedResponse;
use super::store::GenerationStore;
use crate::Error;

/// Creates, names, and retires versioned cache generations over an injected
/// store backend.
#[derive(Clone)]
pub struct GenerationManager {
    store: Arc<dyn GenerationStore>,
}

impl GenerationManager {
    pub fn new(store: Arc<dyn GenerationStore>) -> Self {
        Self { store }
    }

    /// Create a generation, or return a handle to the existing one.
    pub async fn create(&self, name: &str) -> Result<Generation, Error> {
        self.store.create_generation(name).await?;
        tracing::debug!("generation {} ready", name);
        Ok(Generation {
            name: name.to_string(),
            store: Arc::clone(&self.store),
        })
    }

    /// All generation names currently in the store.
    pub async fn list(&self) -> Result<Vec<String>, Error> {
        self.store.list_generations().await
    }

    /// Delete a generation and everything it owns. Returns false when no
    /// generation had that name.
    pub async fn delete(&self, name: &str) -> Result<bool, Error> {
        let deleted = self.store.delete_generation(name).await?;
        if deleted {
            tracing::info!("generation {} deleted", name);
        }
        Ok(deleted)
    }
}

/// Handle to one named generation's entries.
#[derive(Clone)]
pub struct Generation {
    name: String,
    store: Arc<dyn GenerationStore>,
}

impl Generation {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an entry by request signature.
    pub async fn get(&self, signature: &str) -> Result<Option<CachedResponse>, Error> {
        self.store.get(&self.name, signature).await
    }

    /// Write an entry, replacing any prior entry with the same signature.
    pub async fn put(&self, entry: &CachedResponse) -> Result<(), Error> {
        self.store.put(&self.name, entry).await
    }

    /// Number of entries this generation owns.
    pub async fn len(&self) -> Result<u64, Error> {
        self.store.count_entries(&self.name).await
    }
}
