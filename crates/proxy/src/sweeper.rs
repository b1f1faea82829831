//! Activation sweep: retire every generation except the one being promoted.

use overcast_core::{Error, GenerationManager};

/// Delete all generations whose name differs from `current`.
///
/// Returns the number of generations retired. Must complete before the proxy
/// starts serving under `current`.
pub async fn sweep(manager: &GenerationManager, current: &str) -> Result<usize, Error> {
    let names = manager.list().await?;

    let mut deleted = 0;
    for name in names {
        if name == current {
            continue;
        }
        if manager.delete(&name).await? {
            deleted += 1;
        }
    }

    tracing::info!("activation sweep retired {} stale generation(s)", deleted);
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use overcast_core::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sweep_keeps_only_current() {
        let manager = GenerationManager::new(Arc::new(MemoryStore::new()));
        manager.create("app-v1").await.unwrap();
        manager.create("app-v2").await.unwrap();
        manager.create("app-v3").await.unwrap();

        let deleted = sweep(&manager, "app-v3").await.unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(manager.list().await.unwrap(), vec!["app-v3".to_string()]);
    }

    #[tokio::test]
    async fn test_sweep_with_nothing_stale() {
        let manager = GenerationManager::new(Arc::new(MemoryStore::new()));
        manager.create("app-v1").await.unwrap();

        let deleted = sweep(&manager, "app-v1").await.unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(manager.list().await.unwrap(), vec!["app-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_sweep_preserves_current_entries() {
        let manager = GenerationManager::new(Arc::new(MemoryStore::new()));
        let stale = manager.create("app-v1").await.unwrap();
        let current = manager.create("app-v2").await.unwrap();

        let entry = overcast_core::CachedResponse {
            signature: "sig".to_string(),
            url: "https://example.com/".to_string(),
            method: "GET".to_string(),
            status: 200,
            content_type: None,
            headers_json: None,
            body: b"keep me".to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        };
        stale.put(&entry).await.unwrap();
        current.put(&entry).await.unwrap();

        sweep(&manager, "app-v2").await.unwrap();

        assert!(stale.get("sig").await.unwrap().is_none());
        assert!(current.get("sig").await.unwrap().is_some());
    }
}
