//! Installation seeding: pre-populate a new generation with the core asset
//! set before it may become current.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use overcast_client::fetch::resolve;
use overcast_client::{Fetcher, ResourceRequest};
use overcast_core::{Error, Generation};

/// Fetch every manifest entry and write it into `generation`.
///
/// All-or-nothing: the first failure (bad path, transport error, non-success
/// status, or a failed store write) aborts the remaining fetches and fails
/// the whole seed as `SEED_INCOMPLETE`. The generation must not be promoted
/// until a seed succeeds; the caller decides whether to retry or abort.
pub async fn seed(
    fetcher: Arc<dyn Fetcher>,
    generation: &Generation,
    origin: &url::Url,
    manifest: &[String],
    concurrency: usize,
) -> Result<(), Error> {
    if manifest.is_empty() {
        return Err(Error::SeedIncomplete("core asset manifest is empty".into()));
    }

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut join_set = JoinSet::new();

    for path in manifest.iter().cloned() {
        let permit = semaphore.clone().acquire_owned().await.unwrap();
        let fetcher = Arc::clone(&fetcher);
        let generation = generation.clone();
        let origin = origin.clone();

        join_set.spawn(async move {
            // NOTE: Hold permit for task duration to enforce concurrency limit
            let _permit = permit;

            let url = resolve(&origin, &path).map_err(|e| Error::SeedIncomplete(format!("{path}: {e}")))?;
            let request =
                ResourceRequest::get(url.as_str()).map_err(|e| Error::SeedIncomplete(format!("{path}: {e}")))?;

            let response = fetcher
                .fetch(&request)
                .await
                .map_err(|e| Error::SeedIncomplete(format!("{path}: {e}")))?;

            if response.status < 200 || response.status >= 300 {
                return Err(Error::SeedIncomplete(format!("{path}: status {}", response.status)));
            }

            generation
                .put(&response.to_cached(&request))
                .await
                .map_err(|e| Error::SeedIncomplete(format!("{path}: {e}")))?;

            tracing::debug!("seeded {}", path);
            Ok(())
        });
    }

    while let Some(result) = join_set.join_next().await {
        let outcome = result.map_err(|e| Error::SeedIncomplete(format!("seed task failed: {e}")))?;
        if let Err(e) = outcome {
            join_set.shutdown().await;
            return Err(e);
        }
    }

    tracing::info!("seeded {} core asset(s) into {}", manifest.len(), generation.name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockFetcher;
    use overcast_core::cache::signature::compute_signature;
    use overcast_core::{GenerationManager, MemoryStore};

    const MANIFEST: [&str; 3] = ["/", "/index.html", "/manifest.json"];

    fn manifest() -> Vec<String> {
        MANIFEST.iter().map(|s| s.to_string()).collect()
    }

    fn origin() -> url::Url {
        url::Url::parse("http://localhost:8080").unwrap()
    }

    async fn make_generation() -> Generation {
        GenerationManager::new(Arc::new(MemoryStore::new()))
            .create("app-v1")
            .await
            .unwrap()
    }

    fn fetcher_with_all_assets() -> MockFetcher {
        let fetcher = MockFetcher::new();
        fetcher.respond("http://localhost:8080/", 200, "text/html", b"<html></html>");
        fetcher.respond("http://localhost:8080/index.html", 200, "text/html", b"<html></html>");
        fetcher.respond("http://localhost:8080/manifest.json", 200, "application/json", b"{}");
        fetcher
    }

    #[tokio::test]
    async fn test_seed_populates_every_entry() {
        let generation = make_generation().await;
        let fetcher = fetcher_with_all_assets();

        seed(Arc::new(fetcher), &generation, &origin(), &manifest(), 4)
            .await
            .unwrap();

        assert_eq!(generation.len().await.unwrap(), 3);
        for path in MANIFEST {
            let signature = compute_signature("GET", &format!("http://localhost:8080{path}"));
            let entry = generation.get(&signature).await.unwrap();
            assert!(entry.is_some(), "missing {path}");
            assert!(!entry.unwrap().body.is_empty());
        }
    }

    #[tokio::test]
    async fn test_seed_fails_on_network_error() {
        let generation = make_generation().await;
        let fetcher = MockFetcher::new();
        fetcher.respond("http://localhost:8080/", 200, "text/html", b"<html></html>");
        // index.html and manifest.json are unscripted and fail

        let result = seed(Arc::new(fetcher), &generation, &origin(), &manifest(), 4).await;
        assert!(matches!(result, Err(Error::SeedIncomplete(_))));
    }

    #[tokio::test]
    async fn test_seed_fails_on_error_status() {
        let generation = make_generation().await;
        let fetcher = fetcher_with_all_assets();
        fetcher.respond("http://localhost:8080/manifest.json", 404, "text/plain", b"gone");

        let result = seed(Arc::new(fetcher), &generation, &origin(), &manifest(), 4).await;
        assert!(matches!(result, Err(Error::SeedIncomplete(_))));
    }

    #[tokio::test]
    async fn test_seed_rejects_empty_manifest() {
        let generation = make_generation().await;
        let fetcher = MockFetcher::new();

        let result = seed(Arc::new(fetcher), &generation, &origin(), &[], 4).await;
        assert!(matches!(result, Err(Error::SeedIncomplete(_))));
    }

    #[tokio::test]
    async fn test_reseed_does_not_duplicate() {
        let generation = make_generation().await;

        let fetcher = Arc::new(fetcher_with_all_assets());
        seed(Arc::clone(&fetcher) as Arc<dyn Fetcher>, &generation, &origin(), &manifest(), 4)
            .await
            .unwrap();
        seed(fetcher, &generation, &origin(), &manifest(), 4).await.unwrap();

        assert_eq!(generation.len().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_seed_with_single_concurrency() {
        let generation = make_generation().await;
        let fetcher = fetcher_with_all_assets();

        seed(Arc::new(fetcher), &generation, &origin(), &manifest(), 1)
            .await
            .unwrap();
        assert_eq!(generation.len().await.unwrap(), 3);
    }
}
