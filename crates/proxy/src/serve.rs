//! The interception channel between the host and the proxy.
//!
//! The host pushes intercepted requests onto an mpsc channel; each one is
//! handled on its own detached task so requests run concurrently and a
//! requester that disconnects early never cancels the warm-cache write.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use overcast_client::ResourceRequest;
use overcast_core::Error;

use crate::proxy::CacheProxy;
use crate::strategy::ProxyResponse;

/// One intercepted request and the channel its response goes back on.
pub struct Intercept {
    pub request: ResourceRequest,
    pub respond_to: oneshot::Sender<Result<ProxyResponse, Error>>,
}

/// Drain the interception channel until every sender is dropped.
pub async fn run(proxy: Arc<CacheProxy>, mut requests: mpsc::Receiver<Intercept>) {
    while let Some(intercept) = requests.recv().await {
        let proxy = Arc::clone(&proxy);
        tokio::spawn(async move {
            let result = proxy.handle_fetch(&intercept.request).await;
            if intercept.respond_to.send(result).is_err() {
                tracing::debug!("requester went away before the response was ready");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockFetcher;
    use overcast_core::{AppConfig, MemoryStore};

    async fn serving_proxy() -> (Arc<CacheProxy>, Arc<MockFetcher>) {
        let fetcher = MockFetcher::new();
        fetcher.respond("http://localhost:8080/", 200, "text/html", b"<html></html>");
        fetcher.respond("http://localhost:8080/index.html", 200, "text/html", b"<html></html>");
        fetcher.respond("http://localhost:8080/manifest.json", 200, "application/json", b"{}");
        let fetcher = Arc::new(fetcher);

        let proxy = Arc::new(
            CacheProxy::new(
                Arc::new(MemoryStore::new()),
                Arc::clone(&fetcher) as Arc<dyn overcast_client::Fetcher>,
                AppConfig { origin: "http://localhost:8080".into(), ..Default::default() },
            )
            .unwrap(),
        );
        proxy.install().await.unwrap();
        proxy.activate().await.unwrap();
        (proxy, fetcher)
    }

    #[tokio::test]
    async fn test_intercept_roundtrip() {
        let (proxy, _fetcher) = serving_proxy().await;
        let (tx, rx) = mpsc::channel(8);
        let server = tokio::spawn(run(proxy, rx));

        let (respond_to, response) = oneshot::channel();
        let request = ResourceRequest::navigation("http://localhost:8080/").unwrap();
        tx.send(Intercept { request, respond_to }).await.unwrap();

        let served = response.await.unwrap().unwrap();
        assert_eq!(served.status, 200);

        drop(tx);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_requester_does_not_stop_serving() {
        let (proxy, _fetcher) = serving_proxy().await;
        let (tx, rx) = mpsc::channel(8);
        let server = tokio::spawn(run(proxy, rx));

        // First requester gives up immediately.
        let (respond_to, response) = oneshot::channel();
        drop(response);
        let request = ResourceRequest::navigation("http://localhost:8080/").unwrap();
        tx.send(Intercept { request, respond_to }).await.unwrap();

        // A later request is still served.
        let (respond_to, response) = oneshot::channel();
        let request = ResourceRequest::navigation("http://localhost:8080/").unwrap();
        tx.send(Intercept { request, respond_to }).await.unwrap();
        assert!(response.await.unwrap().is_ok());

        drop(tx);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_errors_propagate_to_requester() {
        let (proxy, _fetcher) = serving_proxy().await;
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(run(proxy, rx));

        let (respond_to, response) = oneshot::channel();
        let request = ResourceRequest::get("http://localhost:8080/never-seen.css").unwrap();
        tx.send(Intercept { request, respond_to }).await.unwrap();

        let result = response.await.unwrap();
        assert!(matches!(result, Err(Error::Unreachable(_))));
    }
}
