//! Strategy executors: how one request is resolved against the network and
//! the current generation's store.
//!
//! Responding and persisting are independent: the caller-visible response is
//! never blocked or delayed by the cache-write side effect.

use bytes::Bytes;

use overcast_client::{FetchResponse, Fetcher, ResourceRequest};
use overcast_core::{CachedResponse, Error, Generation};

use crate::writeback::WriteQueue;

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Network,
    Cache,
}

impl std::fmt::Display for ServedFrom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServedFrom::Network => write!(f, "network"),
            ServedFrom::Cache => write!(f, "cache"),
        }
    }
}

/// The response handed back to the intercepted caller.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub served_from: ServedFrom,
}

impl ProxyResponse {
    pub(crate) fn from_network(response: FetchResponse) -> Self {
        Self {
            url: response.url.to_string(),
            status: response.status,
            content_type: response.content_type,
            headers: response.headers,
            body: response.bytes,
            served_from: ServedFrom::Network,
        }
    }

    pub(crate) fn from_cache(entry: CachedResponse) -> Self {
        Self {
            url: entry.url.clone(),
            status: entry.status,
            content_type: entry.content_type.clone(),
            headers: entry.headers(),
            body: Bytes::from(entry.body),
            served_from: ServedFrom::Cache,
        }
    }
}

/// Prefer the network; degrade to cache when it fails.
///
/// A successful fetch is returned immediately and a copy is queued for the
/// store as a detached side effect. On fetch failure the cached entry is
/// served instead; with neither, the original fetch error surfaces.
pub async fn network_first(
    fetcher: &dyn Fetcher,
    generation: &Generation,
    writes: &WriteQueue,
    request: &ResourceRequest,
) -> Result<ProxyResponse, Error> {
    match fetcher.fetch(request).await {
        Ok(response) => {
            writes.enqueue(generation.clone(), response.to_cached(request));
            Ok(ProxyResponse::from_network(response))
        }
        Err(network_err) => match generation.get(&request.signature()).await? {
            Some(entry) => {
                tracing::debug!("network failed for {}, serving cached copy", request.url);
                Ok(ProxyResponse::from_cache(entry))
            }
            None => Err(network_err),
        },
    }
}

/// Serve from cache; fall through to a single network fetch on a miss.
///
/// The fall-through response is returned verbatim and not written back.
pub async fn cache_first(
    fetcher: &dyn Fetcher,
    generation: &Generation,
    request: &ResourceRequest,
) -> Result<ProxyResponse, Error> {
    if let Some(entry) = generation.get(&request.signature()).await? {
        return Ok(ProxyResponse::from_cache(entry));
    }

    let response = fetcher.fetch(request).await?;
    Ok(ProxyResponse::from_network(response))
}
