//! Network fetch pipeline.
//!
//! ### The network seam
//! - Strategy executors and the installation seeder depend on the `Fetcher`
//!   trait, never on reqwest directly, so tests can script the network.
//!
//! ### Failure semantics
//! - Only transport-level failures are fetch failures (`UNREACHABLE`).
//! - HTTP error statuses are responses like any other: they are returned to
//!   the caller and are cacheable.
//! - Bodies over the configured cap are rejected (`RESPONSE_TOO_LARGE`).

pub mod url;

use bytes::Bytes;
use std::time::{Duration, Instant};

pub use url::{UrlError, canonicalize, resolve};

use crate::request::ResourceRequest;
use async_trait::async_trait;
use overcast_core::{CachedResponse, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "overcast/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "overcast/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The original URL requested
    pub url: ::url::Url,
    /// The final URL after redirects
    pub final_url: ::url::Url,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Response headers as name/value pairs
    pub headers: Vec<(String, String)>,
}

impl FetchResponse {
    /// Snapshot this response into a storable cache entry for `request`.
    pub fn to_cached(&self, request: &ResourceRequest) -> CachedResponse {
        CachedResponse {
            signature: request.signature(),
            url: self.url.to_string(),
            method: request.method.clone(),
            status: self.status,
            content_type: self.content_type.clone(),
            headers_json: serde_json::to_string(&self.headers).ok(),
            body: self.bytes.to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// The network side of the cache proxy.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a resource. Errors only on transport failure or an oversized
    /// body, never on HTTP error statuses.
    async fn fetch(&self, request: &ResourceRequest) -> Result<FetchResponse, Error>;
}

/// HTTP fetch client over reqwest.
pub struct HttpFetcher {
    http: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::InvalidInput(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &ResourceRequest) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::InvalidInput(format!("unsupported method: {}", request.method)))?;

        let mut outbound = self.http.request(method, request.url.as_str());
        outbound = outbound.header(
            "Accept",
            request
                .accept
                .as_deref()
                .unwrap_or("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );

        let response = outbound
            .send()
            .await
            .map_err(|e| Error::Unreachable(format!("{}: {e}", request.url)))?;

        let status = response.status().as_u16();

        let content_length = response.content_length();
        if let Some(len) = content_length
            && len as usize > self.config.max_bytes
        {
            return Err(Error::TooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let content_type = headers
            .iter()
            .find(|(name, _)| name == "content-type")
            .map(|(_, value)| value.clone());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Unreachable(format!("failed to read response: {e}")))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::TooLarge(format!(
                "{} bytes exceeds {}",
                bytes.len(),
                self.config.max_bytes
            )));
        }

        tracing::debug!(
            "fetched {} -> {} status {} in {}ms ({} bytes)",
            request.url,
            final_url,
            status,
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(FetchResponse {
            url: request.url.clone(),
            final_url,
            status,
            content_type,
            bytes,
            headers,
        })
    }
}
