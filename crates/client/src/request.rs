//! The intercepted-request model.

use url::Url;

use crate::fetch::url::canonicalize;
use overcast_core::Error;
use overcast_core::cache::signature::compute_signature;

/// One intercepted outbound request.
///
/// Ephemeral: lives only for the duration of one interception. The URL is
/// canonicalized at construction so classification and signatures always see
/// the same form.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    pub url: Url,
    pub method: String,
    /// Declared navigation intent (the client is loading a document).
    pub navigate: bool,
    /// Accepted content type, when the client declared one.
    pub accept: Option<String>,
}

impl ResourceRequest {
    /// A plain GET for a resource.
    pub fn get(url: &str) -> Result<Self, Error> {
        Ok(Self {
            url: canonicalize(url).map_err(|e| Error::InvalidUrl(e.to_string()))?,
            method: "GET".to_string(),
            navigate: false,
            accept: None,
        })
    }

    /// A GET carrying navigation intent, as issued for document loads.
    pub fn navigation(url: &str) -> Result<Self, Error> {
        let mut request = Self::get(url)?;
        request.navigate = true;
        request.accept = Some("text/html,application/xhtml+xml".to_string());
        Ok(request)
    }

    /// A request with an explicit method.
    pub fn with_method(url: &str, method: &str) -> Result<Self, Error> {
        let mut request = Self::get(url)?;
        request.method = method.to_uppercase();
        Ok(request)
    }

    pub fn with_accept(mut self, accept: &str) -> Self {
        self.accept = Some(accept.to_string());
        self
    }

    /// The normalized signature this request is cached under.
    pub fn signature(&self) -> String {
        compute_signature(&self.method, self.url.as_str())
    }

    /// Only idempotent fetches participate in caching.
    pub fn is_idempotent(&self) -> bool {
        matches!(self.method.as_str(), "GET" | "HEAD")
    }
}
