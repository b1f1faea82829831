//! Cache entry record.

use serde::{Deserialize, Serialize};

/// A cached response snapshot.
///
/// Keyed by the normalized request signature; the value is an opaque copy of
/// the response a strategy executor saw on the network. Entries are replaced
/// wholesale on rewrite, never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub signature: String,
    pub url: String,
    pub method: String,
    pub status: u16,
    pub content_type: Option<String>,
    /// Response headers as a JSON array of name/value pairs.
    pub headers_json: Option<String>,
    pub body: Vec<u8>,
    /// RFC 3339 timestamp of when the entry was written.
    pub stored_at: String,
}

impl CachedResponse {
    /// Decode the stored headers, tolerating missing or malformed JSON.
    pub fn headers(&self) -> Vec<(String, String)> {
        self.headers_json
            .as_deref()
            .and_then(|j| serde_json::from_str(j).ok())
            .unwrap_or_default()
    }
}
