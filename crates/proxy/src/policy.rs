//! Request classification into caching strategies.
//!
//! Classification is a pure function of the request: documents and versioned
//! static assets prefer the freshest network copy but degrade to cache when
//! offline; everything else defaults to minimizing network use.

use std::sync::LazyLock;

use overcast_client::ResourceRequest;
use regex::Regex;

/// Per-request caching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Prefer the network; fall back to cache when it fails.
    NetworkFirst,
    /// Serve from cache; fall through to the network on a miss.
    CacheFirst,
}

/// Script, stylesheet, image, font, and icon suffixes.
static STATIC_ASSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(js|css|png|jpe?g|svg|ico|webp|woff2?)$").expect("static asset pattern"));

/// Classify a request into its caching strategy.
pub fn classify(request: &ResourceRequest) -> Policy {
    if request.navigate {
        return Policy::NetworkFirst;
    }

    if request.accept.as_deref().is_some_and(|accept| accept.contains("text/html")) {
        return Policy::NetworkFirst;
    }

    if STATIC_ASSET.is_match(request.url.path()) {
        return Policy::NetworkFirst;
    }

    Policy::CacheFirst
}
