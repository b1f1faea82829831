//! Normalized request signatures for cache keys.

use sha2::{Digest, Sha256};

/// Compute the content-addressed signature for a request.
///
/// The signature is a SHA-256 over the uppercased method and the
/// canonicalized URL, so `get` and `GET` on the same resource share one
/// cache entry.
pub fn compute_signature(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
