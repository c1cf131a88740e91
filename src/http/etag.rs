//! Entity-tag generation module
//!
//! Body digests for `ETag` headers, using fast non-cryptographic hashing.
//! These tags are cache validators, not integrity checks.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Digest a response body into a hex string.
///
/// Returns `None` for an empty body: an empty representation gets no
/// entity tag, which in turn steers the cache-control defaulting in the
/// etag middleware.
pub fn digest(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    let v = hasher.finish();
    Some(format!("{v:x}"))
}

/// Wrap a digest as a weak entity tag, e.g. `W/"abc123"`.
///
/// Weak because the digest covers the buffered bytes only, not the full
/// representation metadata.
pub fn weak(digest: &str) -> String {
    format!("W/\"{digest}\"")
}
