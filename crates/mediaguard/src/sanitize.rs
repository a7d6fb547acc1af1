//! Helpers for shortening and hashing data before it reaches logs, span
//! attributes or user-facing stage details.
//!
//! Protection tokens are opaque secrets in the hands of the collaborator;
//! only a prefix ever leaves the pipeline.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Keeps the first `keep` characters of a token and marks the cut.
///
/// - `sig_1712_abcdef` with `keep = 8` → `sig_1712...`
/// - tokens no longer than `keep` are returned unchanged
pub fn short_token(token: &str, keep: usize) -> String {
    if token.chars().count() <= keep {
        return token.to_string();
    }
    let prefix: String = token.chars().take(keep).collect();
    format!("{}...", prefix)
}

/// Returns a short deterministic hash for correlation without exposing the input.
pub fn fingerprint<T: Hash + ?Sized>(value: &T) -> String {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
