//! Content hashing for backups and status.
//!
//! SHA256 over the exact bytes, so two fingerprints match only when the
//! persisted blob (or exported file) is byte-for-byte identical.

use sha2::{Digest, Sha256};

/// Compute a SHA256 hex digest of `content`.
#[must_use]
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Check if content has changed relative to a stored fingerprint.
///
/// Returns `true` when there is no stored fingerprint.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.is_none_or(|h| h != current_hash)
}
