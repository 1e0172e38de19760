//! Bootstrap version tokens.
//!
//! Each bootstrap of a watch loop takes a new version from a shared
//! [`VersionCell`]. A loop holding an older [`LoopToken`] sees the mismatch on
//! its next tick and stops. There is no other way to stop a loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Live version shared by every loop bootstrapped from it.
#[derive(Debug, Default, Clone)]
pub struct VersionCell {
    live: Arc<AtomicU64>,
}

impl VersionCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new version, superseding every earlier token.
    #[must_use]
    pub fn bootstrap(&self) -> LoopToken {
        let captured = self.live.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(version = captured, "watch loop bootstrapped");
        LoopToken {
            captured,
            live: Arc::clone(&self.live),
        }
    }

    #[must_use]
    pub fn current(&self) -> u64 {
        self.live.load(Ordering::Acquire)
    }
}

/// The version a loop was started under.
#[derive(Debug, Clone)]
pub struct LoopToken {
    captured: u64,
    live: Arc<AtomicU64>,
}

impl LoopToken {
    #[must_use]
    pub fn version(&self) -> u64 {
        self.captured
    }

    /// Whether no newer bootstrap has happened since this token was issued.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.live.load(Ordering::Acquire) == self.captured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_increase() {
        let cell = VersionCell::new();
        let first = cell.bootstrap();
        let second = cell.bootstrap();
        assert!(second.version() > first.version());
        assert_eq!(cell.current(), second.version());
    }

    #[test]
    fn test_newer_bootstrap_supersedes() {
        let cell = VersionCell::new();
        let first = cell.bootstrap();
        assert!(first.is_current());

        let second = cell.bootstrap();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(!first.clone().is_current());
    }
}
