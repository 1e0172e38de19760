//! Persistence layer for Bird Tracker.
//!
//! The identification store is persisted as one opaque blob under a fixed
//! key. Backends only offer whole-value get/set; there is no partial-key API.
//!
//! # Submodules
//!
//! - [`memory`] - In-memory backend
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - SQLite backend

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryBlobStore;
pub use sqlite::SqliteBlobStore;

use crate::error::Result;

/// A single-slot-per-key persistence collaborator.
///
/// `set` replaces the value for `key` entirely (last writer wins).
pub trait BlobStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}
