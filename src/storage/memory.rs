//! In-memory blob storage.

use std::collections::HashMap;

use crate::error::Result;
use crate::storage::BlobStore;

/// Volatile key-value slots, for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    slots: HashMap<String, String>,
    writes: usize,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a slot with raw contents, bypassing the write counter.
    #[must_use]
    pub fn with_raw(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.slots.insert(key.to_string(), value.to_string());
        store
    }

    /// Number of `set` calls so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}
