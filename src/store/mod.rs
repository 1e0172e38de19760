//! The local identification store.
//!
//! Owns the mapping of track id to identification and its persisted form.
//! Every read decodes the whole blob and every write replaces it; there is
//! no way to persist a single key.
//!
//! A blob that is not a JSON object is reported as `StorageCorrupt` and read
//! as an empty mapping, so the caller keeps working. Single entries that do
//! not decode are skipped and their siblings survive. Backend failures (I/O,
//! SQLite) are not corruption and propagate as errors.

pub mod merge;

pub use merge::{find_conflicts, resolve, Conflict, ImportEntry, MergeStats};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{EntityId, IdentificationMap, IdentificationRecord, SpeciesType};
use crate::report::Reporter;
use crate::storage::BlobStore;

/// Fixed key of the persisted slot.
pub const STORAGE_KEY: &str = "bird-tracker-plugin";

/// Identification store over a persistence backend.
pub struct IdentificationStore<B> {
    backend: B,
    reporter: Arc<dyn Reporter>,
}

impl<B: BlobStore> IdentificationStore<B> {
    #[must_use]
    pub fn new(backend: B, reporter: Arc<dyn Reporter>) -> Self {
        Self { backend, reporter }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Channel for errors that are surfaced without aborting.
    #[must_use]
    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    /// The raw persisted blob, undecoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn raw(&self) -> Result<Option<String>> {
        self.backend.get(STORAGE_KEY)
    }

    /// Read the whole mapping.
    ///
    /// Absent blob reads as empty. A malformed blob is reported and also
    /// reads as empty. Entries with a non-numeric key or an undecodable
    /// record are skipped; the next write drops them from the blob.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself fails.
    pub fn get(&self) -> Result<IdentificationMap> {
        let Some(raw) = self.raw()? else {
            return Ok(IdentificationMap::new());
        };

        match decode(&raw) {
            Ok(map) => Ok(map),
            Err(reason) => {
                warn!(%reason, "stored identifications are corrupt");
                self.reporter.report(&Error::StorageCorrupt { raw });
                Ok(IdentificationMap::new())
            }
        }
    }

    /// Look up a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn lookup(&self, id: EntityId) -> Result<Option<IdentificationRecord>> {
        Ok(self.get()?.remove(&id))
    }

    /// Replace the whole mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn set(&mut self, map: &IdentificationMap) -> Result<()> {
        let blob = serde_json::to_string(map)?;
        self.backend.set(STORAGE_KEY, &blob)?;
        debug!(records = map.len(), bytes = blob.len(), "identifications persisted");
        Ok(())
    }

    /// Upsert one identification stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn add(&mut self, id: EntityId, species: SpeciesType) -> Result<IdentificationRecord> {
        let mut map = self.get()?;
        let record = IdentificationRecord::now(species);
        map.insert(id, record.clone());
        self.set(&map)?;
        info!(track_id = %id, species = %species, "identification saved");
        Ok(record)
    }

    /// Merge an import batch, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns `ImportConflict` with every conflict if any stored species
    /// disagrees; nothing is written in that case.
    pub fn import(&mut self, batch: &[ImportEntry]) -> Result<MergeStats> {
        let current = self.get()?;
        match resolve(current, batch) {
            Ok((merged, stats)) => {
                self.set(&merged)?;
                info!(
                    created = stats.created,
                    updated = stats.updated,
                    unchanged = stats.unchanged,
                    "import committed"
                );
                Ok(stats)
            }
            Err(conflicts) => {
                warn!(conflicts = conflicts.len(), "import aborted");
                Err(Error::ImportConflict { conflicts })
            }
        }
    }

    /// Drop every identification.
    ///
    /// User-facing code goes through [`crate::sync::clear_with_backup`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub fn clear(&mut self) -> Result<()> {
        self.set(&IdentificationMap::new())?;
        info!("identifications cleared");
        Ok(())
    }
}

/// Decode a persisted blob.
///
/// Only invalid JSON or a non-object top level rejects the blob. Entries
/// whose key is not a positive integer, or whose record does not decode
/// (e.g. a `type` outside the species table), are skipped with a warning.
/// Skipped entries are not carried over: the next `set` writes only what
/// decoded.
fn decode(raw: &str) -> std::result::Result<IdentificationMap, String> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    let serde_json::Value::Object(entries) = value else {
        return Err("expected a JSON object".to_string());
    };

    let mut map = IdentificationMap::new();
    for (key, value) in entries {
        let Some(id) = EntityId::parse(&key) else {
            warn!(key = %key, "skipping stored identification with non-numeric id");
            continue;
        };
        match serde_json::from_value::<IdentificationRecord>(value) {
            Ok(record) => {
                map.insert(id, record);
            }
            Err(e) => warn!(key = %key, error = %e, "skipping undecodable stored identification"),
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::report::CollectingReporter;
    use crate::storage::MemoryBlobStore;

    fn store_with(backend: MemoryBlobStore) -> (IdentificationStore<MemoryBlobStore>, Arc<CollectingReporter>) {
        let reporter = Arc::new(CollectingReporter::new());
        (IdentificationStore::new(backend, reporter.clone()), reporter)
    }

    fn id(raw: u64) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    fn species(index: usize) -> SpeciesType {
        SpeciesType::new(index).unwrap()
    }

    #[test]
    fn test_absent_blob_reads_empty() {
        let (store, reporter) = store_with(MemoryBlobStore::new());
        assert!(store.get().unwrap().is_empty());
        assert!(reporter.reports().is_empty());
    }

    #[test]
    fn test_corrupt_blob_reports_and_reads_empty() {
        for raw in ["{not json", "42", "\"text\"", "[1,2]", "null"] {
            let (store, reporter) = store_with(MemoryBlobStore::with_raw(STORAGE_KEY, raw));
            assert!(store.get().unwrap().is_empty(), "blob {raw} should read empty");
            assert_eq!(reporter.codes(), vec![ErrorCode::StorageCorrupt], "blob {raw}");
        }
    }

    #[test]
    fn test_reads_existing_blob_shape() {
        let raw = r#"{"12":{"type":"5","identifiedAt":"2024-05-01T10:00:00.000Z"},"13":{"type":"0","extra":true},"abc":{"type":"1"}}"#;
        let (store, reporter) = store_with(MemoryBlobStore::with_raw(STORAGE_KEY, raw));

        let map = store.get().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&id(12)].species, species(5));
        assert_eq!(map[&id(13)].identified_at, None);
        assert!(reporter.reports().is_empty());
    }

    #[test]
    fn test_bad_record_is_skipped_not_fatal() {
        let raw = r#"{"5":{"type":"999"},"6":3,"7":{"type":"4"}}"#;
        let (store, reporter) = store_with(MemoryBlobStore::with_raw(STORAGE_KEY, raw));

        let map = store.get().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&id(7)].species, species(4));
        assert!(reporter.reports().is_empty());
    }

    #[test]
    fn test_add_keeps_siblings_of_bad_record() {
        let raw = r#"{"1":{"type":"5"},"2":{"type":"6"},"3":{"type":"999"}}"#;
        let (mut store, _) = store_with(MemoryBlobStore::with_raw(STORAGE_KEY, raw));

        store.add(id(4), species(1)).unwrap();

        let map = store.get().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map[&id(1)].species, species(5));
        assert_eq!(map[&id(2)].species, species(6));
        assert_eq!(map[&id(4)].species, species(1));
        assert!(!map.contains_key(&id(3)));
    }

    #[test]
    fn test_non_numeric_key_dropped_on_next_write() {
        let raw = r#"{"abc":{"type":"2"},"8":{"type":"3"}}"#;
        let (mut store, _) = store_with(MemoryBlobStore::with_raw(STORAGE_KEY, raw));
        assert_eq!(store.get().unwrap().len(), 1);

        store.add(id(9), species(1)).unwrap();

        let written = store.raw().unwrap().unwrap();
        assert!(!written.contains("abc"), "{written}");
        assert!(written.contains("\"8\""), "{written}");
    }

    #[test]
    fn test_add_then_get() {
        let (mut store, _) = store_with(MemoryBlobStore::new());
        let before = chrono::Utc::now();

        store.add(id(7), species(3)).unwrap();

        let map = store.get().unwrap();
        let record = &map[&id(7)];
        assert_eq!(record.species, species(3));
        let at = record.identified_at_parsed().expect("valid timestamp");
        // Persisted with millisecond precision.
        assert!(at >= before - chrono::Duration::milliseconds(1));
    }

    #[test]
    fn test_add_overwrites_and_persists_whole_map() {
        let (mut store, _) = store_with(MemoryBlobStore::new());
        store.add(id(1), species(1)).unwrap();
        store.add(id(2), species(2)).unwrap();
        store.add(id(1), species(4)).unwrap();

        let map = store.get().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&id(1)].species, species(4));
        assert_eq!(store.backend().writes(), 3);
    }

    #[test]
    fn test_persisted_form_uses_string_keys() {
        let (mut store, _) = store_with(MemoryBlobStore::new());
        let mut map = IdentificationMap::new();
        map.insert(
            id(5),
            IdentificationRecord {
                species: species(2),
                identified_at: None,
            },
        );
        store.set(&map).unwrap();

        assert_eq!(store.raw().unwrap().as_deref(), Some(r#"{"5":{"type":"2"}}"#));
    }

    #[test]
    fn test_import_conflict_leaves_store_untouched() {
        let (mut store, _) = store_with(MemoryBlobStore::with_raw(STORAGE_KEY, r#"{"5":{"type":"2"}}"#));

        let batch = [
            ImportEntry { id: id(5), species: species(3), identified_at: None },
            ImportEntry { id: id(9), species: species(1), identified_at: None },
        ];
        let err = store.import(&batch).unwrap_err();

        match err {
            Error::ImportConflict { conflicts } => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].id, id(5));
                assert_eq!(conflicts[0].expected, species(2));
                assert_eq!(conflicts[0].got, species(3));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(store.raw().unwrap().as_deref(), Some(r#"{"5":{"type":"2"}}"#));
        assert_eq!(store.backend().writes(), 0);
    }

    #[test]
    fn test_import_twice_is_idempotent() {
        let (mut store, _) = store_with(MemoryBlobStore::new());
        let batch = [
            ImportEntry { id: id(1), species: species(1), identified_at: Some("2024-01-01T00:00:00.000Z".into()) },
            ImportEntry { id: id(2), species: species(2), identified_at: None },
        ];

        let first = store.import(&batch).unwrap();
        assert_eq!(first.created, 2);
        let blob_after_first = store.raw().unwrap();

        let second = store.import(&batch).unwrap();
        assert_eq!(second.unchanged, 2);
        assert_eq!(store.raw().unwrap(), blob_after_first);
    }

    #[test]
    fn test_clear_empties_store() {
        let (mut store, _) = store_with(MemoryBlobStore::new());
        store.add(id(1), species(1)).unwrap();
        store.clear().unwrap();
        assert!(store.get().unwrap().is_empty());
        assert_eq!(store.raw().unwrap().as_deref(), Some("{}"));
    }
}
