//! CSV import.
//!
//! Parses an import file, drops rows that do not carry a usable track id
//! and species index, then hands the batch to the store's all-or-nothing
//! merge. A header without the required columns is reported and treated as
//! an empty batch.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::csv::{self, Row, IMPORT_COLUMNS};
use crate::error::{Error, Result};
use crate::model::{EntityId, SpeciesType};
use crate::storage::BlobStore;
use crate::store::{IdentificationStore, ImportEntry};
use crate::sync::export::DELIMITER;
use crate::sync::types::ImportStats;

/// Validated batch built from parsed rows.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Batch {
    pub entries: Vec<ImportEntry>,
    pub dropped: usize,
    pub duplicates: usize,
}

/// Turn parsed rows into import entries.
///
/// Rows whose `track_id` is not a positive integer or whose
/// `identification_id` is not a species index are dropped. When a track id
/// repeats, the later row wins but keeps the position of the first.
#[must_use]
pub fn batch_from_rows(rows: &[Row]) -> Batch {
    let mut batch = Batch::default();
    let mut positions: HashMap<EntityId, usize> = HashMap::new();

    for (line, row) in rows.iter().enumerate() {
        let id = row.get("track_id").and_then(|v| EntityId::parse(v));
        let species = row
            .get("identification_id")
            .and_then(|v| SpeciesType::parse_index(v));

        let (Some(id), Some(species)) = (id, species) else {
            debug!(line = line + 2, ?row, "dropping import row");
            batch.dropped += 1;
            continue;
        };

        let entry = ImportEntry {
            id,
            species,
            identified_at: row
                .get("identification_at")
                .filter(|v| !v.is_empty())
                .cloned(),
        };

        if let Some(&pos) = positions.get(&id) {
            batch.entries[pos] = entry;
            batch.duplicates += 1;
        } else {
            positions.insert(id, batch.entries.len());
            batch.entries.push(entry);
        }
    }

    batch
}

/// Importer for CSV backup files.
pub struct Importer<'a, B> {
    store: &'a mut IdentificationStore<B>,
}

impl<'a, B: BlobStore> Importer<'a, B> {
    #[must_use]
    pub fn new(store: &'a mut IdentificationStore<B>) -> Self {
        Self { store }
    }

    /// Import from CSV text.
    ///
    /// # Errors
    ///
    /// Returns `ImportConflict` if any incoming species disagrees with a
    /// stored one (nothing is written), or a storage error.
    pub fn import_text(&mut self, raw: &str) -> Result<ImportStats> {
        let mut stats = ImportStats::default();

        let rows = match csv::parse(DELIMITER, &IMPORT_COLUMNS, raw) {
            Ok(rows) => rows,
            Err(err @ Error::SchemaViolation { .. }) => {
                self.store.reporter().report(&err);
                stats.schema_violation = true;
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let batch = batch_from_rows(&rows);
        stats.rows = rows.len();
        stats.dropped = batch.dropped;
        stats.duplicates = batch.duplicates;
        stats.merge = self.store.import(&batch.entries)?;

        Ok(stats)
    }

    /// Import from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, plus any error from
    /// [`Importer::import_text`].
    pub fn import_file(&mut self, path: &Path) -> Result<ImportStats> {
        let raw = fs::read_to_string(path)?;
        self.import_text(&raw)
    }
}
