//! CSV export.
//!
//! Exports are snapshots: one row per stored identification, in ascending
//! track id order. The species label column is derived from the table at
//! export time and ignored again on import.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::csv::{self, Row, EXPORT_COLUMNS};
use crate::error::{Error, Result};
use crate::model::IdentificationMap;
use crate::storage::BlobStore;
use crate::store::IdentificationStore;
use crate::sync::file::{atomic_write, file_size};
use crate::sync::hash::content_hash;
use crate::sync::types::ExportStats;

/// Delimiter used for both export and import files.
pub const DELIMITER: &str = ",";

/// Default file name for an export taken at `millis` (Unix milliseconds).
#[must_use]
pub fn export_file_name(millis: i64) -> String {
    format!("Bird_Identifier_Tracking_{millis}.csv")
}

/// Build export rows for every stored identification.
#[must_use]
pub fn export_rows(map: &IdentificationMap) -> Vec<Row> {
    map.iter()
        .map(|(id, record)| {
            let mut row = Row::new();
            row.insert("track_id".to_string(), id.to_string());
            row.insert("identification_id".to_string(), record.species.to_string());
            row.insert(
                "identification_name".to_string(),
                record.species.label().to_string(),
            );
            if let Some(at) = &record.identified_at {
                row.insert("identification_at".to_string(), at.clone());
            }
            row
        })
        .collect()
}

/// Render the whole mapping as export CSV text.
#[must_use]
pub fn render_export(map: &IdentificationMap) -> String {
    csv::serialize(DELIMITER, &EXPORT_COLUMNS, &export_rows(map))
}

/// Exporter for CSV backup files.
pub struct Exporter<'a, B> {
    store: &'a IdentificationStore<B>,
}

impl<'a, B: BlobStore> Exporter<'a, B> {
    #[must_use]
    pub fn new(store: &'a IdentificationStore<B>) -> Self {
        Self { store }
    }

    /// Export to an explicit path, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the file written.
    pub fn export_to(&self, path: &Path) -> Result<ExportStats> {
        let map = self.store.get()?;
        let content = render_export(&map);
        atomic_write(path, &content)?;

        let stats = ExportStats {
            records: map.len(),
            path: path.to_path_buf(),
            bytes: file_size(path),
            content_hash: content_hash(content.as_bytes()),
        };
        info!(
            records = stats.records,
            path = %path.display(),
            hash = %stats.content_hash,
            "export written"
        );
        Ok(stats)
    }

    /// Export into `dir` under a fresh timestamped file name.
    ///
    /// Never overwrites: an existing file with the same name is an error.
    ///
    /// # Errors
    ///
    /// Returns `ExportExists` if the target already exists, or any error
    /// from [`Exporter::export_to`].
    pub fn export_into_dir(&self, dir: &Path) -> Result<ExportStats> {
        let path = timestamped_path(dir);
        if path.exists() {
            return Err(Error::ExportExists { path });
        }
        self.export_to(&path)
    }
}

fn timestamped_path(dir: &Path) -> PathBuf {
    dir.join(export_file_name(Utc::now().timestamp_millis()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityId, IdentificationRecord, SpeciesType};
    use crate::report::CollectingReporter;
    use crate::storage::MemoryBlobStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn sample_map() -> IdentificationMap {
        let mut map = IdentificationMap::new();
        map.insert(
            EntityId::new(12).unwrap(),
            IdentificationRecord {
                species: SpeciesType::new(2).unwrap(),
                identified_at: Some("2024-05-01T10:00:00.000Z".to_string()),
            },
        );
        map.insert(
            EntityId::new(3).unwrap(),
            IdentificationRecord {
                species: SpeciesType::new(34).unwrap(),
                identified_at: None,
            },
        );
        map
    }

    #[test]
    fn test_render_export() {
        let text = render_export(&sample_map());
        assert_eq!(
            text,
            "track_id,identification_id,identification_name,identification_at\n\
             3,34,Horsfield's bush lark,\n\
             12,2,Brown goshawk,2024-05-01T10:00:00.000Z\n"
        );
    }

    #[test]
    fn test_render_empty_export() {
        assert_eq!(
            render_export(&IdentificationMap::new()),
            "track_id,identification_id,identification_name,identification_at\n\n"
        );
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name(1_700_000_000_000),
            "Bird_Identifier_Tracking_1700000000000.csv"
        );
    }

    #[test]
    fn test_export_into_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = IdentificationStore::new(
            MemoryBlobStore::new(),
            Arc::new(CollectingReporter::new()),
        );
        store.set(&sample_map()).unwrap();

        let stats = Exporter::new(&store).export_into_dir(temp_dir.path()).unwrap();
        assert_eq!(stats.records, 2);
        assert!(stats.path.starts_with(temp_dir.path()));

        let written = std::fs::read_to_string(&stats.path).unwrap();
        assert_eq!(written, render_export(&sample_map()));
        assert_eq!(stats.content_hash, content_hash(written.as_bytes()));
    }
}
