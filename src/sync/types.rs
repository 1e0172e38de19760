//! Result types for export, import and status.

use serde::Serialize;
use std::path::PathBuf;

use crate::store::MergeStats;

/// Statistics for an export operation.
#[derive(Debug, Clone, Serialize)]
pub struct ExportStats {
    /// Number of identification rows written.
    pub records: usize,
    /// File the export was written to.
    pub path: PathBuf,
    /// Size of the written file in bytes.
    pub bytes: u64,
    /// SHA256 of the written file.
    pub content_hash: String,
}

/// Statistics for an import operation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportStats {
    /// Data rows read from the file (header excluded).
    pub rows: usize,
    /// Rows discarded for a non-numeric or out-of-range id or species.
    pub dropped: usize,
    /// Rows that repeated an earlier track id in the same file.
    pub duplicates: usize,
    /// Whether the header lacked required columns.
    pub schema_violation: bool,
    /// Merge outcome.
    pub merge: MergeStats,
}

/// Snapshot of the persisted store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    /// Storage key of the blob.
    pub key: &'static str,
    /// Whether a blob has been written yet.
    pub persisted: bool,
    /// Number of readable identifications.
    pub records: usize,
    /// Blob size in bytes.
    pub bytes: usize,
    /// SHA256 of the blob, if persisted.
    pub content_hash: Option<String>,
    /// Most recent valid identification time.
    pub newest: Option<String>,
    /// Records per species label, most frequent first.
    pub species: Vec<SpeciesCount>,
}

/// Number of records for one species.
#[derive(Debug, Clone, Serialize)]
pub struct SpeciesCount {
    pub index: usize,
    pub label: &'static str,
    pub count: usize,
}
