//! CSV backup and restore.
//!
//! - **Export**: store → CSV snapshot, written atomically
//! - **Import**: CSV → validated batch → all-or-nothing merge
//! - **Clear**: mandatory export, then wholesale clear
//! - **Status**: size, record count and fingerprint of the persisted blob
//!
//! # File Format
//!
//! Comma-delimited, header first, no quoting:
//! ```text
//! track_id,identification_id,identification_name,identification_at
//! 12,2,Brown goshawk,2024-05-01T10:20:30.123Z
//! ```

mod export;
mod file;
mod hash;
mod import;
mod status;
mod types;

pub use export::{export_file_name, export_rows, render_export, Exporter, DELIMITER};
pub use file::{atomic_write, file_size};
pub use hash::{content_hash, has_changed};
pub use import::{batch_from_rows, Batch, Importer};
pub use status::{get_store_status, print_status};
pub use types::{ExportStats, ImportStats, SpeciesCount, StoreStatus};

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::storage::BlobStore;
use crate::store::IdentificationStore;

/// Export a backup into `backup_dir`, then clear the store.
///
/// The clear only happens once the backup file is on disk. If the export
/// fails the store is left as it was.
///
/// # Errors
///
/// Returns the export error (store untouched) or the clear's write error.
pub fn clear_with_backup<B: BlobStore>(
    store: &mut IdentificationStore<B>,
    backup_dir: &Path,
) -> Result<ExportStats> {
    let backup = Exporter::new(store).export_into_dir(backup_dir)?;
    info!(path = %backup.path.display(), records = backup.records, "backup written before clear");
    store.clear()?;
    Ok(backup)
}
