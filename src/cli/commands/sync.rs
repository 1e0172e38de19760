//! Backup command implementations (CSV export/import, guarded clear).
//!
//! Exports land in the backup directory (`--backup-dir`, `BT_BACKUP_DIR`
//! or the current directory) unless an explicit `--output` is given.

use std::path::{Path, PathBuf};

use colored::Colorize;

use super::open_store;
use crate::config::resolve_backup_dir;
use crate::error::{Error, Result};
use crate::sync::{clear_with_backup, ExportStats, Exporter, ImportStats, Importer};

/// Export every identification to CSV.
///
/// # Errors
///
/// Returns `ExportExists` if the target file exists, or an I/O error.
pub fn execute_export(
    output: Option<&Path>,
    backup_dir: Option<&Path>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let store = open_store(db_path, json)?;
    let exporter = Exporter::new(&store);

    let stats = match output {
        Some(path) => {
            if path.exists() {
                return Err(Error::ExportExists {
                    path: path.to_path_buf(),
                });
            }
            exporter.export_to(path)?
        }
        None => exporter.export_into_dir(&resolve_backup_dir(backup_dir)?)?,
    };

    if json {
        let output = serde_json::json!({ "success": true, "stats": stats });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_export("Export complete", &stats);
    }
    Ok(())
}

/// Import identifications from a CSV file.
///
/// # Errors
///
/// Returns `ImportConflict` listing every conflicting track (nothing is
/// written), or an I/O error if the file cannot be read.
pub fn execute_import(file: &Path, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut store = open_store(db_path, json)?;
    let stats = Importer::new(&mut store).import_file(file)?;

    if json {
        let output = serde_json::json!({ "success": true, "stats": stats });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_import(file, &stats);
    }
    Ok(())
}

/// Back up, then clear every identification.
///
/// # Errors
///
/// Returns `ClearNotConfirmed` without `--yes`. An export failure aborts
/// the clear and leaves the store intact.
pub fn execute_clear(
    yes: bool,
    backup_dir: Option<&Path>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    if !yes {
        return Err(Error::ClearNotConfirmed);
    }

    let mut store = open_store(db_path, json)?;
    let backup = clear_with_backup(&mut store, &resolve_backup_dir(backup_dir)?)?;

    if json {
        let output = serde_json::json!({ "success": true, "cleared": true, "backup": backup });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_export("Backup written", &backup);
        println!("{}", "All identifications cleared.".green());
    }
    Ok(())
}

fn print_export(title: &str, stats: &ExportStats) {
    println!("{}", title.green().bold());
    println!("  Records:  {}", stats.records);
    println!("  Location: {}", stats.path.display());
    println!("  SHA256:   {}", stats.content_hash);
}

fn print_import(file: &Path, stats: &ImportStats) {
    println!("Import complete for: {}", file.display());
    println!();
    if stats.schema_violation {
        println!("  {}", "Header lacked required columns; nothing imported.".yellow());
    }
    println!("  Rows:       {}", stats.rows);
    if stats.dropped > 0 {
        println!("  Dropped:    {}", stats.dropped);
    }
    if stats.duplicates > 0 {
        println!("  Duplicates: {}", stats.duplicates);
    }
    println!(
        "  Total: {} created, {} updated, {} unchanged",
        stats.merge.created, stats.merge.updated, stats.merge.unchanged
    );
}
