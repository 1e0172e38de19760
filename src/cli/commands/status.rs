//! `status` command implementation.

use std::path::PathBuf;

use super::open_store;
use crate::config::resolve_db_path;
use crate::error::Result;
use crate::store::STORAGE_KEY;
use crate::sync::{get_store_status, print_status};

/// Show record count, size and fingerprint of the stored blob.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or read.
pub fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let store = open_store(db_path, json)?;
    let status = get_store_status(&store)?;
    let location = resolve_db_path(db_path.map(PathBuf::as_path));
    let last_write = store
        .backend()
        .updated_at(STORAGE_KEY)?
        .and_then(chrono::DateTime::from_timestamp_millis);

    if json {
        let output = serde_json::json!({
            "database": location.map(|p| p.display().to_string()),
            "last_write": last_write.map(|t| t.to_rfc3339()),
            "status": status,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        if let Some(path) = location {
            println!("Database: {}", path.display());
        }
        if let Some(at) = last_write {
            println!("Last write: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        println!();
        print_status(&status);
    }
    Ok(())
}
