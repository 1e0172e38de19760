//! Command implementations.

pub mod completions;
pub mod identify;
pub mod list;
pub mod species;
pub mod status;
pub mod sync;
pub mod version;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::model::EntityId;
use crate::report::StderrReporter;
use crate::storage::SqliteBlobStore;
use crate::store::IdentificationStore;

/// Open the identification store at the resolved database path.
///
/// The database file is created on first use.
pub(crate) fn open_store(
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<IdentificationStore<SqliteBlobStore>> {
    let path = resolve_db_path(db_path.map(PathBuf::as_path)).ok_or_else(|| {
        Error::Config("Cannot determine home directory; pass --db".to_string())
    })?;
    let backend = SqliteBlobStore::open(&path)?;
    Ok(IdentificationStore::new(
        backend,
        Arc::new(StderrReporter::new(json)),
    ))
}

/// Parse a track id argument.
pub(crate) fn parse_track_id(raw: &str) -> Result<EntityId> {
    EntityId::parse(raw.trim()).ok_or_else(|| {
        Error::InvalidArgument(format!("track id must be a positive integer, got '{raw}'"))
    })
}
