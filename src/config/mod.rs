//! Configuration management.
//!
//! Resolves where the identification database lives, where backups go, and
//! how fast the watch loop ticks.
//!
//! # Layout
//!
//! - **Database**: `~/.bird-tracker/data/identifications.db`
//! - **Test database**: `~/.bird-tracker/test/identifications.db`
//! - **Backups**: CSV exports in the current directory unless overridden

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::watch::Cadence;

/// Get the global Bird Tracker directory, `~/.bird-tracker/`.
#[must_use]
pub fn global_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".bird-tracker"))
}

/// Check if test mode is enabled.
///
/// Test mode is enabled by setting `BT_TEST_DB=1` (or any non-empty value
/// other than `0`/`false`).
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("BT_TEST_DB").is_ok_and(|v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Get the test database path.
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_dir().map(|dir| dir.join("test").join("identifications.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. `explicit_path` (the `--db` flag or `BT_DB`)
/// 2. `BT_TEST_DB` set → test database
/// 3. `BIRD_TRACKER_DB` environment variable
/// 4. `~/.bird-tracker/data/identifications.db`
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_db_path();
    }

    if let Ok(db_path) = std::env::var("BIRD_TRACKER_DB") {
        if !db_path.trim().is_empty() {
            return Some(PathBuf::from(db_path));
        }
    }

    global_dir().map(|dir| dir.join("data").join("identifications.db"))
}

/// Resolve the directory backups are exported into.
///
/// Priority: `explicit_dir` (the `--backup-dir` flag), `BT_BACKUP_DIR`,
/// then the current directory.
///
/// # Errors
///
/// Returns `Config` if the current directory cannot be determined.
pub fn resolve_backup_dir(explicit_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit_dir {
        return Ok(dir.to_path_buf());
    }

    if let Ok(dir) = std::env::var("BT_BACKUP_DIR") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    std::env::current_dir()
        .map_err(|e| Error::Config(format!("Cannot determine current directory: {e}")))
}

/// Build watch cadences from millisecond settings.
///
/// # Errors
///
/// Returns `Config` if either period is zero.
pub fn resolve_cadence(fast_ms: Option<u64>, slow_ms: Option<u64>) -> Result<Cadence> {
    let defaults = Cadence::default();
    let fast = period("fast", fast_ms, defaults.fast)?;
    let slow = period("slow", slow_ms, defaults.slow)?;
    Ok(Cadence { fast, slow })
}

fn period(name: &str, millis: Option<u64>, default: Duration) -> Result<Duration> {
    match millis {
        None => Ok(default),
        Some(0) => Err(Error::Config(format!(
            "The {name} cadence must be greater than 0 ms"
        ))),
        Some(ms) => Ok(Duration::from_millis(ms)),
    }
}
