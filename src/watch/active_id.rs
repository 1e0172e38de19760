//! Active track id collaborators.
//!
//! The host surface is polled for the id it currently displays. Sources
//! return the raw text (already stripped of host markup); classification
//! into "none", "invalid" or a real id happens here.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::model::EntityId;

/// Something that can report the currently displayed track id.
pub trait ActiveIdSource {
    /// Raw displayed id, or `None` when nothing is displayed.
    fn read(&mut self) -> Option<String>;
}

/// Classified active id reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveId {
    /// Nothing displayed, empty text, or the `0` sentinel.
    None,
    /// Text that is not a number.
    Invalid(String),
    Id(EntityId),
}

impl ActiveId {
    #[must_use]
    pub fn classify(raw: Option<&str>) -> Self {
        let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::None;
        };
        match text.parse::<u64>() {
            Ok(n) => EntityId::new(n).map_or(Self::None, Self::Id),
            Err(_) => Self::Invalid(text.to_string()),
        }
    }
}

/// Reads the active id from a file that the host integration keeps updated.
///
/// The first non-blank line is used; an `ID: ` prefix is accepted and
/// stripped. A missing file means nothing is displayed.
#[derive(Debug, Clone)]
pub struct FileActiveIdSource {
    path: PathBuf,
}

impl FileActiveIdSource {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ActiveIdSource for FileActiveIdSource {
    fn read(&mut self) -> Option<String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read active id");
                return None;
            }
        };

        content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(|line| line.strip_prefix("ID:").unwrap_or(line).trim().to_string())
    }
}

/// Programmable source, shared between the loop and whoever drives it.
#[derive(Debug, Default, Clone)]
pub struct ManualActiveId {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Debug, Default)]
struct ManualState {
    value: Option<String>,
    reads: usize,
}

impl ManualActiveId {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: Option<&str>) {
        self.lock().value = value.map(String::from);
    }

    /// How many times the loop has polled this source.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ActiveIdSource for ManualActiveId {
    fn read(&mut self) -> Option<String> {
        let mut state = self.lock();
        state.reads += 1;
        state.value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_classify() {
        assert_eq!(ActiveId::classify(None), ActiveId::None);
        assert_eq!(ActiveId::classify(Some("  ")), ActiveId::None);
        assert_eq!(ActiveId::classify(Some("0")), ActiveId::None);
        assert_eq!(
            ActiveId::classify(Some("abc")),
            ActiveId::Invalid("abc".to_string())
        );
        assert_eq!(
            ActiveId::classify(Some("-3")),
            ActiveId::Invalid("-3".to_string())
        );
        assert_eq!(
            ActiveId::classify(Some(" 42 ")),
            ActiveId::Id(EntityId::new(42).unwrap())
        );
    }

    #[test]
    fn test_file_source() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("active");
        let mut source = FileActiveIdSource::new(path.clone());

        assert_eq!(source.read(), None);

        fs::write(&path, "\nID: 17\n").unwrap();
        assert_eq!(source.read().as_deref(), Some("17"));

        fs::write(&path, "23").unwrap();
        assert_eq!(source.read().as_deref(), Some("23"));
    }

    #[test]
    fn test_manual_source_counts_reads() {
        let handle = ManualActiveId::new();
        let mut source = handle.clone();
        handle.set(Some("5"));

        assert_eq!(source.read().as_deref(), Some("5"));
        assert_eq!(handle.reads(), 1);
    }
}
