//! Error types for the Bird Tracker CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=storage, 4=validation, 6=import, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

use crate::model::SPECIES_COUNT;
use crate::store::Conflict;

/// Result type alias for Bird Tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Storage (exit 2)
    StorageCorrupt,
    DatabaseError,

    // Validation (exit 4)
    SchemaViolation,
    InvalidActiveId,
    UnknownSpecies,
    InvalidArgument,
    ClearNotConfirmed,

    // Import (exit 6)
    ImportConflict,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    LoopSuperseded,
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::StorageCorrupt => "STORAGE_CORRUPT",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::SchemaViolation => "SCHEMA_VIOLATION",
            Self::InvalidActiveId => "INVALID_ACTIVE_ID",
            Self::UnknownSpecies => "UNKNOWN_SPECIES",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ClearNotConfirmed => "CLEAR_NOT_CONFIRMED",
            Self::ImportConflict => "IMPORT_CONFLICT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::LoopSuperseded => "LOOP_SUPERSEDED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::LoopSuperseded | Self::InternalError => 1,
            Self::StorageCorrupt | Self::DatabaseError => 2,
            Self::SchemaViolation
            | Self::InvalidActiveId
            | Self::UnknownSpecies
            | Self::InvalidArgument
            | Self::ClearNotConfirmed => 4,
            Self::ImportConflict => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether re-running with corrected input can succeed.
    ///
    /// Nothing is retried automatically; this only tells the operator
    /// (or a wrapping script) that the input was at fault.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SchemaViolation
                | Self::InvalidActiveId
                | Self::UnknownSpecies
                | Self::InvalidArgument
                | Self::ClearNotConfirmed
                | Self::ImportConflict
                | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Bird Tracker operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid local storage [{raw}]")]
    StorageCorrupt { raw: String },

    #[error("CSV missing required columns ({}): missing {}", expected.join(","), missing.join(","))]
    SchemaViolation {
        expected: Vec<String>,
        missing: Vec<String>,
    },

    #[error("Aborting import, found {} conflicting identification value(s)", conflicts.len())]
    ImportConflict { conflicts: Vec<Conflict> },

    #[error("Unexpected non number id ({raw})")]
    InvalidActiveId { raw: String },

    #[error("Unknown species: {input}")]
    UnknownSpecies {
        input: String,
        suggestion: Option<String>,
    },

    #[error("Refusing to clear identifications without confirmation")]
    ClearNotConfirmed,

    #[error("Watch loop {version} was superseded by a newer one")]
    LoopSuperseded { version: u64 },

    #[error("Export target already exists: {path}")]
    ExportExists { path: PathBuf },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::StorageCorrupt { .. } => ErrorCode::StorageCorrupt,
            Self::SchemaViolation { .. } => ErrorCode::SchemaViolation,
            Self::ImportConflict { .. } => ErrorCode::ImportConflict,
            Self::InvalidActiveId { .. } => ErrorCode::InvalidActiveId,
            Self::UnknownSpecies { .. } => ErrorCode::UnknownSpecies,
            Self::ClearNotConfirmed => ErrorCode::ClearNotConfirmed,
            Self::LoopSuperseded { .. } => ErrorCode::LoopSuperseded,
            Self::ExportExists { .. } | Self::Io(_) => ErrorCode::IoError,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::StorageCorrupt { .. } => Some(
                "Stored identifications could not be read and are treated as empty. \
                 Restore a backup with `bt import <file>`."
                    .to_string(),
            ),

            Self::SchemaViolation { expected, .. } => Some(format!(
                "The first line of the file must be a header containing: {}",
                expected.join(",")
            )),

            Self::ImportConflict { conflicts } => Some(conflict_report(conflicts)),

            Self::InvalidActiveId { .. } => {
                Some("The active track id must be a positive integer.".to_string())
            }

            Self::UnknownSpecies { input, suggestion } => match suggestion {
                Some(s) => Some(format!("Did you mean: {s}? Use `bt species` to list labels.")),
                None if input.trim().parse::<usize>().is_ok() => Some(format!(
                    "Species indices run from 0 to {}. Use `bt species` to list them.",
                    SPECIES_COUNT - 1
                )),
                None => Some("Use `bt species` to list valid indices and labels.".to_string()),
            },

            Self::ClearNotConfirmed => Some(
                "A backup CSV is written before clearing. Re-run with `--yes` to proceed."
                    .to_string(),
            ),

            Self::LoopSuperseded { .. } => {
                Some("Actions go to the most recently started watch loop.".to_string())
            }

            Self::ExportExists { path } => Some(format!(
                "Choose another `--output` path or remove {}",
                path.display()
            )),

            Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Self::ImportConflict { conflicts } = self {
            obj["error"]["conflicts"] = serde_json::json!(conflicts);
        }

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

/// Render every conflict as a human-readable block.
#[must_use]
pub fn conflict_report(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(|c| {
            format!(
                "[track_id={}]\nexpected [identification_id={}]\ngot [identification_id={}]",
                c.id, c.expected, c.got
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityId, SpeciesType};

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::ClearNotConfirmed.exit_code(), 4);
        assert_eq!(
            Error::StorageCorrupt { raw: "x".into() }.exit_code(),
            2
        );
        assert_eq!(
            Error::ImportConflict { conflicts: vec![] }.exit_code(),
            6
        );
    }

    #[test]
    fn test_unknown_species_hint_wording() {
        let suggested = Error::UnknownSpecies {
            input: "magpy".into(),
            suggestion: Some("Magpie-lark".into()),
        };
        assert_eq!(
            suggested.hint().unwrap(),
            "Did you mean: Magpie-lark? Use `bt species` to list labels."
        );

        let out_of_range = Error::UnknownSpecies {
            input: " 99 ".into(),
            suggestion: None,
        };
        assert_eq!(
            out_of_range.hint().unwrap(),
            "Species indices run from 0 to 73. Use `bt species` to list them."
        );

        let unmatched = Error::UnknownSpecies {
            input: "zzz".into(),
            suggestion: None,
        };
        assert!(unmatched.hint().unwrap().starts_with("Use `bt species`"));
    }

    #[test]
    fn test_conflict_report_lists_every_conflict() {
        let conflicts = vec![
            Conflict {
                id: EntityId::new(5).unwrap(),
                expected: SpeciesType::new(2).unwrap(),
                got: SpeciesType::new(3).unwrap(),
            },
            Conflict {
                id: EntityId::new(9).unwrap(),
                expected: SpeciesType::new(1).unwrap(),
                got: SpeciesType::new(0).unwrap(),
            },
        ];
        let report = conflict_report(&conflicts);
        assert!(report.contains("[track_id=5]\nexpected [identification_id=2]\ngot [identification_id=3]"));
        assert!(report.contains("[track_id=9]"));
    }

    #[test]
    fn test_structured_json_includes_conflicts() {
        let err = Error::ImportConflict {
            conflicts: vec![Conflict {
                id: EntityId::new(5).unwrap(),
                expected: SpeciesType::new(2).unwrap(),
                got: SpeciesType::new(3).unwrap(),
            }],
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "IMPORT_CONFLICT");
        assert_eq!(json["error"]["conflicts"][0]["id"], 5);
        assert_eq!(json["error"]["conflicts"][0]["expected"], "2");
        assert!(json["error"]["hint"].is_string());
    }
}
