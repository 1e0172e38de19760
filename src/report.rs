//! Reported-error channel.
//!
//! Some failures must reach the operator without aborting the operation
//! that found them: a corrupt blob still yields an empty store, an invalid
//! active id still resets the panel. Those go through a [`Reporter`].

use std::sync::{Mutex, PoisonError};

use colored::Colorize;

use crate::error::{Error, ErrorCode};

/// Sink for errors that are surfaced but not propagated.
pub trait Reporter {
    fn report(&self, error: &Error);
}

/// Prints reports to stderr, as text or structured JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrReporter {
    json: bool,
}

impl StderrReporter {
    #[must_use]
    pub const fn new(json: bool) -> Self {
        Self { json }
    }
}

impl Reporter for StderrReporter {
    fn report(&self, error: &Error) {
        tracing::warn!(code = error.error_code().as_str(), "{error}");

        if self.json {
            eprintln!("{}", error.to_structured_json());
        } else if let Some(hint) = error.hint() {
            eprintln!("{} {error}\n  Hint: {hint}", "Error:".red().bold());
        } else {
            eprintln!("{} {error}", "Error:".red().bold());
        }
    }
}

/// One captured report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub code: ErrorCode,
    pub message: String,
}

/// Keeps every report in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<Report>>,
}

impl CollectingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of reports received so far.
    #[must_use]
    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Codes of reports received so far, in order.
    #[must_use]
    pub fn codes(&self) -> Vec<ErrorCode> {
        self.reports().into_iter().map(|r| r.code).collect()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, error: &Error) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Report {
                code: error.error_code(),
                message: error.to_string(),
            });
    }
}
