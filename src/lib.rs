//! Bird Tracker - local species identifications for tracked birds
//!
//! This crate provides the core functionality for the `bt` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Track ids, species table and identification records
//! - [`storage`] - Key-value blob backends (SQLite, in-memory)
//! - [`store`] - The identification store and conflict-aware merge
//! - [`csv`] - Delimited text codec with an explicit column schema
//! - [`sync`] - CSV backup export/import and guarded clear
//! - [`watch`] - Cancellable sync loop behind the live panel
//! - [`config`] - Path and cadence resolution
//! - [`report`] - Channel for errors surfaced without aborting
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod csv;
pub mod error;
pub mod model;
pub mod report;
pub mod storage;
pub mod store;
pub mod sync;
pub mod validate;
pub mod watch;

pub use error::{Error, Result};
