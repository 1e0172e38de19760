//! `add` and `show` command implementations.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::{open_store, parse_track_id};
use crate::error::Result;
use crate::model::{EntityId, IdentificationRecord};
use crate::validate::normalize_species;

#[derive(Serialize)]
struct RecordOutput<'a> {
    track_id: EntityId,
    identification_id: usize,
    identification_name: &'static str,
    identification_at: Option<&'a str>,
}

impl<'a> RecordOutput<'a> {
    fn new(track_id: EntityId, record: &'a IdentificationRecord) -> Self {
        Self {
            track_id,
            identification_id: record.species.index(),
            identification_name: record.species.label(),
            identification_at: record.identified_at.as_deref(),
        }
    }
}

/// Record `species` for `track_id`, replacing any earlier identification.
///
/// # Errors
///
/// Returns `InvalidArgument` for a bad track id, `UnknownSpecies` for an
/// unrecognized species, or a storage error.
pub fn execute_add(track_id: &str, species: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let id = parse_track_id(track_id)?;
    let species = normalize_species(species)?;

    let mut store = open_store(db_path, json)?;
    let record = store.add(id, species)?;

    if json {
        println!("{}", serde_json::to_string(&RecordOutput::new(id, &record))?);
    } else {
        println!(
            "{} [{id}] {} ({})",
            "Saved".green().bold(),
            species.label(),
            species.index()
        );
    }
    Ok(())
}

/// Print the identification of `track_id`.
///
/// # Errors
///
/// Returns `InvalidArgument` for a bad track id or a storage error. A track
/// with no identification is not an error.
pub fn execute_show(track_id: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let id = parse_track_id(track_id)?;
    let store = open_store(db_path, json)?;
    let record = store.lookup(id)?;

    match (record, json) {
        (Some(record), true) => {
            println!("{}", serde_json::to_string(&RecordOutput::new(id, &record))?);
        }
        (None, true) => {
            println!("{}", serde_json::json!({ "track_id": id, "identification": null }));
        }
        (Some(record), false) => {
            println!("[{id}] {} ({})", record.species.label(), record.species.index());
            if let Some(at) = &record.identified_at {
                println!("  Identified at: {at}");
            }
        }
        (None, false) => {
            println!("[{id}] {}", "not identified".dimmed());
        }
    }
    Ok(())
}
