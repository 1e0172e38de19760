//! `list` command implementation.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::open_store;
use crate::error::Result;
use crate::model::{display_line, display_order, EntityId};

#[derive(Serialize)]
struct ListEntry<'a> {
    track_id: EntityId,
    identification_id: usize,
    identification_name: &'static str,
    identification_at: Option<&'a str>,
}

/// List every identification, most recent first.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let store = open_store(db_path, json)?;
    let map = store.get()?;
    let ordered = display_order(&map);

    if json {
        let entries: Vec<ListEntry<'_>> = ordered
            .iter()
            .map(|(id, record)| ListEntry {
                track_id: *id,
                identification_id: record.species.index(),
                identification_name: record.species.label(),
                identification_at: record.identified_at.as_deref(),
            })
            .collect();
        println!("{}", serde_json::to_string(&entries)?);
        return Ok(());
    }

    if ordered.is_empty() {
        println!("{}", "No identifications yet.".dimmed());
        return Ok(());
    }

    for (id, record) in ordered {
        println!("{}", display_line(id, record));
    }
    Ok(())
}
