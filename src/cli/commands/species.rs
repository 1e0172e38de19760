//! `species` command implementation.

use serde::Serialize;

use crate::error::Result;
use crate::model::SpeciesType;

#[derive(Serialize)]
struct SpeciesEntry {
    index: usize,
    label: &'static str,
}

/// Print the fixed species table.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    if json {
        let entries: Vec<SpeciesEntry> = SpeciesType::all()
            .map(|s| SpeciesEntry {
                index: s.index(),
                label: s.label(),
            })
            .collect();
        println!("{}", serde_json::to_string(&entries)?);
        return Ok(());
    }

    for species in SpeciesType::all() {
        println!("{:>3}  {}", species.index(), species.label());
    }
    Ok(())
}
