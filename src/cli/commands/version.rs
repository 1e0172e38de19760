//! Version command implementation.

use crate::error::Result;
use crate::model::SPECIES_COUNT;
use crate::store::STORAGE_KEY;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    storage_key: &'a str,
    species: usize,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };

    if json {
        let output = VersionOutput {
            version,
            build,
            storage_key: STORAGE_KEY,
            species: SPECIES_COUNT,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("bt version {version} ({build})");
    Ok(())
}
