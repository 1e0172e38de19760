//! Store status display.

use std::collections::BTreeMap;

use colored::Colorize;

use crate::error::Result;
use crate::model::display_order;
use crate::storage::BlobStore;
use crate::store::{IdentificationStore, STORAGE_KEY};
use crate::sync::hash::content_hash;
use crate::sync::types::{SpeciesCount, StoreStatus};

/// Summarize the persisted store.
///
/// # Errors
///
/// Returns an error if the backend cannot be read.
pub fn get_store_status<B: BlobStore>(store: &IdentificationStore<B>) -> Result<StoreStatus> {
    let raw = store.raw()?;
    let map = store.get()?;

    let newest = display_order(&map)
        .first()
        .and_then(|(_, rec)| rec.identified_at_parsed().map(|_| rec))
        .and_then(|rec| rec.identified_at.clone());

    let mut per_species: BTreeMap<usize, usize> = BTreeMap::new();
    for record in map.values() {
        *per_species.entry(record.species.index()).or_default() += 1;
    }
    let mut species: Vec<SpeciesCount> = per_species
        .into_iter()
        .filter_map(|(index, count)| {
            crate::model::SpeciesType::new(index).map(|s| SpeciesCount {
                index,
                label: s.label(),
                count,
            })
        })
        .collect();
    species.sort_by(|a, b| b.count.cmp(&a.count).then(a.index.cmp(&b.index)));

    Ok(StoreStatus {
        key: STORAGE_KEY,
        persisted: raw.is_some(),
        records: map.len(),
        bytes: raw.as_ref().map_or(0, String::len),
        content_hash: raw.as_deref().map(|r| content_hash(r.as_bytes())),
        newest,
        species,
    })
}

/// Print store status to stdout.
pub fn print_status(status: &StoreStatus) {
    println!("{}", "Identifications:".blue().bold());
    if !status.persisted {
        println!("  {}", "Nothing stored yet.".dimmed());
        return;
    }

    println!("  Records: {}", status.records);
    println!("  Size:    {}", format_size(status.bytes));
    if let Some(hash) = &status.content_hash {
        println!("  SHA256:  {hash}");
    }
    if let Some(newest) = &status.newest {
        println!("  Newest:  {newest}");
    }

    if !status.species.is_empty() {
        println!();
        println!("{}", "By species:".blue().bold());
        for entry in &status.species {
            println!("  {:>4}  {} ({})", entry.count, entry.label, entry.index);
        }
    }
}

/// Format a byte size as a human-readable string.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityId, SpeciesType};
    use crate::report::CollectingReporter;
    use crate::storage::MemoryBlobStore;
    use std::sync::Arc;

    #[test]
    fn test_status_empty() {
        let store = IdentificationStore::new(MemoryBlobStore::new(), Arc::new(CollectingReporter::new()));
        let status = get_store_status(&store).unwrap();
        assert!(!status.persisted);
        assert_eq!(status.records, 0);
        assert!(status.content_hash.is_none());
    }

    #[test]
    fn test_status_counts_species() {
        let mut store = IdentificationStore::new(MemoryBlobStore::new(), Arc::new(CollectingReporter::new()));
        let kite = SpeciesType::new(1).unwrap();
        store.add(EntityId::new(1).unwrap(), kite).unwrap();
        store.add(EntityId::new(2).unwrap(), kite).unwrap();
        store.add(EntityId::new(3).unwrap(), SpeciesType::new(9).unwrap()).unwrap();

        let status = get_store_status(&store).unwrap();
        assert_eq!(status.records, 3);
        assert_eq!(status.species[0].index, 1);
        assert_eq!(status.species[0].count, 2);
        assert!(status.newest.is_some());
        assert_eq!(status.content_hash.unwrap().len(), 64);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(10), "10 B");
        assert_eq!(format_size(2048), "2.0 KB");
    }
}
