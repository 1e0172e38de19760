//! Conflict-aware merge of an imported batch into the current mapping.
//!
//! The whole batch is scanned before anything is decided. A single id whose
//! stored species differs from the incoming one aborts the import; otherwise
//! every entry is merged and the result is persisted once.

use serde::Serialize;

use crate::model::{EntityId, IdentificationMap, IdentificationRecord, SpeciesType};

/// One validated row of an import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub id: EntityId,
    pub species: SpeciesType,
    pub identified_at: Option<String>,
}

impl ImportEntry {
    fn to_record(&self) -> IdentificationRecord {
        IdentificationRecord {
            species: self.species,
            identified_at: self.identified_at.clone(),
        }
    }
}

/// An imported identification that disagrees with the stored one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub id: EntityId,
    pub expected: SpeciesType,
    pub got: SpeciesType,
}

/// Outcome counts of a committed merge.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Ids that were not stored before.
    pub created: usize,
    /// Same species, different timestamp.
    pub updated: usize,
    /// Identical to the stored record.
    pub unchanged: usize,
}

impl MergeStats {
    #[must_use]
    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged
    }
}

/// Every conflict between `current` and `batch`, in batch order.
#[must_use]
pub fn find_conflicts(current: &IdentificationMap, batch: &[ImportEntry]) -> Vec<Conflict> {
    batch
        .iter()
        .filter_map(|entry| {
            current
                .get(&entry.id)
                .filter(|stored| stored.species != entry.species)
                .map(|stored| Conflict {
                    id: entry.id,
                    expected: stored.species,
                    got: entry.species,
                })
        })
        .collect()
}

/// Merge `batch` into `current`, or return every conflict found.
///
/// # Errors
///
/// Returns the full conflict list if any stored species disagrees with an
/// incoming one. `current` is consumed either way; callers persist only the
/// `Ok` value.
pub fn resolve(
    mut current: IdentificationMap,
    batch: &[ImportEntry],
) -> Result<(IdentificationMap, MergeStats), Vec<Conflict>> {
    let conflicts = find_conflicts(&current, batch);
    if !conflicts.is_empty() {
        return Err(conflicts);
    }

    let mut stats = MergeStats::default();
    for entry in batch {
        let record = entry.to_record();
        match current.insert(entry.id, record.clone()) {
            None => stats.created += 1,
            Some(previous) if previous == record => stats.unchanged += 1,
            Some(_) => stats.updated += 1,
        }
    }

    Ok((current, stats))
}
