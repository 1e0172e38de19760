//! Data models for identifications and the species table.

pub mod identification;
pub mod species;

pub use identification::{
    display_line, display_order, now_timestamp, EntityId, IdentificationMap, IdentificationRecord,
};
pub use species::{SpeciesType, LABELS, SPECIES_COUNT};
