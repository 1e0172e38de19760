//! UI-facing panel state.

use serde::Serialize;

use crate::model::{EntityId, SpeciesType};

/// Everything a front end needs to draw the identification panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PanelState {
    /// Track currently displayed by the host, if any.
    pub displayed_id: Option<EntityId>,
    /// Species currently chosen in the selector.
    pub selected: SpeciesType,
    /// Stored species for the displayed track, or Unknown if none.
    pub baseline: SpeciesType,
    pub editing_enabled: bool,
    pub save_enabled: bool,
    /// Stored identifications, newest first, as `[id] label` lines.
    pub listing: Vec<String>,
}

impl PanelState {
    /// Reset to "nothing displayed", keeping the listing.
    pub fn clear_selection(&mut self) {
        self.displayed_id = None;
        self.selected = SpeciesType::UNKNOWN;
        self.baseline = SpeciesType::UNKNOWN;
        self.editing_enabled = false;
        self.save_enabled = false;
    }

    /// Show a track with its stored species, or Unknown if it has none.
    pub fn show(&mut self, id: EntityId, stored: Option<SpeciesType>) {
        self.displayed_id = Some(id);
        self.selected = stored.unwrap_or(SpeciesType::UNKNOWN);
        self.baseline = self.selected;
        self.editing_enabled = true;
        self.save_enabled = stored.is_none();
    }

    /// Apply a user selection; save is enabled only for an actual change.
    pub fn select(&mut self, species: SpeciesType) {
        self.selected = species;
        self.save_enabled = species != self.baseline;
    }

    /// Mark the current selection as persisted.
    pub fn mark_saved(&mut self) {
        self.baseline = self.selected;
        self.save_enabled = false;
    }
}
