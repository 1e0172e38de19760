//! Live identification panel.
//!
//! A [`SyncLoop`] keeps a [`PanelState`] in step with the host surface and
//! the store on two cadences:
//!
//! - **fast**: poll the active track id and load its stored species
//! - **slow**: rebuild the listing of every stored identification
//!
//! User actions (select, save, export, import) arrive on a channel and are
//! applied between ticks. [`drive`] runs everything on the calling task, so
//! a tick always finishes before the next tick or action starts.
//!
//! # Cancellation
//!
//! Each loop carries the [`LoopToken`] it was bootstrapped with. Once a newer
//! bootstrap happens, the next tick returns [`TickOutcome::Superseded`]
//! without touching the panel and [`drive`] returns. User actions on a
//! superseded loop are refused the same way: they neither change the panel
//! nor write the store.

mod active_id;
mod panel;
mod token;

pub use active_id::{ActiveId, ActiveIdSource, FileActiveIdSource, ManualActiveId};
pub use panel::PanelState;
pub use token::{LoopToken, VersionCell};

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{display_line, display_order, EntityId, IdentificationRecord, SpeciesType};
use crate::storage::BlobStore;
use crate::store::IdentificationStore;
use crate::sync::{content_hash, has_changed, ExportStats, Exporter, ImportStats, Importer};

/// Default fast cadence in milliseconds.
pub const DEFAULT_FAST_MS: u64 = 50;
/// Default slow cadence in milliseconds.
pub const DEFAULT_SLOW_MS: u64 = 200;

/// Whether a tick ran or found its loop superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Superseded,
}

/// Tick periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub fast: Duration,
    pub slow: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            fast: Duration::from_millis(DEFAULT_FAST_MS),
            slow: Duration::from_millis(DEFAULT_SLOW_MS),
        }
    }
}

/// User action delivered to a running loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Select(SpeciesType),
    Save,
    /// Export a backup into this directory.
    Export(PathBuf),
    Import(PathBuf),
    Quit,
}

/// Why [`drive`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Superseded,
    Quit,
}

/// Something the front end may want to show.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LoopEvent {
    Panel(PanelState),
    Saved {
        id: EntityId,
        record: IdentificationRecord,
    },
    Exported(ExportStats),
    Imported(ImportStats),
}

/// Panel state plus the collaborators that feed it.
pub struct SyncLoop<B, A> {
    token: LoopToken,
    store: IdentificationStore<B>,
    source: A,
    state: PanelState,
    /// Last raw active id reading; `None` until the first fast tick.
    last_raw: Option<Option<String>>,
    /// Fingerprint of the blob the listing was built from.
    listing_hash: Option<String>,
}

impl<B: BlobStore, A: ActiveIdSource> SyncLoop<B, A> {
    #[must_use]
    pub fn new(token: LoopToken, store: IdentificationStore<B>, source: A) -> Self {
        Self {
            token,
            store,
            source,
            state: PanelState::default(),
            last_raw: None,
            listing_hash: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    #[must_use]
    pub fn store(&self) -> &IdentificationStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut IdentificationStore<B> {
        &mut self.store
    }

    #[must_use]
    pub fn token(&self) -> &LoopToken {
        &self.token
    }

    /// Poll the active id and update the displayed track.
    ///
    /// An unchanged reading does nothing and does not touch the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. The reading is then
    /// retried on the next tick.
    pub fn fast_tick(&mut self) -> Result<TickOutcome> {
        if !self.token.is_current() {
            return Ok(TickOutcome::Superseded);
        }

        let raw = self.source.read();
        if self.last_raw.as_ref() == Some(&raw) {
            return Ok(TickOutcome::Continue);
        }

        match ActiveId::classify(raw.as_deref()) {
            ActiveId::None => {
                debug!("no active id");
                self.state.clear_selection();
            }
            ActiveId::Invalid(text) => {
                debug!(raw = %text, "invalid active id");
                self.store.reporter().report(&Error::InvalidActiveId { raw: text });
                self.state.clear_selection();
            }
            ActiveId::Id(id) => {
                let stored = self.store.lookup(id)?.map(|record| record.species);
                debug!(track_id = %id, ?stored, "new active id");
                self.state.show(id, stored);
            }
        }

        self.last_raw = Some(raw);
        Ok(TickOutcome::Continue)
    }

    /// Rebuild the listing from the whole store.
    ///
    /// Skipped while the persisted blob is byte-for-byte unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn slow_tick(&mut self) -> Result<TickOutcome> {
        if !self.token.is_current() {
            return Ok(TickOutcome::Superseded);
        }

        let raw = self.store.raw()?;
        let hash = content_hash(raw.as_deref().unwrap_or_default().as_bytes());
        if !has_changed(&hash, self.listing_hash.as_deref()) {
            return Ok(TickOutcome::Continue);
        }

        let map = self.store.get()?;
        self.state.listing = display_order(&map)
            .into_iter()
            .map(|(id, record)| display_line(id, record))
            .collect();
        self.listing_hash = Some(hash);
        Ok(TickOutcome::Continue)
    }

    /// Fail with `LoopSuperseded` once a newer bootstrap has happened.
    fn ensure_current(&self) -> Result<()> {
        if self.token.is_current() {
            Ok(())
        } else {
            Err(Error::LoopSuperseded {
                version: self.token.version(),
            })
        }
    }

    /// Change the selected species. Ignored unless a track is displayed and
    /// the loop is still current.
    pub fn select(&mut self, species: SpeciesType) -> bool {
        if !self.token.is_current() {
            debug!(%species, "selection ignored, loop superseded");
            return false;
        }
        if !self.state.editing_enabled {
            debug!(%species, "selection ignored, no active id");
            return false;
        }
        self.state.select(species);
        true
    }

    /// Persist the selection for the displayed track.
    ///
    /// Saving the species already stored is allowed and refreshes its time.
    ///
    /// # Errors
    ///
    /// Returns `LoopSuperseded` on a stale loop, `InvalidActiveId` if no
    /// track is displayed, or a storage error.
    pub fn save(&mut self) -> Result<(EntityId, IdentificationRecord)> {
        self.ensure_current()?;
        let Some(id) = self.state.displayed_id else {
            let raw = self.last_raw.clone().flatten().unwrap_or_default();
            return Err(Error::InvalidActiveId { raw });
        };

        let record = self.store.add(id, self.state.selected)?;
        self.state.mark_saved();
        Ok((id, record))
    }

    /// Export a backup of the store into `dir`.
    ///
    /// # Errors
    ///
    /// Returns `LoopSuperseded` on a stale loop, or an error if the file
    /// cannot be written.
    pub fn export(&self, dir: &Path) -> Result<ExportStats> {
        self.ensure_current()?;
        Exporter::new(&self.store).export_into_dir(dir)
    }

    /// Import a CSV file, then reload the displayed track.
    ///
    /// # Errors
    ///
    /// Returns `LoopSuperseded` on a stale loop, `ImportConflict` or an I/O
    /// error; the store is unchanged then.
    pub fn import(&mut self, path: &Path) -> Result<ImportStats> {
        self.ensure_current()?;
        let stats = Importer::new(&mut self.store).import_file(path)?;
        self.last_raw = None;
        Ok(stats)
    }

    /// Apply one user action. A superseded loop applies nothing.
    fn apply(&mut self, action: Action) -> Result<(TickOutcome, Option<LoopEvent>)> {
        if !self.token.is_current() {
            debug!(?action, "action dropped, loop superseded");
            return Ok((TickOutcome::Superseded, None));
        }

        let event = match action {
            Action::Select(species) => {
                self.select(species);
                None
            }
            Action::Save => {
                let (id, record) = self.save()?;
                Some(LoopEvent::Saved { id, record })
            }
            Action::Export(dir) => Some(LoopEvent::Exported(self.export(&dir)?)),
            Action::Import(path) => Some(LoopEvent::Imported(self.import(&path)?)),
            Action::Quit => None,
        };
        Ok((TickOutcome::Continue, event))
    }
}

/// Run `sync` until it is superseded or a [`Action::Quit`] arrives.
///
/// Tick and action errors go to the store's reporter and the loop carries
/// on. `on_event` sees every panel change and the result of each action.
///
/// # Errors
///
/// Currently always returns `Ok`; the signature leaves room for fatal
/// failures.
pub async fn drive<B, A, F>(
    sync: &mut SyncLoop<B, A>,
    cadence: Cadence,
    actions: &mut mpsc::Receiver<Action>,
    mut on_event: F,
) -> Result<StopReason>
where
    B: BlobStore,
    A: ActiveIdSource,
    F: FnMut(LoopEvent),
{
    let mut fast = time::interval(cadence.fast);
    fast.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut slow = time::interval(cadence.slow);
    slow.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut actions_open = true;

    info!(
        version = sync.token().version(),
        fast_ms = cadence.fast.as_millis(),
        slow_ms = cadence.slow.as_millis(),
        "watch loop started"
    );

    loop {
        let before = sync.state().clone();

        let result = tokio::select! {
            biased;
            _ = fast.tick() => sync.fast_tick().map(|outcome| (outcome, None)),
            _ = slow.tick() => sync.slow_tick().map(|outcome| (outcome, None)),
            action = actions.recv(), if actions_open => match action {
                Some(Action::Quit) => {
                    info!("watch loop stopped by user");
                    return Ok(StopReason::Quit);
                }
                Some(action) => sync.apply(action),
                None => {
                    debug!("action channel closed");
                    actions_open = false;
                    Ok((TickOutcome::Continue, None))
                }
            },
        };

        match result {
            Ok((TickOutcome::Superseded, _)) => {
                info!(version = sync.token().version(), "watch loop superseded");
                return Ok(StopReason::Superseded);
            }
            Ok((TickOutcome::Continue, event)) => {
                if sync.state() != &before {
                    on_event(LoopEvent::Panel(sync.state().clone()));
                }
                if let Some(event) = event {
                    on_event(event);
                }
            }
            Err(err) => {
                sync.store().reporter().report(&err);
                if sync.state() != &before {
                    on_event(LoopEvent::Panel(sync.state().clone()));
                }
            }
        }
    }
}
