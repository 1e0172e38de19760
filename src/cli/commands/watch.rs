//! `watch` command implementation.
//!
//! Runs the sync loop on a current-thread runtime. The active track id is
//! read from a file kept up to date by the host integration; user actions
//! come from stdin, one per line:
//!
//! ```text
//! select <species>   choose a species by index or label
//! save               store the selection for the active track
//! export             write a CSV backup into the backup dir
//! import <file>      merge a CSV file
//! quit               stop watching
//! ```
//!
//! End of input stops the loop like `quit`.

use std::path::{Path, PathBuf};

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use super::open_store;
use crate::cli::WatchArgs;
use crate::config::{resolve_backup_dir, resolve_cadence};
use crate::error::{Error, Result};
use crate::report::{Reporter, StderrReporter};
use crate::validate::normalize_species;
use crate::watch::{
    drive, Action, FileActiveIdSource, LoopEvent, PanelState, StopReason, SyncLoop, VersionCell,
};

/// Execute the watch command.
///
/// # Errors
///
/// Returns `Config` for a zero cadence, or an error if the store or the
/// runtime cannot be set up.
pub fn execute(
    args: &WatchArgs,
    backup_dir: Option<&Path>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let cadence = resolve_cadence(args.fast_ms, args.slow_ms)?;
    let backup_dir = resolve_backup_dir(backup_dir)?;
    let store = open_store(db_path, json)?;
    let source = FileActiveIdSource::new(args.active_id_file.clone());

    let versions = VersionCell::new();
    let mut sync = SyncLoop::new(versions.bootstrap(), store, source);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let stopped = rt.block_on(async {
        let (tx, mut rx) = mpsc::channel(16);
        let reader = tokio::spawn(read_actions(tx, backup_dir, json));

        let mut printer = EventPrinter::new(json);
        let stopped = drive(&mut sync, cadence, &mut rx, |event| printer.print(&event)).await;

        reader.abort();
        stopped
    });
    // Stdin reads run on a blocking thread that cannot be interrupted.
    rt.shutdown_background();

    match stopped? {
        StopReason::Quit => debug!("watch finished"),
        StopReason::Superseded => debug!("watch superseded"),
    }
    Ok(())
}

/// Turn stdin lines into actions until end of input or `quit`.
async fn read_actions(tx: mpsc::Sender<Action>, backup_dir: PathBuf, json: bool) {
    let reporter = StderrReporter::new(json);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                reporter.report(&Error::Io(e));
                break;
            }
        };

        match parse_action(&line, &backup_dir) {
            Ok(None) => {}
            Ok(Some(action)) => {
                let quit = action == Action::Quit;
                if tx.send(action).await.is_err() || quit {
                    return;
                }
            }
            Err(e) => reporter.report(&e),
        }
    }

    let _ = tx.send(Action::Quit).await;
}

/// Parse one input line. Blank lines yield no action.
pub(crate) fn parse_action(line: &str, backup_dir: &Path) -> Result<Option<Action>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(c, r)| (c, r.trim()));

    let action = match command.to_lowercase().as_str() {
        "select" if !rest.is_empty() => Action::Select(normalize_species(rest)?),
        "save" => Action::Save,
        "export" => Action::Export(backup_dir.to_path_buf()),
        "import" if !rest.is_empty() => Action::Import(PathBuf::from(rest)),
        "quit" | "q" | "exit" => Action::Quit,
        _ => {
            return Err(Error::InvalidArgument(format!(
                "unrecognized input '{line}'; expected select <species>, save, export, import <file> or quit"
            )));
        }
    };
    Ok(Some(action))
}

/// Prints loop events, skipping listings that did not change.
struct EventPrinter {
    json: bool,
    last_listing: Option<Vec<String>>,
}

impl EventPrinter {
    fn new(json: bool) -> Self {
        Self {
            json,
            last_listing: None,
        }
    }

    fn print(&mut self, event: &LoopEvent) {
        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => debug!(error = %e, "cannot serialize watch event"),
            }
            return;
        }

        match event {
            LoopEvent::Panel(state) => self.print_panel(state),
            LoopEvent::Saved { id, record } => {
                println!("{} [{id}] {}", "Saved".green().bold(), record.species.label());
            }
            LoopEvent::Exported(stats) => {
                println!(
                    "{} {} records to {}",
                    "Exported".green().bold(),
                    stats.records,
                    stats.path.display()
                );
            }
            LoopEvent::Imported(stats) => {
                println!(
                    "{} {} created, {} updated, {} unchanged",
                    "Imported".green().bold(),
                    stats.merge.created,
                    stats.merge.updated,
                    stats.merge.unchanged
                );
            }
        }
    }

    fn print_panel(&mut self, state: &PanelState) {
        match state.displayed_id {
            Some(id) => {
                let marker = if state.save_enabled {
                    " (unsaved)".yellow().to_string()
                } else {
                    String::new()
                };
                println!(
                    "{} [{id}] {} ({}){marker}",
                    "Active:".blue().bold(),
                    state.selected.label(),
                    state.selected.index()
                );
            }
            None => println!("{} {}", "Active:".blue().bold(), "none".dimmed()),
        }

        if self.last_listing.as_ref() != Some(&state.listing) {
            println!("{}", "Identifications:".blue().bold());
            for line in &state.listing {
                println!("  {line}");
            }
            self.last_listing = Some(state.listing.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpeciesType;

    #[test]
    fn test_parse_action() {
        let dir = Path::new("/tmp/backups");

        assert_eq!(parse_action("   ", dir).unwrap(), None);
        assert_eq!(parse_action("save", dir).unwrap(), Some(Action::Save));
        assert_eq!(parse_action("QUIT", dir).unwrap(), Some(Action::Quit));
        assert_eq!(
            parse_action("select Brown goshawk", dir).unwrap(),
            Some(Action::Select(SpeciesType::new(2).unwrap()))
        );
        assert_eq!(
            parse_action("select 69", dir).unwrap(),
            Some(Action::Select(SpeciesType::new(69).unwrap()))
        );
        assert_eq!(
            parse_action("export", dir).unwrap(),
            Some(Action::Export(dir.to_path_buf()))
        );
        assert_eq!(
            parse_action("import ids.csv", dir).unwrap(),
            Some(Action::Import(PathBuf::from("ids.csv")))
        );
    }

    #[test]
    fn test_parse_action_errors() {
        let dir = Path::new("/tmp");
        assert!(matches!(
            parse_action("select dragon", dir),
            Err(Error::UnknownSpecies { .. })
        ));
        assert!(matches!(parse_action("select", dir), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse_action("fly", dir), Err(Error::InvalidArgument(_))));
    }
}
