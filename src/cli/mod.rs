//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Bird Tracker CLI - species identifications for tracked birds
#[derive(Parser, Debug)]
#[command(name = "bt", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.bird-tracker/data/identifications.db)
    #[arg(long, global = true, env = "BT_DB")]
    pub db: Option<PathBuf>,

    /// Directory for CSV backups (default: current directory)
    #[arg(long, global = true)]
    pub backup_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record the species of a track
    Add {
        /// Track id (positive integer)
        track_id: String,

        /// Species index or label, e.g. `2` or "Brown goshawk"
        species: String,
    },

    /// Show the identification of one track
    Show {
        /// Track id (positive integer)
        track_id: String,
    },

    /// List identifications, most recent first
    List,

    /// Print the species table
    Species,

    /// Export identifications to CSV
    Export {
        /// Output file (default: Bird_Identifier_Tracking_<millis>.csv in the backup dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import identifications from CSV
    Import {
        /// CSV file with track_id, identification_id and identification_at columns
        file: PathBuf,
    },

    /// Back up, then delete every identification
    Clear {
        /// Confirm the clear
        #[arg(long)]
        yes: bool,
    },

    /// Show storage status
    Status,

    /// Follow the active track and edit its identification
    Watch(WatchArgs),

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args, Debug)]
pub struct WatchArgs {
    /// File holding the id of the track currently displayed
    #[arg(long)]
    pub active_id_file: PathBuf,

    /// Active id poll period in milliseconds (default: 50)
    #[arg(long, env = "BT_FAST_MS")]
    pub fast_ms: Option<u64>,

    /// Listing refresh period in milliseconds (default: 200)
    #[arg(long, env = "BT_SLOW_MS")]
    pub slow_ms: Option<u64>,
}
