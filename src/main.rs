//! Bird Tracker CLI entry point.

use bt::cli::commands;
use bt::cli::{Cli, Commands};
use bt::error::Error;
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("{} {e}\n  Hint: {hint}", "Error:".red().bold());
                } else {
                    eprintln!("{} {e}", "Error:".red().bold());
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let db = cli.db.as_ref();
    let backup_dir = cli.backup_dir.as_deref();

    match &cli.command {
        Commands::Add { track_id, species } => {
            commands::identify::execute_add(track_id, species, db, json)
        }
        Commands::Show { track_id } => commands::identify::execute_show(track_id, db, json),
        Commands::List => commands::list::execute(db, json),
        Commands::Species => commands::species::execute(json),

        // Backups
        Commands::Export { output } => {
            commands::sync::execute_export(output.as_deref(), backup_dir, db, json)
        }
        Commands::Import { file } => commands::sync::execute_import(file, db, json),
        Commands::Clear { yes } => commands::sync::execute_clear(*yes, backup_dir, db, json),

        Commands::Status => commands::status::execute(db, json),
        Commands::Watch(args) => commands::watch::execute(args, backup_dir, db, json),
        Commands::Version => commands::version::execute(json),
        Commands::Completions { shell } => commands::completions::execute(*shell),
    }
}
