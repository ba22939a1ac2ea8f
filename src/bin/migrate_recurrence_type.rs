//! One-time command that migrates recurrence transaction types.
//!
//! Safe to run on every upgrade: the first run does the work and records
//! completion, later runs report that and exit. The command always exits with
//! code 0, errors are logged rather than signalled through the exit code.

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::filter;

use emberbook::{initialize_db, migrate_recurrence_types};

/// Migrate the transaction type of recurring transactions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// Force the execution of this command.
    #[arg(short = 'F', long)]
    force: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(filter::LevelFilter::INFO)
        .init();

    let args = Args::parse();

    if let Err(error) = run(&args) {
        tracing::error!("The recurrence type migration failed: {error}");
    }
}

fn run(args: &Args) -> Result<(), emberbook::Error> {
    let connection = Connection::open(&args.db_path)?;
    initialize_db(&connection)?;

    let summary = migrate_recurrence_types(args.force, &connection)?;

    if summary.already_executed {
        tracing::info!("This command has already been executed.");
    } else {
        tracing::info!("Migrated {} recurrence(s).", summary.migrated);
    }

    Ok(())
}
