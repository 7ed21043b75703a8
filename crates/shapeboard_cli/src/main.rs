//! Command-line host for the shape board.
//!
//! # Responsibility
//! - Open the device-local store, apply one command, print the rendered board.
//! - Keep output deterministic apart from generated colors.

use clap::{Parser, Subcommand};
use log::info;
use shapeboard_core::{
    default_log_level, init_logging, MemoryView, Reconciler, ShapeId, ShapeKind, SqliteStorage,
    Store, StoreError,
};
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "shapeboard", version, about = "Shape counter board")]
struct Cli {
    /// SQLite file holding the board state.
    #[arg(long, env = "SHAPEBOARD_DB", default_value = "shapeboard.sqlite3")]
    db: PathBuf,
    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "SHAPEBOARD_LOG_DIR")]
    log_dir: Option<String>,
    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a shape (`square` or `circle`).
    Add { kind: String },
    /// Remove a shape by id.
    Remove { id: ShapeId },
    /// Give every shape of a kind a new color.
    Recolor { kind: String },
    /// Print the board.
    Show,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli, &mut std::io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("shapeboard: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(&cli.log_level, log_dir)?;
    }

    let store = Store::open(SqliteStorage::open(&cli.db)?);
    let (board, _subscription) = Reconciler::new(MemoryView::new()).attach(&store);

    let message = apply(&store, &cli.command)?;
    info!("event=cli_command module=cli status=ok command={:?}", cli.command);

    if let Some(message) = message {
        writeln!(out, "{message}")?;
    }
    for line in board.borrow().view().render_lines() {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn apply(store: &Store, command: &Command) -> Result<Option<String>, StoreError> {
    let message = match command {
        Command::Add { kind } => {
            let id = store.create(kind.parse::<ShapeKind>()?)?;
            format!("added {kind} #{id}")
        }
        Command::Remove { id } => {
            if store.remove(*id)? {
                format!("removed #{id}")
            } else {
                format!("no shape #{id}")
            }
        }
        Command::Recolor { kind } => {
            if store.recolor(kind.parse::<ShapeKind>()?)? {
                format!("recolored {kind}s")
            } else {
                format!("no {kind}s to recolor")
            }
        }
        Command::Show => return Ok(None),
    };
    Ok(Some(message))
}
