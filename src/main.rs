mod cli;
mod config;
mod db;
mod error;
mod models;
mod projector;
mod state;
mod store;
mod timer;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::SqliteStore;
use store::Store;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Migrations run on every startup
    let store = SqliteStore::new(conn)?;
    log::debug!("Using database at {:?}", db_path);

    match cli.command {
        Some(Commands::Setup {
            reset,
            name,
            roll,
            username,
        }) => {
            handlers::handle_setup(&store, &mut config, reset, name, roll, username)?;
        }

        // Explicit subcommands: check setup first
        Some(cmd) => {
            ensure_setup(&store, &mut config)?;
            match cmd {
                Commands::Subject { action } => handlers::handle_subject(&store, &action)?,
                Commands::Slot { action } => handlers::handle_slot(&store, &action)?,
                Commands::Timetable { action } => handlers::handle_timetable(&store, &action)?,
                Commands::Today => handlers::handle_today(&store)?,
                Commands::Mark {
                    subject,
                    slot,
                    absent,
                    date,
                } => handlers::handle_mark(&store, &subject, &slot, absent, date.as_deref())?,
                Commands::Bunk { subject, target } => {
                    handlers::handle_bunk(&store, &config, subject.as_deref(), target)?
                }
                Commands::Stats => handlers::handle_stats(&store, &config)?,
                Commands::Study { action } => handlers::handle_study(&store, &config, &action)?,
                Commands::Export => handlers::handle_export(&store)?,
                Commands::Import { file } => handlers::handle_import(&store, &file)?,
                Commands::Setup { .. } => unreachable!(),
            }
        }

        // No subcommand → launch TUI
        None => {
            ensure_setup(&store, &mut config)?;
            tui::app::run(&store, config, None)?;
        }
    }

    Ok(())
}

/// Check if setup has been done; if not, run it first.
fn ensure_setup(store: &dyn Store, config: &mut AppConfig) -> Result<()> {
    if !store.is_setup_done()? {
        eprintln!("No profile found. Running setup...");
        eprintln!();
        handlers::handle_setup(store, config, false, None, None, None)?;
    }
    Ok(())
}
