//! CLI smoke entry point.
//!
//! # Responsibility
//! - Load settings, open the store and bring its schema up to date.
//! - Print schema version and per-table row counts.
//! - Exit non-zero on any failure.

use log::error;
use std::error::Error;
use std::process::ExitCode;
use syncball_core::{core_version, init_logging, Repository, RepositoryManager, Settings};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=core status=error error={err}");
            eprintln!("syncball: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_env()?;
    if let Some(log_dir) = settings.log_dir.as_deref() {
        init_logging(&settings.log_level, log_dir)?;
    }

    let manager = if settings.is_in_memory() {
        RepositoryManager::open_in_memory()?
    } else {
        RepositoryManager::open(&settings.db_path)?
    };
    let applied = manager.migrate()?;

    println!("syncball_core version={}", core_version());
    println!(
        "schema version={} migrations_applied={applied}",
        manager.schema_version()?
    );
    for (table, rows) in [
        ("Countries", manager.countries().get_all().len()),
        ("Leagues", manager.leagues().get_all().len()),
        ("Seasons", manager.seasons().get_all().len()),
        ("Coverage", manager.coverage().get_all().len()),
        ("Teams", manager.teams().get_all().len()),
        ("Venues", manager.venues().get_all().len()),
        ("Fixtures", manager.fixtures().get_all().len()),
        ("FixtureStats", manager.fixture_stats().get_all().len()),
        ("SystemSettings", manager.system_settings().get_all().len()),
        ("InstallInfo", manager.install_info().get_all().len()),
    ] {
        println!("{table} rows={rows}");
    }
    Ok(())
}
