//! Operator probe for an enlist database.
//!
//! Loads configuration from `ENLIST_*` variables, starts file logging when a
//! log directory is configured, opens (and migrates) the database, then
//! prints health, schema and row-count lines.

use enlist_core::db::migrations::latest_version;
use enlist_core::db::open_db;
use enlist_core::{init_logging_from_config, table_counts, CoreConfig};
use log::error;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("enlist: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    let file_logging = init_logging_from_config(&config)?;

    println!("enlist_core ping={}", enlist_core::ping());
    println!("enlist_core version={}", enlist_core::core_version());
    println!("log level={} file_logging={file_logging}", config.log_level);

    let conn = open_db(&config.db_path).inspect_err(|err| {
        error!(
            "event=cli_probe module=cli status=error path={} error={err}",
            config.db_path.display()
        );
    })?;
    let counts = table_counts(&conn)?;
    println!(
        "db path={} schema_version={}",
        config.db_path.display(),
        latest_version()
    );
    println!(
        "db users={} lists={} items={} helper_links={}",
        counts.users, counts.lists, counts.items, counts.helper_links
    );
    Ok(())
}
