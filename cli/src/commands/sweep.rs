//! Sweep command implementation
//!
//! Deletes stale query records from a SQLite database.

use std::path::Path;

use quarry::sqlite::{QUERY_RECORDS, SqliteConnection};
use quarry::{Engine, QuarryConfig};

use crate::error::CliError;
use crate::output;

fn sweep(config: &QuarryConfig, database: &Path) -> quarry::Result<usize> {
    let conn = SqliteConnection::open(database)?;
    conn.execute_batch(QUERY_RECORDS)?;
    let engine = Engine::from_config(config, &conn, conn.records());
    engine.sweep()
}

/// Run the sweep command
pub fn run(config: &QuarryConfig, database: &Path) -> Result<(), CliError> {
    if !database.exists() {
        return Err(CliError::Other(format!(
            "database not found: {}",
            database.display()
        )));
    }
    println!("{}", output::info(&format!("Sweeping {}", database.display())));
    let removed = sweep(config, database)?;
    println!(
        "{}",
        output::success(&format!("Removed {removed} stale query record(s)"))
    );
    Ok(())
}
