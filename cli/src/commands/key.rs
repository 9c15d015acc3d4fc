//! Key command implementation
//!
//! Prints the canonical serialization used as a query's record key.

use quarry::QuarryConfig;

use crate::error::CliError;
use crate::params::parse_params;

/// Canonical key for `model` with the raw `-p` arguments.
pub fn record_key(config: &QuarryConfig, model: &str, args: &[String]) -> Result<String, CliError> {
    let planner = config.planner();
    let spec = planner
        .construct_named(model, parse_params(args)?)
        .map_err(quarry::QueryError::from)?;
    Ok(planner.serialize(&spec))
}

/// Run the key command
pub fn run(config: &QuarryConfig, model: &str, args: &[String]) -> Result<(), CliError> {
    println!("{}", record_key(config, model, args)?);
    Ok(())
}
