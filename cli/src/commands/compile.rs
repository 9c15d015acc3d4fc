//! Compile command implementation
//!
//! Prints the SQL a query runs.

use quarry::{Dialect, Params, Planner, QuarryConfig};

use crate::error::CliError;
use crate::params::parse_params;

fn compile(planner: &Planner, model: &str, params: Params) -> quarry::Result<String> {
    let spec = planner.construct_named(model, params)?;
    Ok(planner.compile(&spec, &Default::default())?.to_sql())
}

/// SQL for `model` with the raw `-p` arguments.
pub fn compile_sql(
    config: &QuarryConfig,
    model: &str,
    args: &[String],
    dialect: Option<Dialect>,
) -> Result<String, CliError> {
    let planner = super::planner(config, dialect);
    Ok(compile(&planner, model, parse_params(args)?)?)
}

/// Run the compile command
pub fn run(
    config: &QuarryConfig,
    model: &str,
    args: &[String],
    dialect: Option<Dialect>,
) -> Result<(), CliError> {
    println!("{}", compile_sql(config, model, args, dialect)?);
    Ok(())
}
