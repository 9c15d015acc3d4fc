//! Decode command implementation
//!
//! Shows what a record key stands for.

use quarry::{Dialect, QuarryConfig, QuerySpec, Value};

use crate::error::CliError;
use crate::output;

fn decode(
    config: &QuarryConfig,
    key: &str,
    dialect: Option<Dialect>,
) -> quarry::Result<(QuerySpec, String)> {
    let planner = super::planner(config, dialect);
    let spec = planner.deserialize(key)?;
    let sql = planner.compile(&spec, &Default::default())?.to_sql();
    Ok((spec, sql))
}

fn print_params(params: &quarry::Params, depth: usize) {
    let indent = "  ".repeat(depth + 1);
    for (key, value) in params {
        match value {
            Value::Map(nested) => {
                println!("{indent}{}:", output::label(key));
                print_params(nested, depth + 1);
            }
            value => println!("{indent}{}: {value}", output::label(key)),
        }
    }
}

/// Run the decode command
pub fn run(config: &QuarryConfig, key: &str, dialect: Option<Dialect>) -> Result<(), CliError> {
    let (spec, sql) = decode(config, key, dialect)?;

    println!("{}", output::heading(spec.model().as_str()));
    if spec.params().is_empty() {
        println!("  {}", output::muted("(no parameters)"));
    } else {
        print_params(spec.params(), 0);
    }
    println!();
    println!("{sql}");
    Ok(())
}
