//! quarry CLI - Main entry point

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use quarry::{Dialect, QuarryConfig};
use quarry_cli::error::CliError;

/// quarry - compile, key and maintain declarative queries
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(author, version, about = "Compile, key and maintain quarry queries", long_about = None)]
struct Cli {
    /// Path to config file (default: quarry.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
enum Command {
    /// Print the SQL of a query
    Compile {
        /// Model to query (Observation, Name, Location, ...)
        model: String,

        /// Parameter as key=value; `a,b` is an array, `a..b` a range
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Override dialect from config
        #[arg(long, value_parser = parse_dialect)]
        dialect: Option<Dialect>,
    },

    /// Print the canonical record key of a query
    Key {
        /// Model to query
        model: String,

        /// Parameter as key=value; `a,b` is an array, `a..b` a range
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Show the model, parameters and SQL behind a record key
    Decode {
        /// Record key, as printed by `quarry key`
        key: String,

        /// Override dialect from config
        #[arg(long, value_parser = parse_dialect)]
        dialect: Option<Dialect>,
    },

    /// Delete stale query records
    Sweep {
        /// SQLite database holding the query_records table
        #[arg(long, env = "QUARRY_DATABASE", value_name = "PATH")]
        database: PathBuf,
    },
}

fn parse_dialect(s: &str) -> Result<Dialect, String> {
    Dialect::parse(s).ok_or_else(|| format!("unknown dialect '{s}' (expected sqlite or mysql)"))
}

fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Compile {
            model,
            params,
            dialect,
        } => quarry_cli::commands::compile::run(&config, &model, &params, dialect),
        Command::Key { model, params } => quarry_cli::commands::key::run(&config, &model, &params),
        Command::Decode { key, dialect } => quarry_cli::commands::decode::run(&config, &key, dialect),
        Command::Sweep { database } => quarry_cli::commands::sweep::run(&config, &database),
    }
}

fn load_config(path: Option<&Path>) -> Result<QuarryConfig, CliError> {
    Ok(QuarryConfig::load(path)?)
}
