//! `quarry.toml` loading.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use quarry_core::{Dialect, Limits, Planner};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "quarry.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Engine configuration. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarryConfig {
    pub dialect: Dialect,
    pub limits: Limits,
    pub records: RecordSettings,
}

/// Lifetimes of persisted query records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSettings {
    /// Records never re-used are swept after this many seconds
    pub unused_ttl_secs: u64,
    /// Re-used records are swept after this many seconds
    pub used_ttl_secs: u64,
    /// Minimum spacing between opportunistic sweeps
    pub sweep_interval_secs: u64,
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self {
            unused_ttl_secs: 3600,
            used_ttl_secs: 86_400,
            sweep_interval_secs: 300,
        }
    }
}

impl RecordSettings {
    /// Records never re-used and last updated before this are stale.
    pub fn unused_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        before(now, self.unused_ttl_secs)
    }

    /// Re-used records last updated before this are stale.
    pub fn used_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        before(now, self.used_ttl_secs)
    }

    pub fn sweep_interval(&self) -> TimeDelta {
        delta(self.sweep_interval_secs).unwrap_or(TimeDelta::MAX)
    }
}

fn delta(secs: u64) -> Option<TimeDelta> {
    i64::try_from(secs).ok().and_then(TimeDelta::try_seconds)
}

fn before(now: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    delta(secs)
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl QuarryConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads `path` when given, otherwise [`DEFAULT_CONFIG_FILE`] if it exists,
    /// otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// A planner for this dialect and these limits.
    pub fn planner(&self) -> Planner {
        Planner::new(self.dialect, self.limits)
    }
}
