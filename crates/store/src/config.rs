// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store configuration
//!
//! The background flush period is the only process-wide tunable. It can be
//! set programmatically, from the `HOARD_FLUSH_INTERVAL` environment variable
//! (humantime syntax such as `250ms` or `5s`), or from TOML.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Flush period used when nothing else is configured
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// Environment variable overriding the flush period
pub const FLUSH_INTERVAL_ENV: &str = "HOARD_FLUSH_INTERVAL";

/// Default chunk file prefix for sequences
pub const DEFAULT_PREFIX: &str = "data";

static PROCESS_FLUSH_INTERVAL_MICROS: AtomicU64 =
    AtomicU64::new(saturating_micros(DEFAULT_FLUSH_INTERVAL));

/// Whole microseconds in `interval`, capped at `u64::MAX`
const fn saturating_micros(interval: Duration) -> u64 {
    let micros = interval.as_micros();
    if micros > u64::MAX as u128 {
        u64::MAX
    } else {
        micros as u64
    }
}

/// Set the flush period picked up by every `StoreConfig::default()`
///
/// Cells that are already open keep the period they were opened with.
pub fn set_default_flush_interval(interval: Duration) {
    PROCESS_FLUSH_INTERVAL_MICROS.store(saturating_micros(interval), Ordering::SeqCst);
}

/// Current process-wide flush period
pub fn default_flush_interval() -> Duration {
    Duration::from_micros(PROCESS_FLUSH_INTERVAL_MICROS.load(Ordering::SeqCst))
}

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid flush interval {value:?}: {source}")]
    Interval {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("flush interval must be greater than zero")]
    ZeroInterval,
}

/// Configuration shared by cells, chunks and sequences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Period of the background flush task
    #[serde(with = "humantime_serde", default = "default_flush_interval")]
    pub flush_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            flush_interval: default_flush_interval(),
        }
    }
}

impl StoreConfig {
    pub fn with_flush_interval(flush_interval: Duration) -> Self {
        Self { flush_interval }
    }

    /// Default config, overridden by `HOARD_FLUSH_INTERVAL` when set
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(FLUSH_INTERVAL_ENV) {
            Ok(value) => Self::parse_interval(&value).map(Self::with_flush_interval),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Parse a config from TOML, e.g. `flush_interval = "2s"`
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        if config.flush_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(config)
    }

    fn parse_interval(value: &str) -> Result<Duration, ConfigError> {
        let interval =
            humantime::parse_duration(value.trim()).map_err(|source| ConfigError::Interval {
                value: value.to_string(),
                source,
            })?;
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(interval)
    }
}

/// What a sequence does when chunk files exist past a missing index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Stop at the first missing index; later files are ignored and reported
    #[default]
    Truncate,
    /// Refuse to open
    Reject,
}

/// Configuration for one sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceConfig {
    /// File name prefix: chunks are named `{prefix}_chunk_{index}.txt`
    pub prefix: String,
    /// Maximum number of elements per chunk
    pub capacity: usize,
    pub gap_policy: GapPolicy,
    pub store: StoreConfig,
}

impl SequenceConfig {
    pub fn new(prefix: impl Into<String>, capacity: usize) -> Self {
        Self {
            prefix: prefix.into(),
            capacity,
            gap_policy: GapPolicy::default(),
            store: StoreConfig::default(),
        }
    }

    pub fn gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.gap_policy = gap_policy;
        self
    }

    pub fn store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
