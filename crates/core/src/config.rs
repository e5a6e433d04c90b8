// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration loaded from `sluice.toml`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;
use crate::sequencing::SequencingConfig;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct SluiceConfig {
    pub store: StoreConfig,
    pub sequencing: SequencingConfig,
    pub admission: AdmissionConfig,
    pub broker: BrokerConfig,
    pub subscriptions: SubscriptionsConfig,
}

impl SluiceConfig {
    /// Loads configuration from a TOML file. A missing file yields the
    /// defaults; a malformed file is an error, never silently defaulted.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Journal filename inside the daemon state directory.
    pub journal_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { backend: StoreBackend::Journal, journal_file: "events.ndjson".to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    #[default]
    Journal,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct AdmissionConfig {
    /// Authorization rules, all of which must hold for an event to be
    /// admitted. Empty means admit everything.
    pub rules: Vec<AdmissionRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AdmissionRule {
    pub name: String,
    /// Boolean expression over the event, evaluated by the configured
    /// expression engine.
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct BrokerConfig {
    pub start_position: StartPosition,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub delivery_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            start_position: StartPosition::End,
            poll_interval: Duration::from_secs(2),
            delivery_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// Where a freshly started subscription begins tailing. Updates to an
/// already-running subscription resume from the last processed sequence
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartPosition {
    #[default]
    End,
    Start,
    Sequence(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct SubscriptionsConfig {
    /// Directory of subscription TOML documents, relative to the state
    /// directory unless absolute.
    pub dir: String,
}

impl Default for SubscriptionsConfig {
    fn default() -> Self {
        Self { dir: "subscriptions".to_string() }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
