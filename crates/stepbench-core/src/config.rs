//! Benchmark configuration
//!
//! Wait defaults and per-service overrides, loaded from TOML:
//!
//! ```toml
//! [wait]
//! check_interval = 1.0
//! timeout = 120.0
//! failure_statuses = ["error"]
//!
//! [resources.glance]
//! timeout = 300.0
//! ```

use crate::accessor::DEFAULT_FAILURE_STATUSES;
use crate::error::ConfigError;
use crate::resource::WaitSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Defaults for every wait
    pub wait: WaitDefaults,
    /// Overrides keyed by service name (e.g. `glance`)
    pub resources: BTreeMap<String, WaitOverride>,
}

/// Wait defaults, durations in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitDefaults {
    pub check_interval: f64,
    pub timeout: f64,
    pub failure_statuses: Vec<String>,
}

impl Default for WaitDefaults {
    fn default() -> Self {
        Self {
            check_interval: WaitSpec::DEFAULT_CHECK_INTERVAL.as_secs_f64(),
            timeout: WaitSpec::DEFAULT_TIMEOUT.as_secs_f64(),
            failure_statuses: DEFAULT_FAILURE_STATUSES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Per-service override; unset fields fall back to [`WaitDefaults`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitOverride {
    pub check_interval: Option<f64>,
    pub timeout: Option<f64>,
    pub failure_statuses: Option<Vec<String>>,
}

impl BenchConfig {
    /// Parse and validate TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML or unknown keys
    /// - `ConfigError::Invalid` on non-positive or non-finite durations
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// As [`BenchConfig::from_toml_str`], plus `ConfigError::Io`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), services = config.resources.len(), "loaded config");
        Ok(config)
    }

    /// Check every duration in the config
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first offending key
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_seconds("wait.check_interval", self.wait.check_interval)?;
        check_seconds("wait.timeout", self.wait.timeout)?;
        for (service, over) in &self.resources {
            if let Some(secs) = over.check_interval {
                check_seconds(&format!("resources.{service}.check_interval"), secs)?;
            }
            if let Some(secs) = over.timeout {
                check_seconds(&format!("resources.{service}.timeout"), secs)?;
            }
        }
        Ok(())
    }

    /// Wait spec for a service, defaults merged with its override
    #[must_use]
    pub fn wait_spec_for(&self, service: &str) -> WaitSpec {
        let over = self.resources.get(service);
        let check_interval = over
            .and_then(|o| o.check_interval)
            .unwrap_or(self.wait.check_interval);
        let timeout = over.and_then(|o| o.timeout).unwrap_or(self.wait.timeout);
        WaitSpec::new(
            Duration::from_secs_f64(check_interval),
            Duration::from_secs_f64(timeout),
        )
    }

    /// Terminal failure statuses for a service
    #[must_use]
    pub fn failure_statuses_for(&self, service: &str) -> &[String] {
        self.resources
            .get(service)
            .and_then(|o| o.failure_statuses.as_deref())
            .unwrap_or(&self.wait.failure_statuses)
    }
}

fn check_seconds(key: &str, secs: f64) -> Result<(), ConfigError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::invalid(
            key,
            format!("expected a positive number of seconds, got {secs}"),
        ));
    }
    Ok(())
}
