// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Proxy configuration.
//!
//! ```toml
//! system_id = 0
//!
//! [timeouts]
//! on_ms = 5000
//! off_ms = 5000
//! data_ms = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Reply timeouts used by proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Timeout for ON acknowledgements (ms).
    #[serde(default = "default_on_ms")]
    pub on_ms: u64,

    /// Timeout for OFF acknowledgements (ms).
    #[serde(default = "default_off_ms")]
    pub off_ms: u64,

    /// Timeout for data and status replies (ms).
    #[serde(default = "default_data_ms")]
    pub data_ms: u64,
}

fn default_on_ms() -> u64 {
    5000
}

fn default_off_ms() -> u64 {
    5000
}

fn default_data_ms() -> u64 {
    1000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            on_ms: default_on_ms(),
            off_ms: default_off_ms(),
            data_ms: default_data_ms(),
        }
    }
}

/// Per-process configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackConfig {
    /// System id used when building module addresses.
    #[serde(default)]
    pub system_id: u32,

    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl RackConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system_id > 0xFF {
            return Err(ConfigError::Invalid(format!(
                "system_id {} does not fit in 8 bits",
                self.system_id
            )));
        }

        for (name, value) in [
            ("on_ms", self.timeouts.on_ms),
            ("off_ms", self.timeouts.off_ms),
            ("data_ms", self.timeouts.data_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!(
                    "timeouts.{} must be greater than zero",
                    name
                )));
            }
        }

        Ok(())
    }

    pub fn proxy_timeouts(&self) -> ProxyTimeouts {
        ProxyTimeouts::from(&self.timeouts)
    }
}

/// Reply timeouts of one proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyTimeouts {
    pub on: Duration,
    pub off: Duration,
    pub data: Duration,
}

impl Default for ProxyTimeouts {
    fn default() -> Self {
        Self::from(&TimeoutConfig::default())
    }
}

impl From<&TimeoutConfig> for ProxyTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            on: Duration::from_millis(config.on_ms),
            off: Duration::from_millis(config.off_ms),
            data: Duration::from_millis(config.data_ms),
        }
    }
}

impl ProxyTimeouts {
    /// Same timeout for every reply.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            on: timeout,
            off: timeout,
            data: timeout,
        }
    }

    pub fn with_data(mut self, timeout: Duration) -> Self {
        self.data = timeout;
        self
    }
}
