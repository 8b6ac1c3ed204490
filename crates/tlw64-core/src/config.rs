//! TOML configuration.
//!
//! Every field has a default, so an empty file is a valid configuration.
//!
//! ```toml
//! [display]
//! units = "imperial"
//! clock_format = "12h"
//!
//! [user]
//! weight_kg = 64
//! height_cm = 168
//! age = 31
//! gender = "female"
//! step_goal = 10000
//!
//! [alarms]
//! repetition = "exact"
//!
//! [ble]
//! connect_timeout_secs = 20
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tlw64_types::{DisplaySettings, UserProfile};

use crate::ble::ConnectionConfig;
use crate::commands::RepetitionMode;
use crate::error::{Error, Result};
use crate::settings::SettingsSnapshot;

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Units and clock format shown on the band.
    #[serde(default)]
    pub display: DisplaySettings,

    /// Wearer profile used for step length and goals.
    #[serde(default)]
    pub user: UserProfile,

    /// Alarm encoding options.
    #[serde(default)]
    pub alarms: AlarmSettings,

    /// BLE timeouts.
    #[serde(default)]
    pub ble: BleSettings,
}

/// Alarm encoding options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmSettings {
    /// How weekday repetition is written to the band.
    #[serde(default)]
    pub repetition: RepetitionMode,
}

/// BLE timeouts, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BleSettings {
    /// Connecting to the band.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Service discovery after connecting.
    #[serde(default = "default_discovery_timeout")]
    pub discovery_timeout_secs: u64,
    /// Each characteristic read.
    #[serde(default = "default_io_timeout")]
    pub read_timeout_secs: u64,
    /// Each characteristic write.
    #[serde(default = "default_io_timeout")]
    pub write_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_discovery_timeout() -> u64 {
    10
}

fn default_io_timeout() -> u64 {
    10
}

impl Default for BleSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            discovery_timeout_secs: default_discovery_timeout(),
            read_timeout_secs: default_io_timeout(),
            write_timeout_secs: default_io_timeout(),
        }
    }
}

impl BleSettings {
    /// Timeouts for [`BleChannel`](crate::ble::BleChannel).
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::default()
            .connection_timeout(Duration::from_secs(self.connect_timeout_secs))
            .discovery_timeout(Duration::from_secs(self.discovery_timeout_secs))
            .read_timeout(Duration::from_secs(self.read_timeout_secs))
            .write_timeout(Duration::from_secs(self.write_timeout_secs))
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("discovery_timeout_secs", self.discovery_timeout_secs),
            ("read_timeout_secs", self.read_timeout_secs),
            ("write_timeout_secs", self.write_timeout_secs),
        ];
        match fields.iter().find(|(_, secs)| *secs == 0) {
            Some((name, _)) => Err(Error::invalid_config(format!(
                "ble.{} must be greater than zero",
                name
            ))),
            None => Ok(()),
        }
    }
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::invalid_config(e.to_string()))?;
        config.ble.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::invalid_config(e.to_string()))
    }

    /// Settings pushed to the band during initialization.
    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot::new(self.display, self.user)
    }
}
