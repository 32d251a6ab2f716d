use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use crate::utils::error::BeaconError;

pub const DEFAULT_SERVICE_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef0);
pub const DEFAULT_CHARACTERISTIC_UUID: Uuid = Uuid::from_u128(0x87654321_1234_5678_1234_56789abcdef0);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gps: GpsSettings,
    pub peripheral: PeripheralSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsSettings {
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    pub idle_pause_ms: u64,
    /// Consecutive read errors after which the port is reopened.
    pub read_error_threshold: u32,
    pub reconnect: ReconnectSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectSettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeripheralSettings {
    pub service_uuid: Uuid,
    pub characteristic_uuid: Uuid,
    pub service_path_base: String,
    pub advertisement_path_base: String,
    pub agent_path: String,
    pub agent_capability: String,
    pub advertisement_type: String,
    pub include_tx_power: bool,
    pub notify_interval_ms: u64,
}

impl Default for GpsSettings {
    fn default() -> Self {
        Self {
            port: "/dev/serial0".to_string(),
            baud_rate: 9600,
            read_timeout_ms: 1000,
            idle_pause_ms: 100,
            read_error_threshold: 5,
            reconnect: ReconnectSettings::default(),
        }
    }
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_backoff_ms: 1000,
            max_backoff_ms: 30_000,
        }
    }
}

impl Default for PeripheralSettings {
    fn default() -> Self {
        Self {
            service_uuid: DEFAULT_SERVICE_UUID,
            characteristic_uuid: DEFAULT_CHARACTERISTIC_UUID,
            service_path_base: "/org/bluez/example/service".to_string(),
            advertisement_path_base: "/org/bluez/example/advertisement".to_string(),
            agent_path: "/test/agent".to_string(),
            agent_capability: "NoInputNoOutput".to_string(),
            advertisement_type: "peripheral".to_string(),
            include_tx_power: false,
            notify_interval_ms: 1000,
        }
    }
}

impl GpsSettings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn idle_pause(&self) -> Duration {
        Duration::from_millis(self.idle_pause_ms)
    }
}

impl PeripheralSettings {
    pub fn notify_interval(&self) -> Duration {
        Duration::from_millis(self.notify_interval_ms)
    }
}

impl Config {
    /// Loads `path` when given, otherwise the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, BeaconError> {
        let config = match path {
            Some(path) => {
                info!("📄 Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => {
                debug!("📄 No configuration file given, using defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BeaconError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BeaconError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, BeaconError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, BeaconError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), BeaconError> {
        if self.gps.port.trim().is_empty() {
            return Err(BeaconError::ConfigError("gps.port must not be empty".to_string()));
        }
        if self.gps.baud_rate == 0 {
            return Err(BeaconError::ConfigError("gps.baud_rate must be greater than 0".to_string()));
        }
        if self.gps.read_error_threshold == 0 {
            return Err(BeaconError::ConfigError(
                "gps.read_error_threshold must be greater than 0".to_string(),
            ));
        }
        let reconnect = &self.gps.reconnect;
        if reconnect.max_backoff_ms < reconnect.initial_backoff_ms {
            return Err(BeaconError::ConfigError(format!(
                "gps.reconnect.max_backoff_ms ({}) is below initial_backoff_ms ({})",
                reconnect.max_backoff_ms, reconnect.initial_backoff_ms
            )));
        }
        if self.peripheral.notify_interval_ms == 0 {
            return Err(BeaconError::ConfigError(
                "peripheral.notify_interval_ms must be greater than 0".to_string(),
            ));
        }
        for (key, path) in [
            ("peripheral.service_path_base", &self.peripheral.service_path_base),
            ("peripheral.advertisement_path_base", &self.peripheral.advertisement_path_base),
            ("peripheral.agent_path", &self.peripheral.agent_path),
        ] {
            if !path.starts_with('/') || path.ends_with('/') {
                return Err(BeaconError::ConfigError(format!(
                    "{} must be an absolute object path without trailing slash, got {:?}",
                    key, path
                )));
            }
        }
        Ok(())
    }
}
