//! Nexus Configuration - asset identity, physics constants, telemetry and server settings
//!
//! Each struct implements `Default` with the values the dashboard has always
//! used, so running without a config file changes nothing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::types::PUMP_TELEMETRY_TOPIC;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a Lean Nexus deployment.
///
/// Load with `NexusConfig::load()` which searches:
/// 1. `$NEXUS_CONFIG` env var
/// 2. `./nexus_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NexusConfig {
    /// Monitored asset identification
    #[serde(default)]
    pub asset: AssetInfo,

    /// Efficiency / energy / emissions constants
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// Telemetry subscription
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl NexusConfig {
    /// Load configuration using the standard search order:
    /// 1. `$NEXUS_CONFIG` environment variable
    /// 2. `./nexus_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("NEXUS_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), asset = %config.asset.id, "Loaded config from NEXUS_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from NEXUS_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "NEXUS_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("nexus_config.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(asset = %config.asset.id, "Loaded config from ./nexus_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./nexus_config.toml, using defaults");
                }
            }
        }

        info!("No nexus_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are reported as warnings and never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all values for physical plausibility.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if self.telemetry.topic.trim().is_empty() {
            errors.push("telemetry.topic must not be empty".to_string());
        }
        if self.telemetry.read_timeout_secs == 0 {
            errors.push("telemetry.read_timeout_secs must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Sections
// ============================================================================

/// Monitored asset identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Asset tag shown in alerts
    #[serde(default = "default_asset_id")]
    pub id: String,

    /// Plant the asset belongs to (used in the strategy cascade)
    #[serde(default = "default_plant")]
    pub plant: String,
}

fn default_asset_id() -> String {
    "P-101".to_string()
}

fn default_plant() -> String {
    "Milwaukee".to_string()
}

impl Default for AssetInfo {
    fn default() -> Self {
        Self {
            id: default_asset_id(),
            plant: default_plant(),
        }
    }
}

/// Efficiency and energy constants used by the asset health model.
///
/// Classification thresholds are not configurable; see `asset_health`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Pump efficiency at the design point (0.40 < x <= 1.0)
    #[serde(default = "default_base_efficiency")]
    pub base_efficiency: f64,

    /// Power draw at the design point (kW)
    #[serde(default = "default_ideal_power_kw")]
    pub ideal_power_kw: f64,

    /// Grid emission factor (lbs CO2 / kWh)
    #[serde(default = "default_co2_lbs_per_kwh")]
    pub co2_lbs_per_kwh: f64,

    /// Electricity price (USD / kWh)
    #[serde(default = "default_energy_rate_usd_per_kwh")]
    pub energy_rate_usd_per_kwh: f64,
}

fn default_base_efficiency() -> f64 {
    defaults::BASE_EFFICIENCY
}

fn default_ideal_power_kw() -> f64 {
    defaults::IDEAL_POWER_KW
}

fn default_co2_lbs_per_kwh() -> f64 {
    defaults::EGRID_CO2_LBS_PER_KWH
}

fn default_energy_rate_usd_per_kwh() -> f64 {
    defaults::ENERGY_RATE_USD_PER_KWH
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            base_efficiency: default_base_efficiency(),
            ideal_power_kw: default_ideal_power_kw(),
            co2_lbs_per_kwh: default_co2_lbs_per_kwh(),
            energy_rate_usd_per_kwh: default_energy_rate_usd_per_kwh(),
        }
    }
}

/// Telemetry subscription settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Topic to accept readings from; messages on other topics are dropped
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Per-line read timeout before the connection is considered dead (seconds)
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,

    /// Reconnection attempts before the feed stops
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
}

fn default_topic() -> String {
    PUMP_TELEMETRY_TOPIC.to_string()
}

fn default_read_timeout_secs() -> u64 {
    defaults::TELEMETRY_READ_TIMEOUT_SECS
}

fn default_max_reconnect_attempts() -> u32 {
    defaults::TELEMETRY_MAX_RECONNECT_ATTEMPTS
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            read_timeout_secs: default_read_timeout_secs(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `NEXUS_SERVER_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    "0.0.0.0:8501".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
