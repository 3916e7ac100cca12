//! Nexus Configuration Module
//!
//! Provides deployment configuration loaded from a TOML file: asset identity,
//! energy/emissions constants, telemetry subscription and HTTP server settings.
//!
//! ## Loading Order
//!
//! 1. `NEXUS_CONFIG` environment variable (path to TOML file)
//! 2. `nexus_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! config::init(NexusConfig::load());
//!
//! let rate = config::get().physics.energy_rate_usd_per_kwh;
//! ```

mod nexus_config;
pub mod defaults;
pub mod validation;

pub use nexus_config::*;

use std::sync::OnceLock;

/// Global configuration, initialized once at startup.
static NEXUS_CONFIG: OnceLock<NexusConfig> = OnceLock::new();

/// Initialize the global configuration.
///
/// Subsequent calls are ignored with a warning.
pub fn init(config: NexusConfig) {
    if NEXUS_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global configuration.
///
/// Falls back to built-in defaults when `init()` has not been called, so
/// library consumers and tests can use the model without a startup phase.
pub fn get() -> &'static NexusConfig {
    NEXUS_CONFIG.get_or_init(NexusConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    NEXUS_CONFIG.get().is_some()
}
