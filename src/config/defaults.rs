//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Context
// ============================================================================

/// Vibration reading a fresh or reset context starts from (in/s RMS).
pub const DEFAULT_VIBRATION_RMS: f64 = 0.05;

/// Carbon waste a fresh or reset context starts from (lbs CO2 / hr).
pub const DEFAULT_CARBON_WASTE_LBS_PER_HOUR: f64 = 0.0;

// ============================================================================
// Physics
// ============================================================================

/// Pump efficiency at the design duty point.
pub const BASE_EFFICIENCY: f64 = 0.85;

/// Motor power at the design duty point (kW).
pub const IDEAL_POWER_KW: f64 = 65.0;

/// EPA eGRID 2023 average emission factor (lbs CO2 / kWh).
pub const EGRID_CO2_LBS_PER_KWH: f64 = 0.85;

/// Industrial electricity rate (USD / kWh).
pub const ENERGY_RATE_USD_PER_KWH: f64 = 0.12;

/// Operating hours in a year, assuming continuous duty.
pub const HOURS_PER_YEAR: f64 = 24.0 * 365.0;

// ============================================================================
// Telemetry
// ============================================================================

/// Per-line read timeout on the telemetry subscription (seconds).
pub const TELEMETRY_READ_TIMEOUT_SECS: u64 = 30;

/// Connect timeout for the telemetry broker (seconds).
pub const TELEMETRY_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Reconnection attempts before the feed gives up.
pub const TELEMETRY_MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// First reconnection delay; doubles each attempt (seconds).
pub const TELEMETRY_INITIAL_RECONNECT_DELAY_SECS: u64 = 1;

/// Reconnection delay cap (seconds).
pub const TELEMETRY_MAX_RECONNECT_DELAY_SECS: u64 = 30;

// ============================================================================
// Digital Twin
// ============================================================================

/// Hourly points in the vibration trend, current hour included.
pub const TREND_HOURS: u32 = 24;

/// Lower bound of the simulated background vibration (in/s RMS).
pub const TREND_NOISE_MIN: f64 = 0.04;

/// Upper bound of the simulated background vibration (in/s RMS).
pub const TREND_NOISE_MAX: f64 = 0.07;

// ============================================================================
// Mock Sensor
// ============================================================================

/// Publishing interval of the mock sensor (milliseconds).
pub const MOCK_SENSOR_INTERVAL_MS: u64 = 2_000;

/// Lowest vibration the mock sensor emits (in/s RMS).
pub const MOCK_SENSOR_MIN_RMS: f64 = 0.02;

/// Highest vibration the mock sensor emits (in/s RMS).
pub const MOCK_SENSOR_MAX_RMS: f64 = 0.8;

/// Default address the mock sensor serves subscribers on.
pub const MOCK_SENSOR_ADDR: &str = "127.0.0.1:1883";
