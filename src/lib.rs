//! Lean Nexus: asset health to strategy alignment
//!
//! Turns a vibration reading from a rotating asset into a fault
//! classification, efficiency and emissions estimates, and the status of the
//! plant's strategic goals.
//!
//! ## Architecture
//!
//! - **Asset Health**: pure model from vibration to classification, efficiency,
//!   power, emissions, FMEA and spectrum presets
//! - **Context**: shared snapshot of the current reading and carbon waste
//! - **Views**: strategy cascade, digital twin and RCA copilot view models
//! - **Telemetry**: JSON-lines feed that keeps the context current
//! - **Narrative**: pluggable SOP / X-Matrix text generation
//! - **API**: axum router serving the views

pub mod api;
pub mod asset_health;
pub mod config;
pub mod context;
pub mod narrative;
pub mod telemetry;
pub mod types;
pub mod views;

// Re-export configuration
pub use config::NexusConfig;

// Re-export commonly used types
pub use types::{
    Evaluation, FaultClassification, FmeaTable, SpectralBuckets, TelemetryEnvelope,
    TelemetryPayload, PUMP_TELEMETRY_TOPIC,
};

// Re-export the model and context
pub use asset_health::{AssetHealthModel, HealthError, Vibration};
pub use context::{ContextError, ContextSnapshot, SharedContext};

// Re-export narrative and telemetry entry points
pub use narrative::{NarrativeGenerator, TemplateGenerator};
pub use telemetry::{TelemetryError, TelemetryFeed, TelemetrySource};
