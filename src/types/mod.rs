//! Shared domain types for the asset health pipeline.

mod health;
mod telemetry;

pub use health::*;
pub use telemetry::*;
