//! Dashboard context shared by the strategy, twin and RCA views.
//!
//! ## Architecture
//!
//! - **ContextSnapshot**: immutable value; views read one and return an updated one
//! - **SharedContext**: the process-wide handle; serializes writers so the
//!   (vibration, carbon waste) pair is never observed half-updated

mod shared;
mod snapshot;

pub use shared::{ContextField, SharedContext};
pub use snapshot::{ContextSnapshot, ReadingSource};

use thiserror::Error;

use crate::asset_health::HealthError;

/// Errors raised when updating the context
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextError {
    #[error(transparent)]
    InvalidReading(#[from] HealthError),

    #[error("Invalid carbon_waste: {0} (must be a finite number >= 0)")]
    InvalidCarbonWaste(f64),
}
