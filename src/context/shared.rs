//! Process-wide context handle.

use std::sync::RwLock;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{ContextError, ContextSnapshot, ReadingSource};
use crate::asset_health::Vibration;
use crate::types::TelemetryPayload;

/// Fields that can be set individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextField {
    CurrentVibration,
    CarbonWaste,
}

/// Shared, lock-protected dashboard context.
///
/// Wrap in `Arc` and hand a clone to every collaborator. All writes go
/// through a single lock, one writer at a time.
#[derive(Debug, Default)]
pub struct SharedContext {
    inner: RwLock<ContextSnapshot>,
}

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state.
    pub fn get(&self) -> ContextSnapshot {
        self.inner
            .read()
            .unwrap_or_else(|e| {
                warn!("RwLock poisoned on SharedContext read, recovering");
                e.into_inner()
            })
            .clone()
    }

    /// Set a single field as an operator would.
    ///
    /// # Errors
    ///
    /// Invalid values are rejected and the context is left unchanged.
    pub fn set(&self, field: ContextField, value: f64) -> Result<ContextSnapshot, ContextError> {
        self.update(|snap| match field {
            ContextField::CurrentVibration => {
                Ok(snap.with_vibration(Vibration::new(value)?, ReadingSource::Manual))
            }
            ContextField::CarbonWaste => snap.with_carbon_waste(value),
        })
    }

    /// Apply a telemetry message delivered by the feed.
    ///
    /// # Errors
    ///
    /// A payload with an invalid reading leaves the last valid value in place.
    pub fn apply_telemetry(&self, payload: TelemetryPayload) -> Result<ContextSnapshot, ContextError> {
        self.update(|snap| snap.with_telemetry(payload))
    }

    /// Replace the state with a snapshot produced by a view.
    pub fn commit(&self, snapshot: ContextSnapshot) {
        self.update(|_| Ok::<_, ContextError>(snapshot)).ok();
    }

    /// Restore defaults: vibration 0.05, carbon waste 0.0, no telemetry.
    pub fn reset(&self) -> ContextSnapshot {
        info!("Resetting dashboard context to defaults");
        let fresh = ContextSnapshot::default();
        self.commit(fresh.clone());
        fresh
    }

    /// Read-modify-write under the write lock.
    ///
    /// The closure sees the current snapshot and returns its replacement;
    /// on error nothing is written.
    pub fn update<F>(&self, f: F) -> Result<ContextSnapshot, ContextError>
    where
        F: FnOnce(&ContextSnapshot) -> Result<ContextSnapshot, ContextError>,
    {
        let mut guard = self.inner.write().unwrap_or_else(|e| {
            warn!("RwLock poisoned on SharedContext write, recovering");
            e.into_inner()
        });
        let next = f(&guard)?;
        debug!(
            vibration = next.vibration_rms(),
            carbon_waste = next.carbon_waste,
            source = ?next.source,
            "Context updated"
        );
        *guard = next.clone();
        Ok(next)
    }
}
