//! View models for the dashboard panels
//!
//! Each builder takes an immutable [`ContextSnapshot`](crate::context::ContextSnapshot)
//! and the [`AssetHealthModel`](crate::asset_health::AssetHealthModel) and returns
//! a serializable view. The twin also hands back the snapshot it wants committed.

pub mod rca;
pub mod strategy;
pub mod twin;

pub use rca::{build_rca_view, generate_sop, RcaStatus, RcaView};
pub use strategy::{build_strategy_view, format_usd, Pillar, StrategyStatus, StrategyView};
pub use twin::{render_twin, TwinMode, TwinView};

/// Render a reading the way the dashboard prints it: shortest form, no trailing zeros.
pub(crate) fn format_reading(rms: f64) -> String {
    let rounded = (rms * 1000.0).round() / 1000.0;
    format!("{rounded}")
}
