//! Hoshin Kanri strategy cascade
//!
//! Three tiers (corporate, plant, shop floor) for the selected pillar. The
//! plant tier flips to AT RISK whenever the current reading is in alarm and
//! carries a pillar-specific deviation message. Emissions and cost figures are
//! evaluated from the current reading, never from the stored carbon waste.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::asset_health::AssetHealthModel;
use crate::context::ContextSnapshot;
use crate::types::Evaluation;

/// Strategic pillar selectable in the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Sustainability,
    OperationalExcellence,
    Safety,
}

impl Pillar {
    pub const ALL: [Self; 3] = [Self::Sustainability, Self::OperationalExcellence, Self::Safety];

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Sustainability => "Sustainability (Net Zero)",
            Self::OperationalExcellence => "Operational Excellence (JCMS)",
            Self::Safety => "Safety (Zero Harm)",
        }
    }

    fn id(self) -> &'static str {
        match self {
            Self::Sustainability => "sustainability",
            Self::OperationalExcellence => "operational_excellence",
            Self::Safety => "safety",
        }
    }

    fn corporate_goal(self) -> (&'static str, &'static str) {
        match self {
            Self::Sustainability => ("Achieve Net Zero Scope 1 & 2 by 2040", "Target: 0 Emissions"),
            Self::OperationalExcellence => ("Top Decile Reliability & Margins", "Target: >95% OEE"),
            Self::Safety => ("Zero Harm / Zero Recordables", "Target: 0 TRIR"),
        }
    }

    fn plant_goal(self) -> &'static str {
        match self {
            Self::Sustainability => "Reduce Energy Intensity by 15%",
            Self::OperationalExcellence => "Optimize Asset Uptime & Maintenance Cost",
            Self::Safety => "Eliminate Process Safety Events (LOPC)",
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the id (`operational_excellence`) or the display label.
impl FromStr for Pillar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(needle) || p.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                format!(
                    "unknown pillar '{needle}' (expected one of: {})",
                    Self::ALL.map(Self::id).join(", ")
                )
            })
    }
}

/// Plant-level status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StrategyStatus {
    #[serde(rename = "AT RISK")]
    AtRisk,
    #[serde(rename = "ON TRACK")]
    OnTrack,
}

impl StrategyStatus {
    pub fn color(self) -> &'static str {
        match self {
            Self::AtRisk => "red",
            Self::OnTrack => "green",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorporateTier {
    pub goal: &'static str,
    pub target: &'static str,
    pub owner: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantTier {
    pub goal: &'static str,
    pub status: StrategyStatus,
    pub status_color: &'static str,
    /// Present only while the asset is in alarm
    pub deviation: Option<String>,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopFloorTier {
    pub standard_work: &'static str,
    pub owner: &'static str,
}

/// Full cascade for one pillar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyView {
    pub pillar: Pillar,
    pub pillar_label: &'static str,
    pub l1: CorporateTier,
    pub l2: PlantTier,
    pub l3: ShopFloorTier,
}

/// Build the cascade for `pillar` from the current context.
pub fn build_strategy_view(
    pillar: Pillar,
    snapshot: &ContextSnapshot,
    model: &AssetHealthModel,
    plant: &str,
) -> StrategyView {
    let evaluation = model.evaluate_reading(snapshot.current_vibration);
    let alarm = evaluation.is_alarm();
    let status = if alarm {
        StrategyStatus::AtRisk
    } else {
        StrategyStatus::OnTrack
    };

    let deviation = alarm.then(|| deviation_message(pillar, &evaluation, model));
    let (goal, target) = pillar.corporate_goal();

    StrategyView {
        pillar,
        pillar_label: pillar.label(),
        l1: CorporateTier {
            goal,
            target,
            owner: "CEO / Board",
        },
        l2: PlantTier {
            goal: pillar.plant_goal(),
            status,
            status_color: status.color(),
            deviation,
            owner: format!("Plant Manager - {plant}"),
        },
        l3: ShopFloorTier {
            standard_work: "Maintain Rotary Asset Efficiency",
            owner: "Maintenance Supervisor / Shop Floor",
        },
    }
}

fn deviation_message(pillar: Pillar, evaluation: &Evaluation, model: &AssetHealthModel) -> String {
    let carbon_waste = evaluation.excess_co2_lbs_per_hour;
    match pillar {
        Pillar::Sustainability => {
            format!("{carbon_waste:.2} lbs/hr excess carbon from Assets")
        }
        Pillar::OperationalExcellence => {
            let annual = model.annual_waste_cost(carbon_waste);
            format!("{} / yr excess energy waste", format_usd(annual))
        }
        Pillar::Safety => {
            let risk = if evaluation.is_alarm() { "High" } else { "Low" };
            format!("{risk} Risk of Mechanical Seal Failure (Leakage)")
        }
    }
}

/// Whole dollars with thousands separators, e.g. `$7,099`.
pub fn format_usd(amount: f64) -> String {
    let rounded = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0.0 && rounded != "0" {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_health::Vibration;
    use crate::context::ReadingSource;

    fn snapshot(rms: f64, carbon_waste: f64) -> ContextSnapshot {
        ContextSnapshot::default()
            .with_vibration(Vibration::new(rms).unwrap(), ReadingSource::Manual)
            .with_carbon_waste(carbon_waste)
            .unwrap()
    }

    fn deviation(pillar: Pillar, snap: &ContextSnapshot) -> Option<String> {
        build_strategy_view(pillar, snap, &AssetHealthModel::default(), "Milwaukee")
            .l2
            .deviation
    }

    #[test]
    fn test_pillar_parsing() {
        assert_eq!("safety".parse::<Pillar>().unwrap(), Pillar::Safety);
        assert_eq!(
            "Operational Excellence (JCMS)".parse::<Pillar>().unwrap(),
            Pillar::OperationalExcellence
        );
        let err = "finance".parse::<Pillar>().unwrap_err();
        assert!(err.contains("sustainability"));
    }

    #[test]
    fn test_on_track_has_no_deviation() {
        let view = build_strategy_view(
            Pillar::Sustainability,
            &snapshot(0.05, 0.0),
            &AssetHealthModel::default(),
            "Milwaukee",
        );
        assert_eq!(view.l2.status, StrategyStatus::OnTrack);
        assert_eq!(view.l2.status_color, "green");
        assert!(view.l2.deviation.is_none());
        assert_eq!(view.l1.goal, "Achieve Net Zero Scope 1 & 2 by 2040");
        assert_eq!(view.l2.owner, "Plant Manager - Milwaukee");
    }

    #[test]
    fn test_boundary_reading_is_on_track() {
        let view = build_strategy_view(
            Pillar::Safety,
            &snapshot(0.3, 0.0),
            &AssetHealthModel::default(),
            "Milwaukee",
        );
        assert_eq!(view.l2.status, StrategyStatus::OnTrack);
    }

    #[test]
    fn test_sustainability_deviation() {
        let view = build_strategy_view(
            Pillar::Sustainability,
            &snapshot(0.35, 5.738),
            &AssetHealthModel::default(),
            "Milwaukee",
        );
        assert_eq!(view.l2.status, StrategyStatus::AtRisk);
        assert_eq!(
            view.l2.deviation.as_deref(),
            Some("5.74 lbs/hr excess carbon from Assets")
        );
    }

    #[test]
    fn test_opex_deviation_uses_annual_cost() {
        let view = build_strategy_view(
            Pillar::OperationalExcellence,
            &snapshot(0.35, 5.74),
            &AssetHealthModel::default(),
            "Milwaukee",
        );
        // 5.74 / 0.85 * 0.12 * 8760 = 7098.7
        assert_eq!(view.l2.deviation.as_deref(), Some("$7,099 / yr excess energy waste"));
    }

    #[test]
    fn test_safety_deviation() {
        let view = build_strategy_view(
            Pillar::Safety,
            &snapshot(0.6, 14.84),
            &AssetHealthModel::default(),
            "Milwaukee",
        );
        assert_eq!(
            view.l2.deviation.as_deref(),
            Some("High Risk of Mechanical Seal Failure (Leakage)")
        );
        assert_eq!(view.l1.target, "Target: 0 TRIR");
    }

    #[test]
    fn test_deviation_ignores_stale_carbon_waste() {
        // Stored waste was never refreshed for 0.6
        let snap = snapshot(0.6, 0.0);
        assert_eq!(
            deviation(Pillar::Sustainability, &snap).as_deref(),
            Some("14.84 lbs/hr excess carbon from Assets")
        );
        assert_ne!(
            deviation(Pillar::OperationalExcellence, &snap).as_deref(),
            Some("$0 / yr excess energy waste")
        );

        // Stored waste left over from 0.6 while the reading is now 0.35
        let snap = snapshot(0.35, 14.84);
        assert_eq!(
            deviation(Pillar::Sustainability, &snap).as_deref(),
            Some("5.74 lbs/hr excess carbon from Assets")
        );
        assert_eq!(
            deviation(Pillar::OperationalExcellence, &snap).as_deref(),
            Some("$7,099 / yr excess energy waste")
        );
    }

    #[test]
    fn test_status_serializes_with_space() {
        assert_eq!(serde_json::to_string(&StrategyStatus::AtRisk).unwrap(), "\"AT RISK\"");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(0.0), "$0");
        assert_eq!(format_usd(999.4), "$999");
        assert_eq!(format_usd(7098.7), "$7,099");
        assert_eq!(format_usd(1_234_567.0), "$1,234,567");
    }
}
