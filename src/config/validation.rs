//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use crate::asset_health::EFFICIENCY_FLOOR;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for NexusConfig.
///
/// Any new field added to NexusConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [asset]
        "asset",
        "asset.id",
        "asset.plant",
        // [physics]
        "physics",
        "physics.base_efficiency",
        "physics.ideal_power_kw",
        "physics.co2_lbs_per_kwh",
        "physics.energy_rate_usd_per_kwh",
        // [telemetry]
        "telemetry",
        "telemetry.topic",
        "telemetry.read_timeout_secs",
        "telemetry.max_reconnect_attempts",
        // [server]
        "server",
        "server.addr",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Find the closest known key, if any is within a small edit distance.
pub fn suggest_correction(unknown: &str, known: &HashSet<&'static str>) -> Option<String> {
    known
        .iter()
        .map(|k| (levenshtein(unknown, k), *k))
        .filter(|(d, _)| *d <= 3)
        .min_by_key(|(d, _)| *d)
        .map(|(_, k)| k.to_string())
}

/// Report keys in a raw TOML document that NexusConfig does not know about.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed NexusConfig.
///
/// Returns (errors, warnings). Errors are impossible values that must
/// prevent startup; warnings are suspicious but not fatal.
pub fn validate_physical_ranges(
    config: &super::NexusConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let p = &config.physics;

    // NaN/Inf comparisons silently pass, check them explicitly
    for (name, value) in [
        ("physics.base_efficiency", p.base_efficiency),
        ("physics.ideal_power_kw", p.ideal_power_kw),
        ("physics.co2_lbs_per_kwh", p.co2_lbs_per_kwh),
        ("physics.energy_rate_usd_per_kwh", p.energy_rate_usd_per_kwh),
    ] {
        if !value.is_finite() {
            errors.push(format!("{name} must be a finite number (got {value})"));
        }
    }
    if !errors.is_empty() {
        return (errors, warnings);
    }

    // Efficiency must sit above the degradation floor, or the curve is flat
    if p.base_efficiency <= EFFICIENCY_FLOOR || p.base_efficiency > 1.0 {
        errors.push(format!(
            "physics.base_efficiency = {:.3} is outside physical range ({EFFICIENCY_FLOOR:.2}-1.00]",
            p.base_efficiency
        ));
    }

    if p.ideal_power_kw <= 0.0 {
        errors.push(format!(
            "physics.ideal_power_kw = {:.1} must be > 0",
            p.ideal_power_kw
        ));
    }

    // Used as a divisor in the annual cost calculation
    if p.co2_lbs_per_kwh <= 0.0 {
        errors.push(format!(
            "physics.co2_lbs_per_kwh = {:.3} must be > 0 (used as divisor)",
            p.co2_lbs_per_kwh
        ));
    } else if p.co2_lbs_per_kwh > 3.0 {
        warnings.push(ValidationWarning {
            field: "physics.co2_lbs_per_kwh".to_string(),
            message: format!(
                "physics.co2_lbs_per_kwh = {:.2} is above any US grid subregion (< 3.0)",
                p.co2_lbs_per_kwh
            ),
            suggestion: None,
        });
    }

    if p.energy_rate_usd_per_kwh < 0.0 {
        errors.push(format!(
            "physics.energy_rate_usd_per_kwh = {:.3} cannot be negative",
            p.energy_rate_usd_per_kwh
        ));
    }

    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NexusConfig;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("hello", "hello"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("efficency", "efficiency"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [physics]
            base_efficiency = 0.85
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"physics".to_string()));
        assert!(keys.contains(&"physics.base_efficiency".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[physics]
base_efficency = 0.85
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("physics.base_efficiency")
        );
    }

    #[test]
    fn test_known_keys_produce_no_warnings() {
        let toml_str = NexusConfig::default().to_toml().unwrap();
        assert!(validate_unknown_keys(&toml_str).is_empty());
    }

    #[test]
    fn test_nan_rate_rejected() {
        let mut config = NexusConfig::default();
        config.physics.energy_rate_usd_per_kwh = f64::NAN;
        let (errors, _) = validate_physical_ranges(&config);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_high_emission_factor_warns() {
        let mut config = NexusConfig::default();
        config.physics.co2_lbs_per_kwh = 4.0;
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty());
        assert_eq!(warnings.len(), 1);
    }
}
