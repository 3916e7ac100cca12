//! Config Validation Tests
//!
//! Typo detection and physical range validation for `nexus_config.toml`,
//! exercised independently from the server.

use lean_nexus::config::validation::{
    known_config_keys, suggest_correction, validate_physical_ranges, validate_unknown_keys,
};
use lean_nexus::config::{ConfigError, NexusConfig};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_physics_key_warns_with_suggestion() {
    let toml_str = r#"
[physics]
base_efficency = 0.82
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("base_efficency"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("physics.base_efficiency"),
        "Should suggest the correct spelling"
    );
}

#[test]
fn typo_in_section_name_warns() {
    let toml_str = r#"
[telemetri]
topic = "plant/pump"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.iter().any(|w| w.field == "telemetri"));
    assert!(warnings
        .iter()
        .any(|w| w.suggestion.as_deref() == Some("telemetry")));
}

#[test]
fn valid_config_has_no_unknown_keys() {
    let toml_str = NexusConfig::default().to_toml().unwrap();
    assert!(validate_unknown_keys(&toml_str).is_empty());
}

#[test]
fn completely_unrelated_key_has_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("zzzzzzzzzzzzzzzz", &known).is_none());
}

#[test]
fn unknown_keys_do_not_fail_loading() {
    let config = NexusConfig::from_toml_str(
        r#"
[asset]
id = "P-303"
colour = "blue"
"#,
    )
    .unwrap();
    assert_eq!(config.asset.id, "P-303");
}

// ============================================================================
// Physical Range Validation
// ============================================================================

#[test]
fn default_physics_is_valid() {
    let (errors, warnings) = validate_physical_ranges(&NexusConfig::default());
    assert!(errors.is_empty(), "{errors:?}");
    assert!(warnings.is_empty());
}

#[test]
fn zero_emission_factor_is_rejected() {
    let mut config = NexusConfig::default();
    config.physics.co2_lbs_per_kwh = 0.0;
    let (errors, _) = validate_physical_ranges(&config);
    assert!(errors.iter().any(|e| e.contains("co2_lbs_per_kwh")));
}

#[test]
fn implausible_emission_factor_warns() {
    let mut config = NexusConfig::default();
    config.physics.co2_lbs_per_kwh = 4.5;
    let (errors, warnings) = validate_physical_ranges(&config);
    assert!(errors.is_empty());
    assert_eq!(warnings.len(), 1);
}

#[test]
fn non_finite_values_are_rejected() {
    let mut config = NexusConfig::default();
    config.physics.ideal_power_kw = f64::NAN;
    let (errors, _) = validate_physical_ranges(&config);
    assert!(errors.iter().any(|e| e.contains("ideal_power_kw")));
}

#[test]
fn negative_power_fails_whole_load() {
    let result = NexusConfig::from_toml_str(
        r#"
[physics]
ideal_power_kw = -5.0
"#,
    );
    match result {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("ideal_power_kw")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}
