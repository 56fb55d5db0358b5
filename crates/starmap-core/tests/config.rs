use std::fs;

use starmap_core::{LowerBound, RangeAnchor, TrackerConfig, UpperBound};
use tempfile::TempDir;

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let config = TrackerConfig::load_from_dir(dir.path()).expect("defaults");

    assert_eq!(config, TrackerConfig::default());
    assert_eq!(config.max_alerts, 15);
    assert_eq!(config.max_alert_age_minutes, 15);
}

#[test]
fn partial_yaml_keeps_remaining_defaults() {
    let dir = TempDir::new().expect("tempdir");
    fs::create_dir_all(dir.path().join(".starmap")).expect("mkdir");
    fs::write(
        dir.path().join(".starmap/config.yaml"),
        r#"
max_alerts: 5
home_system: Jita
ignore_systems: [Uedama, Niarja]
triggers:
  - name: near-home
    anchor: { kind: home }
    upper: 5
    lower: 1
    lower_op: more_than
  - name: scout
    anchor: { kind: character, name: Scout One }
    upper: 0
    upper_op: exactly
"#,
    )
    .expect("write config");

    let config = TrackerConfig::load_from_dir(dir.path()).expect("config loads");
    assert_eq!(config.max_alerts, 5);
    assert_eq!(config.max_alert_age_minutes, 15);
    assert_eq!(config.path_tick_ms, 100);
    assert_eq!(config.home_system.as_deref(), Some("Jita"));
    assert_eq!(config.ignore_systems, vec!["Uedama", "Niarja"]);

    assert_eq!(config.triggers.len(), 2);
    let near = &config.triggers[0];
    assert_eq!(near.anchor, RangeAnchor::Home);
    assert_eq!(near.upper_op, UpperBound::AtMost);
    assert_eq!(near.lower_op, LowerBound::MoreThan);
    assert!(near.enabled);
    assert!(near.matches(2));
    assert!(!near.matches(1));

    let scout = &config.triggers[1];
    assert_eq!(
        scout.anchor,
        RangeAnchor::Character {
            name: "Scout One".into()
        }
    );
    assert!(scout.matches(0));
}

#[test]
fn malformed_yaml_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, "max_alerts: [not, a, number]").expect("write config");

    let err = TrackerConfig::load(&path).expect_err("parse fails");
    assert!(format!("{err:#}").contains("Failed to parse config"));
}
