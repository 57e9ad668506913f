use std::fs;
use std::time::Duration;

use rollingdash_core::config::{ConfigError, SimulatorConfig};
use tempfile::TempDir;

#[test]
fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("RollingDash").join("simulator.json");

    let config = SimulatorConfig {
        tick_interval_ms: 1000,
        seed: Some(77),
        record_session: true,
        ..SimulatorConfig::default()
    };
    config.save(&path).unwrap();

    let loaded = SimulatorConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.tick_interval(), Duration::from_secs(1));
}

#[test]
fn test_load_or_default_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = SimulatorConfig::load_or_default(&dir.path().join("absent.json")).unwrap();
    assert_eq!(config, SimulatorConfig::default());
}

#[test]
fn test_load_degrades_bad_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("simulator.json");
    fs::write(
        &path,
        r#"{ "tick_interval_ms": "soon", "sharing_probability": 7, "earnings_rate_per_point": -2 }"#,
    )
    .unwrap();

    let config = SimulatorConfig::load(&path).unwrap();
    assert_eq!(config.tick_interval_ms, 2000);
    assert_eq!(config.sharing_probability, 1.0);
    assert_eq!(config.earnings_rate_per_point, 0.0015);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = SimulatorConfig::load(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
