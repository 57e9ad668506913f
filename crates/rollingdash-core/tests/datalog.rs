use std::fs;

use rollingdash_core::config::SimulatorConfig;
use rollingdash_core::datalog::{export, DatalogError, LogFormat, ObdPlayer, CSV_COLUMNS};
use rollingdash_core::telemetry::{FixedClock, TelemetrySimulator, VehicleSnapshot};
use tempfile::TempDir;

fn drive(ticks: usize) -> Vec<VehicleSnapshot> {
    let config = SimulatorConfig {
        seed: Some(12),
        ..SimulatorConfig::default()
    };
    let mut sim = TelemetrySimulator::from_config(&config);
    let clock = FixedClock::at_hour(17);
    (0..ticks).map(|_| sim.tick(&clock)).collect()
}

#[test]
fn test_export_csv() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.csv");
    let snapshots = drive(4);

    let format = export(&path, &snapshots).unwrap();
    assert_eq!(format, LogFormat::Csv);

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], CSV_COLUMNS.join(","));
    assert!(lines[1].starts_with(&snapshots[0].timestamp.to_string()));
}

#[test]
fn test_export_json_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.jsonl");
    let snapshots = drive(3);

    export(&path, &snapshots).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let parsed: Vec<VehicleSnapshot> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed[2].total_mileage, snapshots[2].total_mileage);
}

#[test]
fn test_export_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let err = export(dir.path().join("session.xlsx"), &drive(1)).unwrap_err();
    assert!(matches!(err, DatalogError::UnsupportedFormat(_)));
}

#[test]
fn test_obd_player_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("synthetic_obd_data_24h.csv");
    fs::write(
        &path,
        "vehicle_id,lat,lon,speed_kmph,engine_rpm,fuel_level_pct,engine_temp_c,dtc_code\n\
         V042,37.7749,-122.4194,12.5,1200,80.0,85.0,P0171\n\
         V042,37.7750,-122.4192,22.0,1500,79.9,86.5,None\n",
    )
    .unwrap();

    let mut player = ObdPlayer::open(&path).unwrap();
    assert_eq!(player.len(), 2);
    assert!(player.current().unwrap().dtc.has_issues());
    assert_eq!(player.next().unwrap().speed_kmph, 22.0);
    assert_eq!(player.channel_values("engine_rpm"), vec![1200.0, 1500.0]);
}

#[test]
fn test_obd_player_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = ObdPlayer::open(dir.path().join("nope.csv"));
    assert!(matches!(result, Err(DatalogError::Io(_))));
}
