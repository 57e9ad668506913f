//! Simulator configuration
//!
//! Stored as pretty-printed JSON (`simulator.json`). Every field has a default
//! and bad values degrade to that default instead of failing the load.

use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::telemetry::DEFAULT_HISTORY_CAPACITY;

/// Tick interval used when none (or an invalid one) is configured
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 2000;

const CONFIG_FILE_NAME: &str = "simulator.json";

/// Errors loading or saving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid JSON
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Telemetry simulator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Milliseconds between ticks (0 or invalid = 2000)
    #[serde(deserialize_with = "lenient_interval")]
    pub tick_interval_ms: u64,

    /// Samples kept per charted metric
    pub history_capacity: usize,

    /// Seed for a reproducible run
    pub seed: Option<u64>,

    /// GPS base point latitude
    pub base_latitude: f64,
    /// GPS base point longitude
    pub base_longitude: f64,

    /// Max GPS drift while driving, degrees
    pub gps_jitter_deg: f64,

    /// DCL paid per shared data point
    pub earnings_rate_per_point: f64,

    /// Chance of a trouble code per tick
    pub diagnostic_probability: f64,

    /// Chance that sharing is enabled on a tick
    pub sharing_probability: f64,

    /// Odometer at session start, km
    pub initial_mileage_km: f64,

    /// Keep every snapshot in the session recorder
    pub record_session: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            seed: None,
            base_latitude: 37.7749,
            base_longitude: -122.4194,
            gps_jitter_deg: 0.005,
            earnings_rate_per_point: 0.0015,
            diagnostic_probability: 0.08,
            sharing_probability: 0.8,
            initial_mileage_km: 12_450.0,
            record_session: false,
        }
    }
}

/// Accept any JSON value for the interval; anything but a positive integer
/// becomes the default.
fn lenient_interval<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value.as_u64() {
        Some(ms) if ms > 0 => Ok(ms),
        _ => {
            tracing::warn!(
                "Invalid tick interval {value}, using {DEFAULT_TICK_INTERVAL_MS} ms"
            );
            Ok(DEFAULT_TICK_INTERVAL_MS)
        }
    }
}

/// Replace non-finite or out-of-range values with the default
fn finite_or(value: f64, fallback: f64, name: &str, valid: impl Fn(f64) -> bool) -> f64 {
    if value.is_finite() && valid(value) {
        value
    } else {
        tracing::warn!("Invalid {name} {value}, using {fallback}");
        fallback
    }
}

impl SimulatorConfig {
    /// Parse configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimulatorConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load configuration, or the defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No simulator config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Tick interval, never zero
    pub fn tick_interval(&self) -> Duration {
        let ms = if self.tick_interval_ms == 0 {
            DEFAULT_TICK_INTERVAL_MS
        } else {
            self.tick_interval_ms
        };
        Duration::from_millis(ms)
    }

    /// Copy with every out-of-range value replaced by its default
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.tick_interval_ms == 0 {
            self.tick_interval_ms = defaults.tick_interval_ms;
        }
        if self.history_capacity == 0 {
            tracing::warn!("History capacity 0, using {}", defaults.history_capacity);
            self.history_capacity = defaults.history_capacity;
        }

        self.base_latitude = finite_or(self.base_latitude, defaults.base_latitude, "latitude", |v| {
            (-90.0..=90.0).contains(&v)
        });
        self.base_longitude = finite_or(
            self.base_longitude,
            defaults.base_longitude,
            "longitude",
            |v| (-180.0..=180.0).contains(&v),
        );
        self.gps_jitter_deg =
            finite_or(self.gps_jitter_deg, defaults.gps_jitter_deg, "GPS jitter", |v| v >= 0.0);
        self.earnings_rate_per_point = finite_or(
            self.earnings_rate_per_point,
            defaults.earnings_rate_per_point,
            "earnings rate",
            |v| v >= 0.0,
        );
        self.initial_mileage_km = finite_or(
            self.initial_mileage_km,
            defaults.initial_mileage_km,
            "initial mileage",
            |v| v >= 0.0,
        );
        self.diagnostic_probability = finite_or(
            self.diagnostic_probability,
            defaults.diagnostic_probability,
            "diagnostic probability",
            |_| true,
        )
        .clamp(0.0, 1.0);
        self.sharing_probability = finite_or(
            self.sharing_probability,
            defaults.sharing_probability,
            "sharing probability",
            |_| true,
        )
        .clamp(0.0, 1.0);

        self
    }
}

/// Default config location: `<config dir>/RollingDash/simulator.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("RollingDash").join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(2000));
        assert_eq!(config.history_capacity, 12);
        assert_eq!(config.earnings_rate_per_point, 0.0015);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = SimulatorConfig::from_json_str(r#"{ "seed": 5 }"#).unwrap();
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.tick_interval_ms, 2000);
        assert_eq!(config.base_latitude, 37.7749);
    }

    #[test]
    fn test_invalid_interval_falls_back() {
        for json in [
            r#"{ "tick_interval_ms": 0 }"#,
            r#"{ "tick_interval_ms": -250 }"#,
            r#"{ "tick_interval_ms": "fast" }"#,
            r#"{ "tick_interval_ms": null }"#,
        ] {
            let config = SimulatorConfig::from_json_str(json).unwrap();
            assert_eq!(config.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS, "{json}");
        }

        let config = SimulatorConfig::from_json_str(r#"{ "tick_interval_ms": 500 }"#).unwrap();
        assert_eq!(config.tick_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_probabilities_clamped() {
        let config = SimulatorConfig::from_json_str(
            r#"{ "diagnostic_probability": 3.5, "sharing_probability": -1.0 }"#,
        )
        .unwrap();
        assert_eq!(config.diagnostic_probability, 1.0);
        assert_eq!(config.sharing_probability, 0.0);
    }

    #[test]
    fn test_out_of_range_values_use_defaults() {
        let config = SimulatorConfig::from_json_str(
            r#"{ "base_latitude": 123.0, "gps_jitter_deg": -1.0, "history_capacity": 0 }"#,
        )
        .unwrap();
        assert_eq!(config.base_latitude, 37.7749);
        assert_eq!(config.gps_jitter_deg, 0.005);
        assert_eq!(config.history_capacity, 12);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            SimulatorConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
