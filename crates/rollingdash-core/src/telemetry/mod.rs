//! Vehicle Telemetry
//!
//! Simulated vehicle state and the bookkeeping built on top of it:
//! - Snapshot generation with time-of-day driving bias
//! - Rolling per-metric history for charts
//! - Token earnings accumulation
//! - Diagnostic trouble code catalog

pub mod clock;
pub mod diagnostics;
pub mod earnings;
pub mod generator;
pub mod history;

pub use clock::{Clock, FixedClock, SystemClock};
pub use diagnostics::{Diagnostics, TroubleCode, NO_ISSUES};
pub use earnings::{accumulate, parse_earnings, EarningsAccumulator};
pub use generator::{generate_snapshot, DrivingState, GeneratorParams, TelemetrySimulator};
pub use history::{HistoryBuffer, Metric, DEFAULT_HISTORY_CAPACITY};

use serde::{Deserialize, Serialize};

/// GPS position as decimal-degree strings (6 decimal places)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsPosition {
    /// Latitude, degrees
    pub latitude: String,
    /// Longitude, degrees
    pub longitude: String,
}

impl GpsPosition {
    /// Format a coordinate pair the way the map view displays it
    pub fn from_degrees(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: format!("{:.6}", latitude),
            longitude: format!("{:.6}", longitude),
        }
    }

    /// Parse back into degrees, `None` if either component is malformed
    pub fn to_degrees(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.trim().parse::<f64>().ok()?;
        let lon = self.longitude.trim().parse::<f64>().ok()?;
        Some((lat, lon))
    }
}

/// One generated instant of simulated vehicle state.
///
/// All derived fields (rpm, engine load, throttle, earnings, emissions, power)
/// are computed from `is_driving`, `is_city_driving` and `speed` of the same
/// snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSnapshot {
    /// Epoch milliseconds
    pub timestamp: i64,
    /// Driving state drawn for this tick
    pub is_driving: bool,
    /// City (true) or highway (false) driving
    pub is_city_driving: bool,
    /// km/h
    pub speed: f64,
    /// Engine revolutions per minute
    pub rpm: f64,
    /// Percentage, 0-100
    pub fuel_level: f64,
    /// °C
    pub engine_temp: f64,
    /// Percentage, 0-100
    pub battery_level: f64,
    /// km/kWh
    pub efficiency: f64,
    /// km
    pub range: f64,
    /// km, non-decreasing within a session
    pub total_mileage: f64,
    /// Current position
    pub gps: GpsPosition,
    /// Active trouble codes, if any
    pub diagnostics: Diagnostics,
    /// Percentage, 0-100
    pub engine_load: f64,
    /// Percentage, 0-100
    pub throttle_position: f64,
    /// Data points gathered this tick
    pub data_points_collected: u32,
    /// Data points sold this tick, at most `data_points_collected`
    pub data_points_shared: u32,
    /// Sharing state drawn for this tick
    pub sharing_enabled: bool,
    /// DCL earned for this tick, 4 decimal places
    pub simulated_earnings: String,
    /// g CO2
    pub emissions_reduced: f64,
    /// kW
    pub power_usage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_formatting() {
        let gps = GpsPosition::from_degrees(37.7749, -122.4194);
        assert_eq!(gps.latitude, "37.774900");
        assert_eq!(gps.longitude, "-122.419400");
        assert_eq!(gps.to_degrees(), Some((37.7749, -122.4194)));
    }

    #[test]
    fn test_gps_malformed() {
        let gps = GpsPosition {
            latitude: "north".into(),
            longitude: "0.0".into(),
        };
        assert_eq!(gps.to_degrees(), None);
    }
}
