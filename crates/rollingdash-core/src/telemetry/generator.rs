//! Snapshot Generator - simulated vehicle telemetry
//!
//! Produces one plausible, internally consistent [`VehicleSnapshot`] per tick.
//! Driving is more likely during the day than at night; every derived value
//! (rpm, load, throttle, earnings, emissions) follows from the driving state
//! and speed drawn for the same tick.
//!
//! The random source is injected so runs can be made deterministic with a
//! seeded [`StdRng`].

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::clock::Clock;
use super::diagnostics::{Diagnostics, TROUBLE_CODES};
use super::{GpsPosition, VehicleSnapshot};
use crate::config::SimulatorConfig;

/// Night hours (22:00-06:00) drive with this probability
const NIGHT_DRIVING_PROBABILITY: f64 = 0.2;
/// Daytime hours drive with this probability
const DAY_DRIVING_PROBABILITY: f64 = 0.7;

/// Driving state drawn at the start of each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrivingState {
    /// On the road this tick
    pub is_driving: bool,
    /// City rather than highway speeds
    pub is_city_driving: bool,
}

impl DrivingState {
    /// Parked, engine idling
    pub const PARKED: DrivingState = DrivingState {
        is_driving: false,
        is_city_driving: false,
    };
    /// Driving in town
    pub const CITY: DrivingState = DrivingState {
        is_driving: true,
        is_city_driving: true,
    };
    /// Driving on the highway
    pub const HIGHWAY: DrivingState = DrivingState {
        is_driving: true,
        is_city_driving: false,
    };

    /// Draw a driving state for the given hour of day
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, hour: u32) -> Self {
        Self {
            is_driving: rng.gen_bool(driving_probability(hour)),
            is_city_driving: rng.gen_bool(0.5),
        }
    }
}

/// Probability of being on the road at `hour` (wraps past 23)
pub fn driving_probability(hour: u32) -> f64 {
    let hour = hour % 24;
    if !(6..22).contains(&hour) {
        NIGHT_DRIVING_PROBABILITY
    } else {
        DAY_DRIVING_PROBABILITY
    }
}

/// Tunables for the generator, usually derived from [`SimulatorConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorParams {
    /// GPS base point latitude, degrees
    pub base_latitude: f64,
    /// GPS base point longitude, degrees
    pub base_longitude: f64,
    /// Max GPS drift in degrees while driving
    pub gps_jitter_deg: f64,
    /// DCL per shared data point
    pub earnings_rate_per_point: f64,
    /// Chance of a trouble code per tick
    pub diagnostic_probability: f64,
    /// Chance that sharing is enabled on a tick
    pub sharing_probability: f64,
    /// Odometer reading when there is no previous snapshot
    pub initial_mileage_km: f64,
    /// Time covered by one tick, used to advance the odometer
    pub tick_interval: Duration,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self::from(&SimulatorConfig::default())
    }
}

impl From<&SimulatorConfig> for GeneratorParams {
    fn from(config: &SimulatorConfig) -> Self {
        let config = config.clone().sanitized();
        Self {
            base_latitude: config.base_latitude,
            base_longitude: config.base_longitude,
            gps_jitter_deg: config.gps_jitter_deg,
            earnings_rate_per_point: config.earnings_rate_per_point,
            diagnostic_probability: config.diagnostic_probability,
            sharing_probability: config.sharing_probability,
            initial_mileage_km: config.initial_mileage_km,
            tick_interval: config.tick_interval(),
        }
    }
}

/// Probability usable by `gen_bool`: clamped to [0, 1], `fallback` if not finite
fn probability(p: f64, fallback: f64) -> f64 {
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

/// Finite, non-negative value or `fallback`
fn non_negative(v: f64, fallback: f64) -> f64 {
    if v.is_finite() && v >= 0.0 {
        v
    } else {
        fallback
    }
}

/// Uniform noise in `[0, max)`, zero for a non-positive bound
fn noise<R: Rng + ?Sized>(rng: &mut R, max: f64) -> f64 {
    if max > 0.0 {
        rng.gen_range(0.0..max)
    } else {
        0.0
    }
}

/// Uniform jitter in `(-amplitude, amplitude)`
fn jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f64) -> f64 {
    if amplitude.is_finite() && amplitude > 0.0 {
        rng.gen_range(-amplitude..amplitude)
    } else {
        0.0
    }
}

/// Generate a snapshot for the current time.
///
/// `previous` only feeds the odometer; everything else is drawn fresh.
pub fn generate_snapshot<R: Rng + ?Sized>(
    rng: &mut R,
    params: &GeneratorParams,
    previous: Option<&VehicleSnapshot>,
    clock: &dyn Clock,
) -> VehicleSnapshot {
    let hour = clock.hour_of_day() % 24;
    let state = DrivingState::sample(rng, hour);
    snapshot_for_state(rng, params, previous, state, hour, clock.timestamp_ms())
}

/// Generate a snapshot for an already drawn driving state
pub fn snapshot_for_state<R: Rng + ?Sized>(
    rng: &mut R,
    params: &GeneratorParams,
    previous: Option<&VehicleSnapshot>,
    state: DrivingState,
    hour: u32,
    timestamp: i64,
) -> VehicleSnapshot {
    let hour = hour % 24;
    let h = hour as f64;
    let driving = state.is_driving;

    let defaults = SimulatorConfig::default();
    let diagnostic_probability =
        probability(params.diagnostic_probability, defaults.diagnostic_probability);
    let sharing_probability = probability(params.sharing_probability, defaults.sharing_probability);
    let earnings_rate = non_negative(params.earnings_rate_per_point, defaults.earnings_rate_per_point);
    let initial_mileage = non_negative(params.initial_mileage_km, defaults.initial_mileage_km);

    let speed = match (driving, state.is_city_driving) {
        (false, _) => 0.0,
        (true, true) => rng.gen_range(10.0..60.0),
        (true, false) => rng.gen_range(60.0..120.0),
    };

    let rpm = if driving {
        speed * 40.0 + noise(rng, 500.0)
    } else {
        rng.gen_range(700.0..1500.0)
    };

    // Slow daily depletion curves
    let fuel_level = (70.0 - 0.8 * h + noise(rng, 10.0)).clamp(0.0, 100.0);
    let battery_level = (95.0 - 2.0 * h + noise(rng, 5.0)).clamp(0.0, 100.0);
    let range = (320.0 - 6.0 * h + noise(rng, 20.0)).max(0.0);

    let engine_temp = if driving {
        rng.gen_range(85.0..100.0)
    } else {
        rng.gen_range(70.0..85.0)
    };

    let (lat_drift, lon_drift) = if driving {
        (
            jitter(rng, params.gps_jitter_deg),
            jitter(rng, params.gps_jitter_deg),
        )
    } else {
        (0.0, 0.0)
    };
    let gps = GpsPosition::from_degrees(
        params.base_latitude + lat_drift,
        params.base_longitude + lon_drift,
    );

    let engine_load = if driving {
        (30.0 + speed / 2.0 + noise(rng, 10.0)).min(100.0)
    } else {
        noise(rng, 5.0)
    };
    let throttle_position = if driving {
        (speed / 1.2 + noise(rng, 20.0)).min(100.0)
    } else {
        noise(rng, 3.0)
    };

    let diagnostics = if rng.gen_bool(diagnostic_probability) {
        TROUBLE_CODES
            .choose(rng)
            .map(|tc| Diagnostics::Codes(vec![tc.code.to_string()]))
            .unwrap_or_default()
    } else {
        Diagnostics::NoIssues
    };

    let data_points_collected: u32 = if driving {
        rng.gen_range(15..25)
    } else {
        rng.gen_range(5..10)
    };
    let sharing_enabled = rng.gen_bool(sharing_probability);
    let data_points_shared = if sharing_enabled {
        let ratio: f64 = rng.gen_range(0.7..1.0);
        ((data_points_collected as f64 * ratio).floor() as u32).min(data_points_collected)
    } else {
        0
    };
    let simulated_earnings = format!(
        "{:.4}",
        data_points_shared as f64 * earnings_rate
    );

    let efficiency = match (driving, state.is_city_driving) {
        (false, _) => 0.0,
        (true, true) => 6.0 + noise(rng, 2.0),
        (true, false) => 4.0 + noise(rng, 2.0),
    };
    let emissions_reduced = if driving {
        speed * 0.12 + noise(rng, 1.0)
    } else {
        0.0
    };
    let power_usage = if driving {
        5.0 + speed * 0.15 + engine_load * 0.05
    } else {
        0.3 + noise(rng, 0.4)
    };

    let hours = params.tick_interval.as_secs_f64() / 3600.0;
    let total_mileage = previous
        .map(|p| p.total_mileage)
        .unwrap_or(initial_mileage)
        + speed * hours;

    VehicleSnapshot {
        timestamp,
        is_driving: driving,
        is_city_driving: state.is_city_driving,
        speed,
        rpm,
        fuel_level,
        engine_temp,
        battery_level,
        efficiency,
        range,
        total_mileage,
        gps,
        diagnostics,
        engine_load,
        throttle_position,
        data_points_collected,
        data_points_shared,
        sharing_enabled,
        simulated_earnings,
        emissions_reduced,
        power_usage,
    }
}

/// Stateful simulator: owns the random source and the last snapshot
pub struct TelemetrySimulator {
    params: GeneratorParams,
    rng: StdRng,
    last: Option<VehicleSnapshot>,
}

impl Default for TelemetrySimulator {
    fn default() -> Self {
        Self::new(GeneratorParams::default())
    }
}

impl TelemetrySimulator {
    /// Create a simulator seeded from OS entropy
    pub fn new(params: GeneratorParams) -> Self {
        Self {
            params,
            rng: StdRng::from_entropy(),
            last: None,
        }
    }

    /// Create a deterministic simulator
    pub fn with_seed(params: GeneratorParams, seed: u64) -> Self {
        Self {
            params,
            rng: StdRng::seed_from_u64(seed),
            last: None,
        }
    }

    /// Build from configuration, honoring its optional seed
    pub fn from_config(config: &SimulatorConfig) -> Self {
        let params = GeneratorParams::from(config);
        match config.seed {
            Some(seed) => Self::with_seed(params, seed),
            None => Self::new(params),
        }
    }

    /// Continue from an earlier snapshot so the odometer carries over
    pub fn resume_from(mut self, last: Option<VehicleSnapshot>) -> Self {
        self.last = last;
        self
    }

    /// Generator parameters
    pub fn params(&self) -> &GeneratorParams {
        &self.params
    }

    /// Last generated snapshot
    pub fn last(&self) -> Option<&VehicleSnapshot> {
        self.last.as_ref()
    }

    /// Generate the next snapshot
    pub fn tick(&mut self, clock: &dyn Clock) -> VehicleSnapshot {
        let snapshot = generate_snapshot(&mut self.rng, &self.params, self.last.as_ref(), clock);
        self.last = Some(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::clock::FixedClock;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_driving_probability_by_hour() {
        assert_eq!(driving_probability(0), 0.2);
        assert_eq!(driving_probability(5), 0.2);
        assert_eq!(driving_probability(6), 0.7);
        assert_eq!(driving_probability(21), 0.7);
        assert_eq!(driving_probability(22), 0.2);
        assert_eq!(driving_probability(23), 0.2);
        // Wraps rather than falling off the table
        assert_eq!(driving_probability(24), 0.2);
        assert_eq!(driving_probability(36), 0.7);
    }

    #[test]
    fn test_parked_snapshot() {
        let mut rng = rng();
        let params = GeneratorParams::default();
        for hour in [0, 12, 23] {
            let s = snapshot_for_state(&mut rng, &params, None, DrivingState::PARKED, hour, 0);
            assert_eq!(s.speed, 0.0);
            assert_eq!(s.efficiency, 0.0);
            assert_eq!(s.emissions_reduced, 0.0);
            assert!(s.rpm >= 700.0 && s.rpm < 1500.0, "idle rpm {}", s.rpm);
            assert!(s.engine_temp >= 70.0 && s.engine_temp < 85.0);
            assert!(s.engine_load < 5.0);
            assert!(s.throttle_position < 3.0);
            assert!(s.data_points_collected >= 5 && s.data_points_collected < 10);
            assert_eq!(s.gps, GpsPosition::from_degrees(37.7749, -122.4194));
        }
    }

    #[test]
    fn test_city_and_highway_speed_bands() {
        let mut rng = rng();
        let params = GeneratorParams::default();
        for _ in 0..200 {
            let city = snapshot_for_state(&mut rng, &params, None, DrivingState::CITY, 12, 0);
            assert!(city.speed >= 10.0 && city.speed < 60.0);
            let hwy = snapshot_for_state(&mut rng, &params, None, DrivingState::HIGHWAY, 12, 0);
            assert!(hwy.speed >= 60.0 && hwy.speed < 120.0);
        }
    }

    #[test]
    fn test_driving_correlations() {
        let mut rng = rng();
        let params = GeneratorParams::default();
        for _ in 0..200 {
            let s = snapshot_for_state(&mut rng, &params, None, DrivingState::HIGHWAY, 9, 0);
            assert!(s.rpm >= s.speed * 40.0 && s.rpm < s.speed * 40.0 + 500.0);
            assert!(s.engine_load >= 30.0 + s.speed / 2.0 || s.engine_load == 100.0);
            assert!(s.throttle_position >= s.speed / 1.2 || s.throttle_position == 100.0);
            assert!(s.throttle_position <= 100.0);
            assert!(s.engine_temp >= 85.0 && s.engine_temp < 100.0);
            assert!(s.efficiency > 0.0);
            assert!(s.data_points_collected >= 15 && s.data_points_collected < 25);

            let (lat, lon) = s.gps.to_degrees().unwrap();
            assert!((lat - params.base_latitude).abs() <= params.gps_jitter_deg + 1e-6);
            assert!((lon - params.base_longitude).abs() <= params.gps_jitter_deg + 1e-6);
        }
    }

    #[test]
    fn test_earnings_follow_shared_points() {
        let mut rng = rng();
        let params = GeneratorParams::default();
        for _ in 0..200 {
            let s = snapshot_for_state(&mut rng, &params, None, DrivingState::CITY, 14, 0);
            assert!(s.data_points_shared <= s.data_points_collected);
            if !s.sharing_enabled {
                assert_eq!(s.data_points_shared, 0);
            }
            let expected = format!("{:.4}", s.data_points_shared as f64 * 0.0015);
            assert_eq!(s.simulated_earnings, expected);
        }
    }

    #[test]
    fn test_sharing_always_on_and_off() {
        let mut rng = rng();
        let mut params = GeneratorParams::default();

        params.sharing_probability = 1.0;
        let s = snapshot_for_state(&mut rng, &params, None, DrivingState::CITY, 10, 0);
        assert!(s.sharing_enabled);
        assert!(s.data_points_shared as f64 >= (s.data_points_collected as f64 * 0.7).floor());

        params.sharing_probability = 0.0;
        let s = snapshot_for_state(&mut rng, &params, None, DrivingState::CITY, 10, 0);
        assert!(!s.sharing_enabled);
        assert_eq!(s.simulated_earnings, "0.0000");
    }

    #[test]
    fn test_diagnostics_extremes() {
        let mut rng = rng();
        let mut params = GeneratorParams::default();

        params.diagnostic_probability = 1.0;
        let s = snapshot_for_state(&mut rng, &params, None, DrivingState::PARKED, 3, 0);
        assert!(s.diagnostics.has_issues());
        assert!(TROUBLE_CODES.iter().any(|tc| tc.code == s.diagnostics.codes()[0]));

        params.diagnostic_probability = 0.0;
        let s = snapshot_for_state(&mut rng, &params, None, DrivingState::PARKED, 3, 0);
        assert_eq!(s.diagnostics, Diagnostics::NoIssues);
    }

    #[test]
    fn test_depletion_with_hour() {
        let mut rng = rng();
        let params = GeneratorParams::default();
        let early = snapshot_for_state(&mut rng, &params, None, DrivingState::PARKED, 0, 0);
        let late = snapshot_for_state(&mut rng, &params, None, DrivingState::PARKED, 23, 0);
        // Noise bands do not overlap between the two ends of the day
        assert!(early.fuel_level >= 70.0 && early.fuel_level < 80.0);
        assert!(late.fuel_level >= 51.6 - 1e-9 && late.fuel_level < 61.6);
        assert!(early.battery_level > late.battery_level);
        assert!(early.range > late.range);
    }

    #[test]
    fn test_odometer_never_decreases() {
        let mut sim = TelemetrySimulator::with_seed(GeneratorParams::default(), 7);
        let clock = FixedClock::at_hour(12);
        let mut last = sim.tick(&clock).total_mileage;
        assert!(last >= 12_450.0);
        for _ in 0..100 {
            let s = sim.tick(&clock);
            assert!(s.total_mileage >= last);
            last = s.total_mileage;
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let clock = FixedClock::at_hour(8);
        let mut a = TelemetrySimulator::with_seed(GeneratorParams::default(), 99);
        let mut b = TelemetrySimulator::with_seed(GeneratorParams::default(), 99);
        for _ in 0..10 {
            assert_eq!(a.tick(&clock), b.tick(&clock));
        }
        assert_eq!(a.last().map(|s| s.timestamp), Some(clock.timestamp_ms()));
    }

    #[test]
    fn test_zero_jitter_is_safe() {
        let mut rng = rng();
        let params = GeneratorParams {
            gps_jitter_deg: 0.0,
            ..GeneratorParams::default()
        };
        let s = snapshot_for_state(&mut rng, &params, None, DrivingState::HIGHWAY, 12, 0);
        assert_eq!(s.gps, GpsPosition::from_degrees(37.7749, -122.4194));
    }

    #[test]
    fn test_non_finite_params_do_not_panic() {
        let mut rng = rng();
        let params = GeneratorParams {
            diagnostic_probability: f64::NAN,
            sharing_probability: f64::NAN,
            earnings_rate_per_point: f64::NAN,
            initial_mileage_km: -5.0,
            gps_jitter_deg: f64::INFINITY,
            ..GeneratorParams::default()
        };
        for _ in 0..50 {
            let s = snapshot_for_state(&mut rng, &params, None, DrivingState::CITY, 12, 0);
            assert!(s.total_mileage >= 12_450.0);
            assert!(s.simulated_earnings.parse::<f64>().unwrap() >= 0.0);
        }

        let params = GeneratorParams {
            sharing_probability: 3.0,
            diagnostic_probability: -1.0,
            ..GeneratorParams::default()
        };
        let s = snapshot_for_state(&mut rng, &params, None, DrivingState::CITY, 12, 0);
        assert!(s.sharing_enabled);
        assert_eq!(s.diagnostics, Diagnostics::NoIssues);
    }

    #[test]
    fn test_from_config_with_nan_probabilities() {
        let config = SimulatorConfig {
            seed: Some(5),
            diagnostic_probability: f64::NAN,
            sharing_probability: f64::NAN,
            ..SimulatorConfig::default()
        };
        let mut sim = TelemetrySimulator::from_config(&config);
        assert_eq!(sim.params().diagnostic_probability, 0.08);
        assert_eq!(sim.params().sharing_probability, 0.8);
        sim.tick(&FixedClock::at_hour(12));
    }

    #[test]
    fn test_resume_keeps_odometer() {
        let clock = FixedClock::at_hour(12);
        let mut first = TelemetrySimulator::with_seed(GeneratorParams::default(), 11);
        let mut last = None;
        for _ in 0..5 {
            last = Some(first.tick(&clock));
        }
        let before = last.as_ref().map(|s| s.total_mileage).unwrap();

        let mut resumed =
            TelemetrySimulator::with_seed(GeneratorParams::default(), 12).resume_from(last);
        assert!(resumed.tick(&clock).total_mileage >= before);
    }
}
