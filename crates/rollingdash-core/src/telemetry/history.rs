//! Rolling per-metric history for chart display
//!
//! Each metric keeps a fixed-capacity FIFO window. Reading a series never
//! consumes it; callers can ask for the same window as often as they like.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::earnings::parse_earnings;
use super::VehicleSnapshot;

/// Samples kept per metric when no capacity is configured
pub const DEFAULT_HISTORY_CAPACITY: usize = 12;

/// Charted metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    /// km/h
    Speed,
    /// Engine speed
    Rpm,
    /// Fuel, percent
    FuelLevel,
    /// Coolant temperature, °C
    EngineTemp,
    /// Battery, percent
    BatteryLevel,
    /// Efficiency, km/kWh
    Efficiency,
    /// Engine load, percent
    EngineLoad,
    /// Throttle, percent
    ThrottlePosition,
    /// kW
    PowerUsage,
    /// DCL earned per tick
    Earnings,
}

impl Metric {
    /// Every metric, in chart order
    pub const ALL: [Metric; 10] = [
        Metric::Speed,
        Metric::Rpm,
        Metric::FuelLevel,
        Metric::EngineTemp,
        Metric::BatteryLevel,
        Metric::Efficiency,
        Metric::EngineLoad,
        Metric::ThrottlePosition,
        Metric::PowerUsage,
        Metric::Earnings,
    ];

    /// Stable key used by the presentation layer
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Speed => "speed",
            Metric::Rpm => "rpm",
            Metric::FuelLevel => "fuelLevel",
            Metric::EngineTemp => "engineTemp",
            Metric::BatteryLevel => "batteryLevel",
            Metric::Efficiency => "efficiency",
            Metric::EngineLoad => "engineLoad",
            Metric::ThrottlePosition => "throttlePosition",
            Metric::PowerUsage => "powerUsage",
            Metric::Earnings => "earnings",
        }
    }

    /// Resolve a key back to a metric
    pub fn from_key(key: &str) -> Option<Self> {
        Metric::ALL.into_iter().find(|m| m.key() == key)
    }

    /// Chart unit label
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Speed => "km/h",
            Metric::Rpm => "rpm",
            Metric::FuelLevel | Metric::BatteryLevel => "%",
            Metric::EngineLoad | Metric::ThrottlePosition => "%",
            Metric::EngineTemp => "°C",
            Metric::Efficiency => "km/kWh",
            Metric::PowerUsage => "kW",
            Metric::Earnings => "DCL",
        }
    }

    /// Extract this metric's value from a snapshot
    pub fn value_of(&self, snapshot: &VehicleSnapshot) -> f64 {
        match self {
            Metric::Speed => snapshot.speed,
            Metric::Rpm => snapshot.rpm,
            Metric::FuelLevel => snapshot.fuel_level,
            Metric::EngineTemp => snapshot.engine_temp,
            Metric::BatteryLevel => snapshot.battery_level,
            Metric::Efficiency => snapshot.efficiency,
            Metric::EngineLoad => snapshot.engine_load,
            Metric::ThrottlePosition => snapshot.throttle_position,
            Metric::PowerUsage => snapshot.power_usage,
            Metric::Earnings => parse_earnings(&snapshot.simulated_earnings),
        }
    }
}

/// Bounded per-metric sample windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "HistoryBufferData")]
pub struct HistoryBuffer {
    capacity: usize,
    series: BTreeMap<Metric, VecDeque<f64>>,
}

/// Wire form of [`HistoryBuffer`], validated on the way in
#[derive(Deserialize)]
struct HistoryBufferData {
    #[serde(default)]
    capacity: usize,
    #[serde(default)]
    series: BTreeMap<Metric, VecDeque<f64>>,
}

impl From<HistoryBufferData> for HistoryBuffer {
    fn from(data: HistoryBufferData) -> Self {
        let mut buffer = Self::new(data.capacity);
        for (metric, mut window) in data.series {
            while window.len() > buffer.capacity {
                window.pop_front();
            }
            buffer.series.insert(metric, window);
        }
        buffer
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    /// Create an empty buffer. A zero capacity falls back to the default.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_HISTORY_CAPACITY
        } else {
            capacity
        };
        Self {
            capacity,
            series: BTreeMap::new(),
        }
    }

    /// Samples kept per metric
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a sample, evicting the oldest once the window is full
    pub fn push(&mut self, metric: Metric, value: f64) {
        let capacity = self.capacity.max(1);
        let window = self
            .series
            .entry(metric)
            .or_insert_with(|| VecDeque::with_capacity(capacity));
        while window.len() >= capacity {
            window.pop_front();
        }
        window.push_back(value);
    }

    /// Value-passing form of [`push`](Self::push)
    pub fn push_sample(mut self, metric: Metric, value: f64) -> Self {
        self.push(metric, value);
        self
    }

    /// Push every charted metric of a snapshot
    pub fn record(&mut self, snapshot: &VehicleSnapshot) {
        for metric in Metric::ALL {
            self.push(metric, metric.value_of(snapshot));
        }
    }

    /// Iterate a metric's window, oldest first
    pub fn samples(&self, metric: Metric) -> impl Iterator<Item = f64> + '_ {
        self.series
            .get(&metric)
            .into_iter()
            .flat_map(|window| window.iter().copied())
    }

    /// Copy of a metric's window, oldest first
    pub fn values(&self, metric: Metric) -> Vec<f64> {
        self.samples(metric).collect()
    }

    /// Most recent sample
    pub fn latest(&self, metric: Metric) -> Option<f64> {
        self.series.get(&metric).and_then(|w| w.back().copied())
    }

    /// Number of samples held for a metric
    pub fn len(&self, metric: Metric) -> usize {
        self.series.get(&metric).map_or(0, VecDeque::len)
    }

    /// True when no metric has samples
    pub fn is_empty(&self) -> bool {
        self.series.values().all(VecDeque::is_empty)
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.series.clear();
    }
}
