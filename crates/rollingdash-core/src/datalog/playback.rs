//! OBD log playback
//!
//! Replays synthetic OBD-II logs exported as CSV, one record at a time.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::DatalogError;
use crate::telemetry::Diagnostics;

const REQUIRED_COLUMNS: [&str; 8] = [
    "vehicle_id",
    "speed_kmph",
    "engine_rpm",
    "fuel_level_pct",
    "engine_temp_c",
    "dtc_code",
    "lat",
    "lon",
];

/// One row of an OBD log
#[derive(Debug, Clone, PartialEq)]
pub struct ObdRecord {
    /// Vehicle the row belongs to
    pub vehicle_id: String,
    /// km/h
    pub speed_kmph: f64,
    /// Engine revolutions per minute
    pub engine_rpm: f64,
    /// Fuel, percent
    pub fuel_level_pct: f64,
    /// Engine temperature, °C
    pub engine_temp_c: f64,
    /// `dtc_code` column as logged, e.g. `P0420` or `None`
    pub dtc_code: String,
    /// Parsed trouble codes
    pub dtc: Diagnostics,
    /// Latitude, degrees
    pub lat: f64,
    /// Longitude, degrees
    pub lon: f64,
}

impl ObdRecord {
    /// Numeric value of a channel by column name
    pub fn channel(&self, name: &str) -> Option<f64> {
        match name {
            "speed_kmph" => Some(self.speed_kmph),
            "engine_rpm" => Some(self.engine_rpm),
            "fuel_level_pct" => Some(self.fuel_level_pct),
            "engine_temp_c" => Some(self.engine_temp_c),
            "lat" => Some(self.lat),
            "lon" => Some(self.lon),
            _ => None,
        }
    }
}

impl fmt::Display for ObdRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vehicle ID: {}, Speed: {} km/h, RPM: {}, Fuel: {}%, Temp: {}°C, DTC: {}, Location: ({}, {})",
            self.vehicle_id,
            self.speed_kmph,
            self.engine_rpm,
            self.fuel_level_pct,
            self.engine_temp_c,
            self.dtc_code,
            self.lat,
            self.lon,
        )
    }
}

/// Parse an OBD CSV log.
///
/// Extra columns are ignored. Rows with unparsable numbers are skipped.
pub fn parse_obd_csv<R: BufRead>(reader: R) -> Result<Vec<ObdRecord>, DatalogError> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(DatalogError::MissingColumn(REQUIRED_COLUMNS[0].to_string())),
    };
    let columns: Vec<String> = header.split(',').map(|c| c.trim().to_lowercase()).collect();

    let mut idx = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DatalogError::MissingColumn(name.to_string()))?;
    }
    let [vehicle, speed, rpm, fuel, temp, dtc, lat, lon] = idx;

    let mut records = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let number = |i: usize| fields.get(i).and_then(|v| v.parse::<f64>().ok());

        let dtc_code = fields.get(dtc).copied().unwrap_or("");
        let parsed = (|| {
            Some(ObdRecord {
                vehicle_id: fields.get(vehicle)?.to_string(),
                speed_kmph: number(speed)?,
                engine_rpm: number(rpm)?,
                fuel_level_pct: number(fuel)?,
                engine_temp_c: number(temp)?,
                dtc_code: dtc_code.to_string(),
                dtc: if dtc_code.eq_ignore_ascii_case("none") {
                    Diagnostics::NoIssues
                } else {
                    Diagnostics::from_codes([dtc_code])
                },
                lat: number(lat)?,
                lon: number(lon)?,
            })
        })();

        match parsed {
            Some(record) => records.push(record),
            // +2: header line and 1-based numbering
            None => tracing::warn!("Skipping malformed OBD row at line {}", line_no + 2),
        }
    }

    Ok(records)
}

/// OBD log player for stepping through recorded drives
pub struct ObdPlayer {
    /// Log records
    records: Vec<ObdRecord>,
    /// Current playback position
    position: usize,
}

impl ObdPlayer {
    /// Create a new player
    pub fn new(records: Vec<ObdRecord>) -> Self {
        Self {
            records,
            position: 0,
        }
    }

    /// Load an OBD CSV log from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DatalogError> {
        let file = File::open(path)?;
        Ok(Self::new(parse_obd_csv(BufReader::new(file))?))
    }

    /// Get the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the current position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Seek to a position
    pub fn seek(&mut self, position: usize) {
        self.position = position.min(self.records.len().saturating_sub(1));
    }

    /// Get the current record
    pub fn current(&self) -> Option<&ObdRecord> {
        self.records.get(self.position)
    }

    /// Advance to the next record
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&ObdRecord> {
        if self.position + 1 < self.records.len() {
            self.position += 1;
            self.current()
        } else {
            None
        }
    }

    /// Go to the previous record
    pub fn previous(&mut self) -> Option<&ObdRecord> {
        if self.position > 0 {
            self.position -= 1;
            self.current()
        } else {
            None
        }
    }

    /// Get all records
    pub fn records(&self) -> &[ObdRecord] {
        &self.records
    }

    /// Get values for a specific channel
    pub fn channel_values(&self, channel: &str) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|r| r.channel(channel))
            .collect()
    }
}
