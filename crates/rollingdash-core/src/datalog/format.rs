//! Log file formats
//!
//! Exports recorded snapshots as CSV or JSON lines.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::DatalogError;
use crate::telemetry::VehicleSnapshot;

/// CSV header, in column order
pub const CSV_COLUMNS: &[&str] = &[
    "timestamp",
    "isDriving",
    "speed",
    "rpm",
    "fuelLevel",
    "engineTemp",
    "batteryLevel",
    "efficiency",
    "range",
    "totalMileage",
    "latitude",
    "longitude",
    "diagnostics",
    "engineLoad",
    "throttlePosition",
    "dataPointsCollected",
    "dataPointsShared",
    "sharingEnabled",
    "simulatedEarnings",
    "emissionsReduced",
    "powerUsage",
];

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Comma-separated values
    Csv,
    /// One JSON object per line
    JsonLines,
}

impl LogFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "csv" => Some(LogFormat::Csv),
            "jsonl" | "ndjson" => Some(LogFormat::JsonLines),
            _ => None,
        }
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            LogFormat::Csv => "csv",
            LogFormat::JsonLines => "jsonl",
        }
    }
}

/// Write snapshots as CSV
pub fn write_csv<'a, W, I>(writer: &mut W, snapshots: I) -> Result<(), DatalogError>
where
    W: Write,
    I: IntoIterator<Item = &'a VehicleSnapshot>,
{
    writeln!(writer, "{}", CSV_COLUMNS.join(","))?;

    for s in snapshots {
        // Codes never contain commas; join multiple with ';'
        let diagnostics: Vec<String> = s.diagnostics.clone().into();
        writeln!(
            writer,
            "{},{},{:.2},{:.0},{:.2},{:.2},{:.2},{:.2},{:.2},{:.3},{},{},{},{:.2},{:.2},{},{},{},{},{:.3},{:.3}",
            s.timestamp,
            s.is_driving,
            s.speed,
            s.rpm,
            s.fuel_level,
            s.engine_temp,
            s.battery_level,
            s.efficiency,
            s.range,
            s.total_mileage,
            s.gps.latitude,
            s.gps.longitude,
            diagnostics.join(";"),
            s.engine_load,
            s.throttle_position,
            s.data_points_collected,
            s.data_points_shared,
            s.sharing_enabled,
            s.simulated_earnings,
            s.emissions_reduced,
            s.power_usage,
        )?;
    }

    writer.flush()?;
    Ok(())
}

/// Write snapshots as JSON lines
pub fn write_json_lines<'a, W, I>(writer: &mut W, snapshots: I) -> Result<(), DatalogError>
where
    W: Write,
    I: IntoIterator<Item = &'a VehicleSnapshot>,
{
    for s in snapshots {
        serde_json::to_writer(&mut *writer, s)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Export snapshots to a file, picking the format from its extension
pub fn export<'a, P, I>(path: P, snapshots: I) -> Result<LogFormat, DatalogError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a VehicleSnapshot>,
{
    let path = path.as_ref();
    let format = LogFormat::from_extension(path)
        .ok_or_else(|| DatalogError::UnsupportedFormat(path.display().to_string()))?;

    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        LogFormat::Csv => write_csv(&mut writer, snapshots)?,
        LogFormat::JsonLines => write_json_lines(&mut writer, snapshots)?,
    }
    tracing::info!("Exported session log to {}", path.display());
    Ok(format)
}
