//! Data Logging
//!
//! Records telemetry sessions, exports them, and replays OBD logs.

mod format;
mod playback;
mod recorder;

pub use format::{export, write_csv, write_json_lines, LogFormat, CSV_COLUMNS};
pub use playback::{parse_obd_csv, ObdPlayer, ObdRecord};
pub use recorder::{SessionRecorder, MAX_RECORDED_SNAPSHOTS};

use std::io;
use thiserror::Error;

/// Errors reading or writing log files
#[derive(Error, Debug)]
pub enum DatalogError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Snapshot could not be encoded
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV header lacks a required column
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// File extension is not a known log format
    #[error("Unsupported log format: {0}")]
    UnsupportedFormat(String),
}
