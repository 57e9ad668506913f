//! Session recorder
//!
//! Keeps every snapshot of a session in memory for later export.

use std::collections::VecDeque;
use std::time::Duration;

use crate::telemetry::VehicleSnapshot;

/// Maximum snapshots kept before the oldest are dropped
pub const MAX_RECORDED_SNAPSHOTS: usize = 10_000;

/// Session recorder state
#[derive(Debug, Clone)]
pub struct SessionRecorder {
    /// Recorded snapshots, oldest first
    buffer: VecDeque<VehicleSnapshot>,
    /// Whether recording is active
    is_recording: bool,
    /// Maximum number of snapshots kept
    limit: usize,
}

impl SessionRecorder {
    /// Create a stopped recorder with the default limit
    pub fn new() -> Self {
        Self::with_limit(MAX_RECORDED_SNAPSHOTS)
    }

    /// Create a stopped recorder holding at most `limit` snapshots
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            buffer: VecDeque::with_capacity(limit.min(MAX_RECORDED_SNAPSHOTS)),
            is_recording: false,
            limit,
        }
    }

    /// Start recording, discarding anything from a previous session
    pub fn start(&mut self) {
        self.buffer.clear();
        self.is_recording = true;
    }

    /// Stop recording; recorded snapshots are kept
    pub fn stop(&mut self) {
        self.is_recording = false;
    }

    /// Check if recording is active
    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    /// Record a snapshot (ignored while stopped)
    pub fn record(&mut self, snapshot: &VehicleSnapshot) {
        if !self.is_recording {
            return;
        }

        if self.buffer.len() >= self.limit {
            self.buffer.pop_front();
        }
        self.buffer.push_back(snapshot.clone());
    }

    /// Number of recorded snapshots
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Recorded snapshots, oldest first
    pub fn snapshots(&self) -> impl Iterator<Item = &VehicleSnapshot> {
        self.buffer.iter()
    }

    /// Wall-clock span between the first and last snapshot
    pub fn duration(&self) -> Duration {
        match (self.buffer.front(), self.buffer.back()) {
            (Some(first), Some(last)) => {
                let ms = last.timestamp.saturating_sub(first.timestamp).max(0);
                Duration::from_millis(ms as u64)
            }
            _ => Duration::ZERO,
        }
    }

    /// Clear all recorded data
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new()
    }
}
