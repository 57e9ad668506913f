//! Earnings accumulation
//!
//! Sums the per-tick `simulated_earnings` strings into a running DCL total.
//! Malformed amounts count as zero.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::VehicleSnapshot;

/// Parse a DCL amount. Anything that is not a finite, non-negative number is 0.
pub fn parse_earnings(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// Add a snapshot's earnings to a running total
pub fn accumulate(total: f64, snapshot: &VehicleSnapshot) -> f64 {
    let amount = parse_earnings(&snapshot.simulated_earnings);
    if amount == 0.0 && snapshot.simulated_earnings.trim().parse::<f64>().is_err() {
        tracing::warn!(
            "Ignoring malformed earnings amount {:?}",
            snapshot.simulated_earnings
        );
    }
    total + amount
}

/// Format a DCL amount for display
pub fn format_tokens(amount: f64) -> String {
    format!("{:.4}", amount)
}

/// Running earnings total for a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsAccumulator {
    total: f64,
    ticks: u64,
    last_contribution: f64,
}

impl EarningsAccumulator {
    /// Start from zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from an existing total
    pub fn with_total(total: f64) -> Self {
        Self {
            total: if total.is_finite() { total.max(0.0) } else { 0.0 },
            ..Self::default()
        }
    }

    /// Fold in one snapshot, returning the new total
    pub fn add(&mut self, snapshot: &VehicleSnapshot) -> f64 {
        let before = self.total;
        self.total = accumulate(self.total, snapshot);
        self.last_contribution = self.total - before;
        self.ticks += 1;
        self.total
    }

    /// Total DCL earned
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Total formatted to 4 decimal places
    pub fn formatted_total(&self) -> String {
        format_tokens(self.total)
    }

    /// Snapshots folded in so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Amount added by the most recent snapshot
    pub fn last_contribution(&self) -> f64 {
        self.last_contribution
    }

    /// Earning rate per minute if every tick paid like the last one
    pub fn per_minute(&self, tick_interval: Duration) -> f64 {
        let secs = tick_interval.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.last_contribution * (60.0 / secs)
    }

    /// Back to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
