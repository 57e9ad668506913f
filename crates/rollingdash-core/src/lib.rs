//! # RollingDash Core Library
//!
//! Simulated vehicle telemetry and data-marketplace rewards for the
//! RollingDash app.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Time-of-day biased vehicle snapshot generation
//! - Rolling per-metric history for charts
//! - Token earnings accumulation
//! - Data listing catalog with sharing toggles and reward math
//! - Timer-driven telemetry service with cancellation
//! - Session export and OBD log playback
//!
//! ## Example
//!
//! ```rust,ignore
//! use rollingdash_core::prelude::*;
//!
//! let config = SimulatorConfig::default();
//! let service = TelemetryService::new(config);
//! service.start().await;
//!
//! let mut updates = service.subscribe();
//! let update = updates.recv().await?;
//! println!("Speed: {:.1} km/h", update.snapshot.speed);
//!
//! service.stop().await;
//! ```

pub mod config;
pub mod datalog;
pub mod marketplace;
pub mod stream;
pub mod telemetry;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ConfigError, SimulatorConfig};
    pub use crate::datalog::{DatalogError, ObdPlayer, SessionRecorder};
    pub use crate::marketplace::{
        calculate_reward, toggle_sharing, total_daily_reward, DataCategory, DataListingItem,
        Marketplace, PrivacyLevel,
    };
    pub use crate::stream::{DashboardState, TelemetryService, TelemetryUpdate};
    pub use crate::telemetry::{
        accumulate, generate_snapshot, Clock, Diagnostics, EarningsAccumulator, FixedClock,
        HistoryBuffer, Metric, SystemClock, TelemetrySimulator, VehicleSnapshot,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
