//! Telemetry streaming
//!
//! Runs the simulator on a repeating timer. Each tick generates a snapshot
//! synchronously and folds it into the shared dashboard state under a single
//! lock, so a tick is always complete before anything reads the state.
//! Sharing toggles from the UI take the same lock, which keeps the toggle and
//! the reward recomputation atomic with respect to ticks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::SimulatorConfig;
use crate::datalog::SessionRecorder;
use crate::marketplace::Marketplace;
use crate::telemetry::{
    Clock, EarningsAccumulator, HistoryBuffer, SystemClock, TelemetrySimulator, VehicleSnapshot,
};

/// Updates buffered per subscriber before old ones are dropped
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Everything the dashboard reads
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Most recent snapshot, kept across stop/start
    pub latest: Option<VehicleSnapshot>,
    /// Chart windows
    pub history: HistoryBuffer,
    /// Running DCL total
    pub earnings: EarningsAccumulator,
    /// Listings and sharing flags
    pub marketplace: Marketplace,
    /// Optional session log
    pub recorder: SessionRecorder,
}

impl DashboardState {
    /// Fresh state sized from configuration
    pub fn new(config: &SimulatorConfig) -> Self {
        let mut recorder = SessionRecorder::new();
        if config.record_session {
            recorder.start();
        }
        Self {
            latest: None,
            history: HistoryBuffer::new(config.history_capacity),
            earnings: EarningsAccumulator::new(),
            marketplace: Marketplace::default(),
            recorder,
        }
    }

    /// Fold a snapshot into history, earnings and the recorder
    pub fn apply(&mut self, snapshot: VehicleSnapshot) -> f64 {
        self.history.record(&snapshot);
        let total = self.earnings.add(&snapshot);
        self.recorder.record(&snapshot);
        self.latest = Some(snapshot);
        total
    }
}

/// Published after every tick
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryUpdate {
    /// Session that produced the update
    pub session_id: Uuid,
    /// 1-based tick number within the session
    pub tick: u64,
    /// Snapshot generated on this tick
    pub snapshot: VehicleSnapshot,
    /// Earnings total after this tick
    pub total_earnings: f64,
}

/// Identity of one running session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Session id
    pub id: Uuid,
    /// When the session started
    pub started_at: DateTime<Utc>,
}

struct RunningTask {
    info: SessionInfo,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Timer-driven telemetry service.
///
/// Call [`start`](Self::start) when the dashboard becomes visible and
/// [`stop`](Self::stop) when it goes away.
pub struct TelemetryService {
    config: SimulatorConfig,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<DashboardState>>,
    updates: broadcast::Sender<TelemetryUpdate>,
    task: Mutex<Option<RunningTask>>,
}

impl TelemetryService {
    /// Service on the local wall clock
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Service on a caller-supplied clock
    pub fn with_clock(config: SimulatorConfig, clock: Arc<dyn Clock>) -> Self {
        let config = config.sanitized();
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(DashboardState::new(&config))),
            config,
            clock,
            updates,
            task: Mutex::new(None),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Tick interval in use
    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval()
    }

    /// Subscribe to per-tick updates
    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryUpdate> {
        self.updates.subscribe()
    }

    /// Start ticking. Returns the running session; a no-op if already running.
    ///
    /// A restarted session continues from the last snapshot, so the odometer
    /// keeps counting up. A seeded configuration is offset by the ticks already
    /// taken so a restart does not replay the same draws.
    pub async fn start(&self) -> SessionInfo {
        let mut task_guard = self.task.lock().await;
        if let Some(running) = task_guard.as_ref() {
            return running.info;
        }

        let info = SessionInfo {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
        };
        let (previous, ticks) = {
            let state = self.state.lock().await;
            (state.latest.clone(), state.earnings.ticks())
        };
        let session_config = SimulatorConfig {
            seed: self.config.seed.map(|seed| seed.wrapping_add(ticks)),
            ..self.config.clone()
        };
        let simulator = TelemetrySimulator::from_config(&session_config).resume_from(previous);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_ticker(
            info.id,
            simulator,
            self.config.tick_interval(),
            Arc::clone(&self.clock),
            Arc::clone(&self.state),
            self.updates.clone(),
            cancel.clone(),
        ));

        tracing::info!(
            "Telemetry session {} started ({} ms interval)",
            info.id,
            self.config.tick_interval().as_millis()
        );
        *task_guard = Some(RunningTask {
            info,
            cancel,
            handle,
        });
        info
    }

    /// Stop ticking and wait for the task to finish. A no-op when stopped.
    pub async fn stop(&self) {
        let running = self.task.lock().await.take();
        if let Some(running) = running {
            running.cancel.cancel();
            if let Err(e) = running.handle.await {
                tracing::warn!("Telemetry task ended abnormally: {e}");
            }
            tracing::info!("Telemetry session {} stopped", running.info.id);
        }
    }

    /// Whether a session is running
    pub async fn is_running(&self) -> bool {
        self.task.lock().await.is_some()
    }

    /// Current session, if running
    pub async fn session(&self) -> Option<SessionInfo> {
        self.task.lock().await.as_ref().map(|t| t.info)
    }

    /// Copy of the dashboard state
    pub async fn state(&self) -> DashboardState {
        self.state.lock().await.clone()
    }

    /// Flip a listing's sharing flag and return the new daily reward total.
    /// Unknown ids leave the listings unchanged.
    pub async fn toggle_sharing(&self, id: &str) -> f64 {
        let mut state = self.state.lock().await;
        state.marketplace.toggle(id);
        state.marketplace.total_daily_reward()
    }

    /// Set a listing's sharing flag and return the new daily reward total
    pub async fn set_sharing(&self, id: &str, shared: bool) -> f64 {
        let mut state = self.state.lock().await;
        state.marketplace.set_sharing(id, shared);
        state.marketplace.total_daily_reward()
    }

    /// Running earnings total
    pub async fn total_earnings(&self) -> f64 {
        self.state.lock().await.earnings.total()
    }
}

impl Drop for TelemetryService {
    fn drop(&mut self) {
        if let Some(running) = self.task.get_mut().take() {
            running.cancel.cancel();
        }
    }
}

async fn run_ticker(
    session_id: Uuid,
    mut simulator: TelemetrySimulator,
    interval: Duration,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<DashboardState>>,
    updates: broadcast::Sender<TelemetryUpdate>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let snapshot = simulator.tick(clock.as_ref());
        let total_earnings = {
            let mut guard = state.lock().await;
            guard.apply(snapshot.clone())
        };
        tick += 1;
        tracing::debug!(
            "Tick {tick}: driving={} speed={:.1} earnings={}",
            snapshot.is_driving,
            snapshot.speed,
            snapshot.simulated_earnings
        );

        // No subscribers is fine
        let _ = updates.send(TelemetryUpdate {
            session_id,
            tick,
            snapshot,
            total_earnings,
        });
    }
}
