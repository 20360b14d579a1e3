//! The workout session engine.
//!
//! One [`WorkoutSession`] owns every piece of live state for a tracked
//! activity: the sample filter, the pause-aware clock, the distance
//! accumulator and the cadence estimator. Platform code feeds it location
//! fixes, pedometer totals and cadence ticks, and registers listeners that
//! receive a [`StatsSnapshot`] after every accepted fix.
//!
//! ## Lifecycle
//!
//! ```text
//!            start()            pause()
//!   Idle ───────────▶ Running ◀────────▶ Paused
//!    ▲                  │     resume()     │
//!    └──── stop() ──────┴──────────────────┘
//! ```
//!
//! `stop()` tears down before it summarises: every attached
//! [`SensorSubscription`] is cancelled and every listener dropped, so no
//! platform callback can reach the session after it has been reset. Dropping
//! the session performs the same teardown.
//!
//! ## Example
//!
//! ```
//! use workout_tracking::{GpsPoint, StatsSnapshot, TrackingConfig, WorkoutSession};
//!
//! let mut session = WorkoutSession::new(TrackingConfig::default()).unwrap();
//! session.start(0).unwrap();
//! session.subscribe(Box::new(|snap: &StatsSnapshot<'_>| println!("{:.0} m", snap.distance_meters)));
//!
//! for (i, lng) in [24.00, 24.01, 24.02].iter().enumerate() {
//!     let fix = GpsPoint::new(60.0, *lng, i as i64 * 1_000).with_accuracy(5.0);
//!     session.on_location(fix);
//! }
//!
//! let stopped = session.stop(2_000).unwrap();
//! assert!(stopped.ensure_saveable().is_ok());
//! let summary = stopped.finalize(&Default::default());
//! assert!(summary.distance_meters > 1_100.0);
//! ```

use log::{debug, info, warn};

use crate::accumulator::{DistanceAccumulator, StatsSnapshot};
use crate::cadence::{CadenceEstimator, CadenceResult};
use crate::clock::{ClockResult, ClockState, SessionClock};
use crate::error::{Result, TrackingError};
use crate::filter::SampleFilter;
use crate::finalizer::{finalize, FinalizeOptions, WorkoutSummary};
use crate::geo_utils::polyline_length;
use crate::{GpsPoint, TrackingConfig};

/// Handle to a platform sensor stream (location updates, pedometer, a timer).
///
/// The session cancels every attached subscription exactly once when it stops.
pub trait SensorSubscription: Send {
    fn cancel(&mut self);
}

impl<F: FnMut() + Send> SensorSubscription for F {
    fn cancel(&mut self) {
        self()
    }
}

/// Receives a snapshot after every accepted fix. Must not block.
pub type StatsListener = Box<dyn Fn(&StatsSnapshot<'_>) + Send>;

/// Identifies a registered listener for [`WorkoutSession::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct WorkoutSession {
    config: TrackingConfig,
    filter: SampleFilter,
    clock: SessionClock,
    accumulator: DistanceAccumulator,
    cadence: CadenceEstimator,
    listeners: Vec<(ListenerId, StatsListener)>,
    next_listener_id: u64,
    subscriptions: Vec<Box<dyn SensorSubscription>>,
}

impl WorkoutSession {
    /// Create an idle session. Fails if the config is unusable.
    pub fn new(config: TrackingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: TrackingConfig) -> Self {
        Self {
            filter: SampleFilter::new(&config),
            clock: SessionClock::new(),
            accumulator: DistanceAccumulator::new(&config),
            cadence: CadenceEstimator::new(&config),
            listeners: Vec::new(),
            next_listener_id: 0,
            subscriptions: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn is_tracking(&self) -> bool {
        self.clock.is_tracking()
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Begin a new session at `now_ms`.
    ///
    /// A previous session must have been stopped first.
    pub fn start(&mut self, now_ms: i64) -> Result<()> {
        if self.clock.is_tracking() {
            return Err(TrackingError::AlreadyTracking);
        }
        self.accumulator = DistanceAccumulator::new(&self.config);
        self.cadence = CadenceEstimator::new(&self.config);
        self.clock.start(now_ms);
        info!("[WorkoutSession] started at {}", now_ms);
        Ok(())
    }

    /// Pause timing and ignore fixes until resumed. No-op unless running.
    pub fn pause(&mut self, now_ms: i64) {
        if self.clock.state() == ClockState::Running {
            info!("[WorkoutSession] paused at {}", now_ms);
        }
        self.clock.pause(now_ms);
    }

    /// Resume after a pause. No-op unless paused.
    pub fn resume(&mut self, now_ms: i64) {
        if self.clock.is_paused() {
            info!("[WorkoutSession] resumed at {}", now_ms);
        }
        self.clock.resume(now_ms);
    }

    /// End the session from either running or paused.
    ///
    /// Teardown runs even when nothing was being tracked, so calling `stop`
    /// twice is harmless; the second call reports [`TrackingError::NotTracking`].
    pub fn stop(&mut self, now_ms: i64) -> Result<StoppedSession> {
        self.teardown();

        let clock = self.clock.stop(now_ms).ok_or(TrackingError::NotTracking)?;
        let cadence = self.cadence.finish(clock.duration_secs);
        let points = self.accumulator.take_points();

        info!(
            "[WorkoutSession] stopped: {} fixes, {:.0}s active, {:.0}s paused, {} steps",
            points.len(),
            clock.duration_secs,
            clock.paused_duration_secs,
            cadence.total_steps
        );

        Ok(StoppedSession {
            points,
            clock,
            cadence,
            min_save_distance_meters: self.config.min_save_distance_meters,
            default_body_weight_kg: self.config.default_body_weight_kg,
        })
    }

    fn teardown(&mut self) {
        if !self.subscriptions.is_empty() {
            debug!("[WorkoutSession] cancelling {} sensor subscriptions", self.subscriptions.len());
        }
        for mut subscription in self.subscriptions.drain(..) {
            subscription.cancel();
        }
        self.listeners.clear();
    }

    // ------------------------------------------------------------------
    // Sensor input
    // ------------------------------------------------------------------

    /// Feed a location fix.
    ///
    /// Returns the new snapshot if the fix was accepted. Fixes arriving while
    /// idle or paused, and fixes the filter rejects, change nothing.
    pub fn on_location(&mut self, point: GpsPoint) -> Option<StatsSnapshot<'_>> {
        match self.clock.state() {
            ClockState::Idle => {
                debug!("[WorkoutSession] fix ignored: not tracking");
                return None;
            }
            ClockState::Paused => {
                debug!("[WorkoutSession] fix ignored: paused");
                return None;
            }
            ClockState::Running => {}
        }
        if !self.filter.accept(&point) {
            return None;
        }

        self.accumulator.push(point);
        let elapsed_secs = self.clock.elapsed_secs(point.timestamp_ms);
        let snapshot = StatsSnapshot {
            steps: self.cadence.steps(),
            cadence_spm: self.cadence.cadence_spm(),
            ..self.accumulator.snapshot(elapsed_secs, false)
        };

        for (_, listener) in &self.listeners {
            listener(&snapshot);
        }
        Some(snapshot)
    }

    /// Feed a cumulative pedometer total.
    ///
    /// While paused the total is tracked but not counted toward cadence.
    pub fn on_steps(&mut self, cumulative_steps: u64) {
        match self.clock.state() {
            ClockState::Idle => debug!("[WorkoutSession] step reading ignored: not tracking"),
            ClockState::Paused => self.cadence.skip_reading(cumulative_steps),
            ClockState::Running => {
                self.cadence.on_reading(cumulative_steps);
            }
        }
    }

    /// Periodic cadence tick (every `cadence_bucket_seconds`).
    ///
    /// Returns the refreshed smoothed cadence, or `None` while idle or paused.
    pub fn on_cadence_tick(&mut self) -> Option<f64> {
        if self.clock.state() != ClockState::Running {
            return None;
        }
        Some(self.cadence.tick())
    }

    /// Current stats for a UI refresh timer.
    pub fn snapshot(&self, now_ms: i64) -> StatsSnapshot<'_> {
        StatsSnapshot {
            steps: self.cadence.steps(),
            cadence_spm: self.cadence.cadence_spm(),
            ..self.accumulator.snapshot(self.clock.elapsed_secs(now_ms), self.clock.is_paused())
        }
    }

    // ------------------------------------------------------------------
    // Listeners and subscriptions
    // ------------------------------------------------------------------

    /// Register a snapshot listener. Listeners are dropped when the session stops.
    pub fn subscribe(&mut self, listener: StatsListener) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Hand over a platform subscription to be cancelled when the session stops.
    ///
    /// Attaching to an idle session cancels the subscription immediately.
    pub fn attach_subscription(&mut self, mut subscription: Box<dyn SensorSubscription>) {
        if !self.clock.is_tracking() {
            warn!("[WorkoutSession] subscription attached while idle, cancelling it");
            subscription.cancel();
            return;
        }
        self.subscriptions.push(subscription);
    }
}

impl Default for WorkoutSession {
    fn default() -> Self {
        Self::with_valid_config(TrackingConfig::default())
    }
}

impl Drop for WorkoutSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// A stopped session waiting to be summarised.
#[derive(Debug, Clone)]
pub struct StoppedSession {
    pub points: Vec<GpsPoint>,
    pub clock: ClockResult,
    pub cadence: CadenceResult,
    min_save_distance_meters: f64,
    default_body_weight_kg: f64,
}

impl StoppedSession {
    /// Distance over the retained fixes.
    pub fn distance_meters(&self) -> f64 {
        polyline_length(&self.points)
    }

    /// Caller-side gate before saving: rejects sessions under the configured
    /// minimum distance. The finalizer itself never refuses.
    pub fn ensure_saveable(&self) -> Result<()> {
        let distance_meters = self.distance_meters();
        if distance_meters < self.min_save_distance_meters {
            return Err(TrackingError::SessionTooShort {
                distance_meters,
                minimum_meters: self.min_save_distance_meters,
            });
        }
        Ok(())
    }

    /// Produce the summary, using the configured body weight unless a usable
    /// one is given.
    pub fn finalize(self, options: &FinalizeOptions) -> WorkoutSummary {
        let body_weight_kg = options
            .body_weight_kg
            .filter(|w| *w > 0.0 && w.is_finite())
            .unwrap_or(self.default_body_weight_kg);
        let options = FinalizeOptions {
            body_weight_kg: Some(body_weight_kg),
            ..options.clone()
        };
        finalize(self.points, self.clock, self.cadence, &options)
    }
}
