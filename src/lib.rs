//! # Workout Tracking
//!
//! Live GPS workout tracking for mobile fitness apps.
//!
//! This library provides:
//! - Noise filtering of raw location fixes
//! - Incremental distance, average pace and windowed current pace
//! - A pause-aware session clock
//! - Step cadence from a cumulative pedometer stream
//! - Session finalization into splits, elevation gain and calories
//! - Multi-workout totals, personal bests and achievements
//!
//! ## Features
//!
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`serde`** - Serialize summaries and config for persistence
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use workout_tracking::{FinalizeOptions, GpsPoint, WorkoutSession};
//!
//! let mut session = WorkoutSession::default();
//! session.start(0).unwrap();
//!
//! // Location callback
//! for i in 0..=20 {
//!     let fix = GpsPoint::new(60.0 + i as f64 * 0.0005, 24.0, i * 20_000)
//!         .with_accuracy(5.0)
//!         .with_speed(2.8);
//!     if let Some(stats) = session.on_location(fix) {
//!         println!("{:.0} m, {:.0} s/km", stats.distance_meters, stats.current_pace_secs_per_km);
//!     }
//! }
//!
//! let stopped = session.stop(400_000).unwrap();
//! stopped.ensure_saveable().unwrap();
//! let summary = stopped.finalize(&FinalizeOptions::default());
//! assert_eq!(summary.splits.len(), 1);
//! ```

pub mod accumulator;
pub mod cadence;
pub mod clock;
pub mod error;
pub mod filter;
pub mod finalizer;
pub mod format;
pub mod geo_utils;
pub mod history;
pub mod session;

pub use accumulator::{DistanceAccumulator, StatsSnapshot};
pub use cadence::{CadenceEstimator, CadenceResult};
pub use clock::{ClockResult, ClockState, PauseInterval, SessionClock};
pub use error::TrackingError;
pub use filter::{Rejection, SampleFilter};
pub use finalizer::{finalize, ActivityKind, Feeling, FinalizeOptions, Split, WorkoutSummary};
pub use history::{Achievement, PersonalBests, WorkoutHistory, WorkoutTotals};
pub use session::{ListenerId, SensorSubscription, StatsListener, StoppedSession, WorkoutSession};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("WorkoutTracking")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// One location fix as delivered by the platform location provider.
///
/// # Example
/// ```
/// use workout_tracking::GpsPoint;
///
/// let fix = GpsPoint::new(60.1699, 24.9384, 1_700_000_000_000)
///     .with_accuracy(6.0)
///     .with_speed(3.1)
///     .with_altitude(12.5);
/// assert!(fix.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Unix milliseconds
    pub timestamp_ms: i64,
    /// Sensor-reported speed in m/s, if any
    pub speed_mps: Option<f64>,
    /// Horizontal accuracy radius in meters
    pub accuracy_meters: f64,
    pub altitude_meters: Option<f64>,
}

impl GpsPoint {
    /// Create a fix with perfect accuracy and no speed or altitude.
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp_ms,
            speed_mps: None,
            accuracy_meters: 0.0,
            altitude_meters: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy_meters: f64) -> Self {
        self.accuracy_meters = accuracy_meters;
        self
    }

    pub fn with_speed(mut self, speed_mps: f64) -> Self {
        self.speed_mps = Some(speed_mps);
        self
    }

    pub fn with_altitude(mut self, altitude_meters: f64) -> Self {
        self.altitude_meters = Some(altitude_meters);
        self
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box for a recorded track.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// Configuration for the tracking pipeline.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackingConfig {
    /// Fixes with a larger accuracy radius are dropped.
    /// Default: 50.0 meters
    pub max_accuracy_meters: f64,

    /// Fixes reporting a higher speed are dropped as noise.
    /// Default: 15.0 m/s (~54 km/h, out of reach on foot)
    pub max_speed_mps: f64,

    /// Number of trailing fixes used for current pace.
    /// Default: 10
    pub pace_window_size: u32,

    /// Number of pedometer deltas kept for smoothed cadence.
    /// Default: 6
    pub cadence_window_size: u32,

    /// Length of one cadence bucket (and the expected tick interval).
    /// Default: 10.0 seconds
    pub cadence_bucket_seconds: f64,

    /// Body weight for calories when the user has not set one.
    /// Default: 70.0 kg
    pub default_body_weight_kg: f64,

    /// Sessions shorter than this are not offered for saving.
    /// Default: 100.0 meters
    pub min_save_distance_meters: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            max_accuracy_meters: 50.0,
            max_speed_mps: 15.0,
            pace_window_size: 10,
            cadence_window_size: 6,
            cadence_bucket_seconds: 10.0,
            default_body_weight_kg: finalizer::DEFAULT_BODY_WEIGHT_KG,
            min_save_distance_meters: 100.0,
        }
    }
}

impl TrackingConfig {
    /// Reject values that would make the pipeline misbehave.
    ///
    /// ```
    /// use workout_tracking::TrackingConfig;
    ///
    /// assert!(TrackingConfig::default().validate().is_ok());
    ///
    /// let bad = TrackingConfig { cadence_bucket_seconds: 0.0, ..TrackingConfig::default() };
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(&self) -> error::Result<()> {
        let positive = [
            ("max_accuracy_meters", self.max_accuracy_meters),
            ("max_speed_mps", self.max_speed_mps),
            ("cadence_bucket_seconds", self.cadence_bucket_seconds),
            ("default_body_weight_kg", self.default_body_weight_kg),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(TrackingError::InvalidConfig(format!("{} must be positive, got {}", name, value)));
            }
        }
        if !(self.min_save_distance_meters >= 0.0) || !self.min_save_distance_meters.is_finite() {
            return Err(TrackingError::InvalidConfig(format!(
                "min_save_distance_meters must be non-negative, got {}",
                self.min_save_distance_meters
            )));
        }
        if self.pace_window_size < 2 {
            return Err(TrackingError::InvalidConfig("pace_window_size must be at least 2".to_string()));
        }
        if self.cadence_window_size == 0 {
            return Err(TrackingError::InvalidConfig("cadence_window_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::{info, warn};
    use std::sync::{Arc, Mutex, MutexGuard};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }

    // ========================================================================
    // Stats Callback Interface (for real-time updates to mobile)
    // ========================================================================

    /// Live stats as sent across the FFI boundary.
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiStatsSnapshot {
        pub elapsed_secs: f64,
        pub distance_meters: f64,
        pub current_pace_secs_per_km: f64,
        pub average_pace_secs_per_km: f64,
        pub is_paused: bool,
        pub steps: u64,
        pub cadence_spm: f64,
        pub coordinates: Vec<GpsPoint>,
    }

    impl From<&StatsSnapshot<'_>> for FfiStatsSnapshot {
        fn from(s: &StatsSnapshot<'_>) -> Self {
            Self {
                elapsed_secs: s.elapsed_secs,
                distance_meters: s.distance_meters,
                current_pace_secs_per_km: s.current_pace_secs_per_km,
                average_pace_secs_per_km: s.average_pace_secs_per_km,
                is_paused: s.is_paused,
                steps: s.steps,
                cadence_spm: s.cadence_spm,
                coordinates: s.coordinates.to_vec(),
            }
        }
    }

    /// Callback interface for receiving live stats after each accepted fix.
    /// Implement this in Kotlin/Swift; it must return quickly.
    #[uniffi::export(callback_interface)]
    pub trait StatsCallback: Send + Sync {
        fn on_stats(&self, snapshot: FfiStatsSnapshot);
    }

    /// Result of stopping a session from the app.
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiStoppedSession {
        pub points: Vec<GpsPoint>,
        pub clock: ClockResult,
        pub cadence: CadenceResult,
        pub distance_meters: f64,
        /// False when the session is under the minimum save distance
        pub saveable: bool,
    }

    /// A tracking session owned by the app, timed with the system clock.
    ///
    /// The app callback lives outside the session lock and is invoked only
    /// after the lock is released, so it may call back into this object.
    #[derive(uniffi::Object)]
    pub struct TrackingSession {
        inner: Mutex<WorkoutSession>,
        callback: Mutex<Option<Arc<dyn StatsCallback>>>,
    }

    impl TrackingSession {
        fn lock(&self) -> MutexGuard<'_, WorkoutSession> {
            // A panicking callback must not make the session unusable.
            self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        fn callback_slot(&self) -> MutexGuard<'_, Option<Arc<dyn StatsCallback>>> {
            self.callback.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    #[uniffi::export]
    impl TrackingSession {
        #[uniffi::constructor]
        pub fn new(config: TrackingConfig) -> Result<Arc<Self>, TrackingError> {
            init_logging();
            let session = WorkoutSession::new(config)?;
            Ok(Arc::new(Self {
                inner: Mutex::new(session),
                callback: Mutex::new(None),
            }))
        }

        /// Start tracking; `callback` receives stats until the session stops.
        pub fn start(&self, callback: Box<dyn StatsCallback>) -> Result<(), TrackingError> {
            self.lock().start(now_ms())?;
            *self.callback_slot() = Some(Arc::from(callback));
            info!("[WorkoutTracking] session started from FFI");
            Ok(())
        }

        pub fn pause(&self) {
            self.lock().pause(now_ms());
        }

        pub fn resume(&self) {
            self.lock().resume(now_ms());
        }

        pub fn is_tracking(&self) -> bool {
            self.lock().is_tracking()
        }

        pub fn is_paused(&self) -> bool {
            self.lock().is_paused()
        }

        /// Feed a fix. Returns true if it was accepted.
        pub fn on_location(&self, point: GpsPoint) -> bool {
            let snapshot = self.lock().on_location(point).map(|s| FfiStatsSnapshot::from(&s));
            let Some(snapshot) = snapshot else {
                return false;
            };
            let callback = self.callback_slot().clone();
            if let Some(callback) = callback {
                callback.on_stats(snapshot);
            }
            true
        }

        pub fn on_steps(&self, cumulative_steps: u64) {
            self.lock().on_steps(cumulative_steps);
        }

        pub fn on_cadence_tick(&self) -> Option<f64> {
            self.lock().on_cadence_tick()
        }

        pub fn snapshot(&self) -> FfiStatsSnapshot {
            let session = self.lock();
            let snapshot = session.snapshot(now_ms());
            FfiStatsSnapshot::from(&snapshot)
        }

        pub fn stop(&self) -> Result<FfiStoppedSession, TrackingError> {
            self.callback_slot().take();
            let stopped = self.lock().stop(now_ms())?;
            let saveable = stopped.ensure_saveable();
            if let Err(ref e) = saveable {
                warn!("[WorkoutTracking] {}", e);
            }
            Ok(FfiStoppedSession {
                distance_meters: stopped.distance_meters(),
                saveable: saveable.is_ok(),
                points: stopped.points,
                clock: stopped.clock,
                cadence: stopped.cadence,
            })
        }
    }

    /// Build the summary for a stopped session.
    #[uniffi::export]
    pub fn finalize_workout(
        stopped: FfiStoppedSession,
        options: FinalizeOptions,
    ) -> WorkoutSummary {
        init_logging();
        info!(
            "[WorkoutTracking] finalize_workout called with {} points, {:.0}m",
            stopped.points.len(),
            stopped.distance_meters
        );
        crate::finalize(stopped.points, stopped.clock, stopped.cadence, &options)
    }

    /// Get default configuration.
    #[uniffi::export]
    pub fn default_tracking_config() -> TrackingConfig {
        TrackingConfig::default()
    }

    /// Achievements newly unlocked by `latest`, given all earlier workouts.
    #[uniffi::export]
    pub fn ffi_new_achievements(earlier: Vec<WorkoutSummary>, latest: WorkoutSummary) -> Vec<Achievement> {
        let history = WorkoutHistory::from_summaries(&earlier);
        history.new_achievements(&latest)
    }

    #[uniffi::export]
    pub fn ffi_format_pace(secs_per_km: f64) -> String {
        crate::format::format_pace(secs_per_km)
    }

    #[uniffi::export]
    pub fn ffi_format_duration(secs: f64) -> String {
        crate::format::format_duration(secs)
    }

    #[uniffi::export]
    pub fn ffi_format_distance(meters: f64) -> String {
        crate::format::format_distance(meters)
    }

}

// ============================================================================
// Tests
// ============================================================================
