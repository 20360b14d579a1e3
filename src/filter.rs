//! GPS sample filter.
//!
//! Drops fixes that are too uncertain or too fast to be foot travel. The
//! decision is a pure function of the fix and the configured thresholds, so
//! replaying a recorded stream always yields the same accept/reject sequence.

use log::debug;

use crate::{GpsPoint, TrackingConfig};

/// Why a fix was dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// Latitude/longitude not finite or outside WGS84 range
    InvalidCoordinates,
    /// Horizontal accuracy radius above the configured maximum (meters)
    LowAccuracy(f64),
    /// Reported speed above the configured maximum (m/s)
    ImplausibleSpeed(f64),
}

/// Stateless accept/reject gate in front of the accumulator.
#[derive(Debug, Clone, Copy)]
pub struct SampleFilter {
    max_accuracy_meters: f64,
    max_speed_mps: f64,
}

impl SampleFilter {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            max_accuracy_meters: config.max_accuracy_meters,
            max_speed_mps: config.max_speed_mps,
        }
    }

    /// Classify a fix. `Ok(())` means it should be forwarded.
    ///
    /// A missing speed never causes rejection; a NaN accuracy does.
    pub fn check(&self, point: &GpsPoint) -> Result<(), Rejection> {
        if !point.is_valid() {
            return Err(Rejection::InvalidCoordinates);
        }
        if !(point.accuracy_meters <= self.max_accuracy_meters) {
            return Err(Rejection::LowAccuracy(point.accuracy_meters));
        }
        if let Some(speed) = point.speed_mps {
            if speed > self.max_speed_mps {
                return Err(Rejection::ImplausibleSpeed(speed));
            }
        }
        Ok(())
    }

    /// Returns `true` if the fix should be forwarded to the accumulator.
    ///
    /// ```
    /// use workout_tracking::{GpsPoint, SampleFilter, TrackingConfig};
    ///
    /// let filter = SampleFilter::new(&TrackingConfig::default());
    /// let good = GpsPoint::new(60.0, 24.0, 0).with_accuracy(5.0).with_speed(3.0);
    /// let blurry = good.with_accuracy(80.0);
    ///
    /// assert!(filter.accept(&good));
    /// assert!(!filter.accept(&blurry));
    /// ```
    pub fn accept(&self, point: &GpsPoint) -> bool {
        match self.check(point) {
            Ok(()) => true,
            Err(reason) => {
                debug!("[SampleFilter] Dropped fix at {}: {:?}", point.timestamp_ms, reason);
                false
            }
        }
    }
}

impl Default for SampleFilter {
    fn default() -> Self {
        Self::new(&TrackingConfig::default())
    }
}
