//! Error type for the tracking engine.
//!
//! Sensor noise and redundant pause/resume calls are not errors; they are
//! dropped or ignored silently. The variants here cover lifecycle misuse,
//! the caller-side save gate and bad configuration.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
pub enum TrackingError {
    #[error("A workout session is already being tracked")]
    AlreadyTracking,

    #[error("No workout session is being tracked")]
    NotTracking,

    #[error("Session too short to save: {distance_meters:.0}m recorded, {minimum_meters:.0}m required")]
    SessionTooShort {
        distance_meters: f64,
        minimum_meters: f64,
    },

    #[error("Invalid tracking config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TrackingError>;
