//! Session finalization.
//!
//! Turns the retained fixes of a stopped session into one immutable
//! [`WorkoutSummary`]. Distance and pace are recomputed from the full point
//! list, independent of whatever the live accumulator last reported.
//!
//! Minimum-distance gating is the caller's job (see
//! [`StoppedSession::ensure_saveable`](crate::StoppedSession::ensure_saveable));
//! this module finalizes whatever it is given.

use crate::accumulator::pace_secs_per_km;
use crate::cadence::CadenceResult;
use crate::clock::ClockResult;
use crate::geo_utils::{compute_bounds, haversine_distance};
use crate::{Bounds, GpsPoint};

/// Used for calories when no usable body weight is supplied.
pub const DEFAULT_BODY_WEIGHT_KG: f64 = 70.0;

const SPLIT_METERS: f64 = 1000.0;

/// Kind of workout, recorded on the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivityKind {
    #[default]
    Run,
    Walk,
    Hike,
}

/// How the user felt afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Feeling {
    Great,
    Good,
    Okay,
    Tired,
    Exhausted,
}

/// Per-session inputs the sensors can't provide.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct FinalizeOptions {
    pub activity: ActivityKind,
    pub feeling: Option<Feeling>,
    /// Falls back to [`DEFAULT_BODY_WEIGHT_KG`] when absent or not positive
    pub body_weight_kg: Option<f64>,
}

/// One completed kilometer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Split {
    /// Cumulative distance marker (1000, 2000, ...)
    pub distance_meters: f64,
    /// Active seconds from session start to the marker
    pub elapsed_secs: f64,
    /// Seconds taken for this kilometer
    pub pace_secs_per_km: f64,
}

/// Everything known about a finished workout. Handed to persistence as-is.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkoutSummary {
    pub activity: ActivityKind,
    pub feeling: Option<Feeling>,
    pub started_at_ms: i64,
    pub ended_at_ms: i64,
    pub points: Vec<GpsPoint>,
    /// Active seconds
    pub duration_secs: f64,
    pub paused_duration_secs: f64,
    pub distance_meters: f64,
    pub average_pace_secs_per_km: f64,
    pub average_speed_mps: f64,
    /// Highest sensor-reported speed among the retained fixes
    pub max_speed_mps: f64,
    pub splits: Vec<Split>,
    pub elevation_gain_meters: f64,
    pub steps: u64,
    pub average_cadence_spm: f64,
    pub max_cadence_spm: f64,
    pub calories: f64,
    /// Map framing for the recorded track
    pub bounds: Option<Bounds>,
}

/// MET value for an average pace, stepping down from running to walking.
pub fn met_for_pace(pace_secs_per_km: f64) -> f64 {
    // No movement recorded: count it as the walking tier.
    if !(pace_secs_per_km > 0.0) {
        return 4.0;
    }
    let minutes_per_km = pace_secs_per_km / 60.0;
    if minutes_per_km < 5.0 {
        12.0
    } else if minutes_per_km < 6.0 {
        10.0
    } else if minutes_per_km < 7.0 {
        8.0
    } else if minutes_per_km < 9.0 {
        6.0
    } else {
        4.0
    }
}

/// `MET(pace) * weight * hours`.
pub fn estimate_calories(pace_secs_per_km: f64, body_weight_kg: f64, duration_secs: f64) -> f64 {
    if !(duration_secs > 0.0) || !(body_weight_kg > 0.0) {
        return 0.0;
    }
    met_for_pace(pace_secs_per_km) * body_weight_kg * (duration_secs / 3600.0)
}

/// Sum of positive altitude changes between consecutive fixes that both
/// carry an altitude. Descents are ignored.
pub fn elevation_gain(points: &[GpsPoint]) -> f64 {
    points
        .windows(2)
        .filter_map(|w| match (w[0].altitude_meters, w[1].altitude_meters) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        })
        .filter(|delta| *delta > 0.0)
        .sum()
}

/// Per-kilometer splits over `points`.
///
/// The moment each boundary is crossed is interpolated within the segment
/// that crosses it, using active time from `clock`. A track shorter than one
/// kilometer has no splits.
pub fn compute_splits(points: &[GpsPoint], clock: &ClockResult) -> Vec<Split> {
    let mut splits = Vec::new();
    let mut cumulative = 0.0;
    let mut next_boundary = SPLIT_METERS;
    let mut last_split_secs = 0.0;

    for w in points.windows(2) {
        let seg = haversine_distance(&w[0], &w[1]);
        if seg <= 0.0 {
            continue;
        }
        let t0 = clock.active_secs_at(w[0].timestamp_ms);
        let t1 = clock.active_secs_at(w[1].timestamp_ms);

        while cumulative + seg >= next_boundary {
            let ratio = (next_boundary - cumulative) / seg;
            let elapsed_secs = t0 + ratio * (t1 - t0);
            splits.push(Split {
                distance_meters: next_boundary,
                elapsed_secs,
                pace_secs_per_km: (elapsed_secs - last_split_secs).max(0.0),
            });
            last_split_secs = elapsed_secs;
            next_boundary += SPLIT_METERS;
        }
        cumulative += seg;
    }

    splits
}

/// Build the summary for a stopped session.
///
/// ```
/// use workout_tracking::{
///     finalize, CadenceResult, ClockResult, FinalizeOptions, GpsPoint,
/// };
///
/// let points = vec![
///     GpsPoint::new(60.00, 24.00, 0).with_altitude(10.0),
///     GpsPoint::new(60.00, 24.01, 200_000).with_altitude(14.0),
///     GpsPoint::new(60.00, 24.02, 400_000).with_altitude(12.0),
/// ];
/// let clock = ClockResult {
///     started_at_ms: 0,
///     stopped_at_ms: 400_000,
///     duration_secs: 400.0,
///     paused_duration_secs: 0.0,
///     pauses: vec![],
/// };
///
/// let summary = finalize(points, clock, CadenceResult::empty(), &FinalizeOptions::default());
/// assert_eq!(summary.splits.len(), 1);
/// assert_eq!(summary.elevation_gain_meters, 4.0);
/// ```
pub fn finalize(
    points: Vec<GpsPoint>,
    clock: ClockResult,
    cadence: CadenceResult,
    options: &FinalizeOptions,
) -> WorkoutSummary {
    let distance_meters = crate::geo_utils::polyline_length(&points);
    let average_pace_secs_per_km = pace_secs_per_km(clock.duration_secs, distance_meters);
    let average_speed_mps = if clock.duration_secs > 0.0 {
        distance_meters / clock.duration_secs
    } else {
        0.0
    };
    let max_speed_mps = points
        .iter()
        .filter_map(|p| p.speed_mps)
        .filter(|s| s.is_finite())
        .fold(0.0, f64::max);

    let body_weight_kg = options
        .body_weight_kg
        .filter(|w| *w > 0.0 && w.is_finite())
        .unwrap_or(DEFAULT_BODY_WEIGHT_KG);
    let calories = estimate_calories(average_pace_secs_per_km, body_weight_kg, clock.duration_secs);

    let splits = compute_splits(&points, &clock);
    let elevation_gain_meters = elevation_gain(&points);
    let bounds = compute_bounds(&points);

    WorkoutSummary {
        activity: options.activity,
        feeling: options.feeling,
        started_at_ms: clock.started_at_ms,
        ended_at_ms: clock.stopped_at_ms,
        points,
        duration_secs: clock.duration_secs,
        paused_duration_secs: clock.paused_duration_secs,
        distance_meters,
        average_pace_secs_per_km,
        average_speed_mps,
        max_speed_mps,
        splits,
        elevation_gain_meters,
        steps: cadence.total_steps,
        average_cadence_spm: cadence.average_cadence_spm,
        max_cadence_spm: cadence.max_cadence_spm,
        calories,
        bounds,
    }
}
