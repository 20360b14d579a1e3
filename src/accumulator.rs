//! Running distance and pace over the accepted fix stream.
//!
//! Distance grows pairwise between consecutive accepted fixes. Average pace
//! uses the session clock's active time; current pace uses only the trailing
//! window of fixes and their own timestamps.

use std::collections::VecDeque;

use log::warn;

use crate::geo_utils::haversine_distance;
use crate::{GpsPoint, TrackingConfig};

/// Seconds per kilometer for `meters` covered in `secs`.
///
/// Zero whenever either side is zero, negative or not finite, so no NaN or
/// infinity ever reaches a caller.
///
/// ```
/// use workout_tracking::accumulator::pace_secs_per_km;
///
/// assert_eq!(pace_secs_per_km(300.0, 1000.0), 300.0);
/// assert_eq!(pace_secs_per_km(300.0, 0.0), 0.0);
/// ```
pub fn pace_secs_per_km(secs: f64, meters: f64) -> f64 {
    if !(secs > 0.0) || !(meters > 0.0) || !secs.is_finite() || !meters.is_finite() {
        return 0.0;
    }
    secs / (meters / 1000.0)
}

/// Live stats pushed to the UI after each accepted fix.
///
/// `coordinates` borrows the full accepted history from the session, so a
/// snapshot is cheap to build on every update.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot<'a> {
    pub elapsed_secs: f64,
    pub distance_meters: f64,
    /// Pace over the trailing window (seconds/km, 0 if unknown)
    pub current_pace_secs_per_km: f64,
    /// Pace over the whole session so far (seconds/km, 0 if unknown)
    pub average_pace_secs_per_km: f64,
    pub is_paused: bool,
    /// Workout steps so far
    pub steps: u64,
    /// Smoothed cadence (steps/minute)
    pub cadence_spm: f64,
    pub coordinates: &'a [GpsPoint],
}

/// Incremental distance/pace state for one session.
#[derive(Debug, Clone)]
pub struct DistanceAccumulator {
    points: Vec<GpsPoint>,
    window: VecDeque<GpsPoint>,
    window_size: usize,
    distance_meters: f64,
}

impl DistanceAccumulator {
    pub fn new(config: &TrackingConfig) -> Self {
        let window_size = (config.pace_window_size as usize).max(2);
        Self {
            points: Vec::new(),
            window: VecDeque::with_capacity(window_size),
            window_size,
            distance_meters: 0.0,
        }
    }

    /// Add an accepted fix. The first fix contributes no distance.
    pub fn push(&mut self, point: GpsPoint) {
        if let Some(prev) = self.points.last() {
            if point.timestamp_ms < prev.timestamp_ms {
                warn!(
                    "[DistanceAccumulator] fix timestamp went backwards ({} < {})",
                    point.timestamp_ms, prev.timestamp_ms
                );
            }
            self.distance_meters += haversine_distance(prev, &point);
        }

        self.window.push_back(point);
        if self.window.len() > self.window_size {
            self.window.pop_front();
        }

        self.points.push(point);
    }

    /// Add a fix and build the resulting snapshot.
    ///
    /// ```
    /// use workout_tracking::{DistanceAccumulator, GpsPoint, TrackingConfig};
    ///
    /// let mut acc = DistanceAccumulator::new(&TrackingConfig::default());
    /// let snap = acc.update(GpsPoint::new(60.0, 24.0, 0), 0.0);
    /// assert_eq!(snap.distance_meters, 0.0);
    /// assert_eq!(snap.average_pace_secs_per_km, 0.0);
    /// ```
    pub fn update(&mut self, point: GpsPoint, elapsed_secs: f64) -> StatsSnapshot<'_> {
        self.push(point);
        self.snapshot(elapsed_secs, false)
    }

    pub fn snapshot(&self, elapsed_secs: f64, is_paused: bool) -> StatsSnapshot<'_> {
        StatsSnapshot {
            elapsed_secs,
            distance_meters: self.distance_meters,
            current_pace_secs_per_km: self.current_pace(),
            average_pace_secs_per_km: pace_secs_per_km(elapsed_secs, self.distance_meters),
            is_paused,
            steps: 0,
            cadence_spm: 0.0,
            coordinates: &self.points,
        }
    }

    /// Pace across the trailing window, using the fixes' own timestamps.
    ///
    /// The window distance is summed afresh from its fixes, so a stationary
    /// tail reads exactly zero meters and yields no pace.
    pub fn current_pace(&self) -> f64 {
        if self.window.len() < 2 {
            return 0.0;
        }
        let (Some(first), Some(last)) = (self.window.front(), self.window.back()) else {
            return 0.0;
        };
        let span_secs = (last.timestamp_ms - first.timestamp_ms) as f64 / 1000.0;
        let window_meters: f64 = self
            .window
            .iter()
            .zip(self.window.iter().skip(1))
            .map(|(a, b)| haversine_distance(a, b))
            .sum();
        pace_secs_per_km(span_secs, window_meters)
    }

    pub fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    pub fn points(&self) -> &[GpsPoint] {
        &self.points
    }

    /// Hand the retained fixes over and reset to empty.
    pub fn take_points(&mut self) -> Vec<GpsPoint> {
        self.window.clear();
        self.distance_meters = 0.0;
        std::mem::take(&mut self.points)
    }
}

impl Default for DistanceAccumulator {
    fn default() -> Self {
        Self::new(&TrackingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn lap_point(lng: f64, t_ms: i64) -> GpsPoint {
        GpsPoint::new(60.00, lng, t_ms).with_accuracy(5.0).with_speed(3.0)
    }

    #[test]
    fn test_zero_and_one_point_are_zero() {
        let mut acc = DistanceAccumulator::default();
        let snap = acc.snapshot(0.0, false);
        assert_eq!(snap.distance_meters, 0.0);
        assert_eq!(snap.current_pace_secs_per_km, 0.0);
        assert_eq!(snap.average_pace_secs_per_km, 0.0);

        let snap = acc.update(lap_point(24.00, 0), 5.0);
        assert_eq!(snap.distance_meters, 0.0);
        assert_eq!(snap.current_pace_secs_per_km, 0.0);
        assert_eq!(snap.average_pace_secs_per_km, 0.0);
        assert_eq!(snap.coordinates.len(), 1);
    }

    #[test]
    fn test_basic_lap() {
        let mut acc = DistanceAccumulator::default();
        acc.update(lap_point(24.00, 0), 0.0);
        acc.update(lap_point(24.01, 1_000), 1.0);
        let snap = acc.update(lap_point(24.02, 2_000), 2.0);

        let leg = haversine_distance(&lap_point(24.00, 0), &lap_point(24.01, 0));
        assert!(approx_eq(snap.distance_meters, 2.0 * leg, 1e-6));
        assert!(approx_eq(snap.distance_meters, 1112.0, 5.0));

        let expected_pace = 2.0 / (snap.distance_meters / 1000.0);
        assert!(approx_eq(snap.average_pace_secs_per_km, expected_pace, 1e-9));
        // Window spans the same fixes and the same 2 seconds
        assert!(approx_eq(snap.current_pace_secs_per_km, expected_pace, 1e-9));
    }

    #[test]
    fn test_distance_is_monotonic() {
        let mut acc = DistanceAccumulator::default();
        let mut last = 0.0;
        for (i, lng) in [24.0, 24.001, 24.0005, 24.0005, 24.002, 23.999].iter().enumerate() {
            let snap = acc.update(lap_point(*lng, i as i64 * 1_000), i as f64);
            assert!(snap.distance_meters >= last);
            last = snap.distance_meters;
        }
    }

    #[test]
    fn test_current_pace_uses_trailing_window() {
        let config = TrackingConfig { pace_window_size: 3, ..TrackingConfig::default() };
        let mut acc = DistanceAccumulator::new(&config);
        // Slow start: 10 s per 0.0001 deg
        for i in 0..5 {
            acc.push(GpsPoint::new(60.0, 24.0 + i as f64 * 0.0001, i * 10_000));
        }
        // Fast finish: 1 s per 0.0001 deg
        let base_t = 40_000;
        for i in 1..=3 {
            acc.push(GpsPoint::new(60.0, 24.0004 + i as f64 * 0.0001, base_t + i * 1_000));
        }
        // Window holds only the last three fast fixes: 2 legs in 2 seconds
        let leg = haversine_distance(&GpsPoint::new(60.0, 24.0, 0), &GpsPoint::new(60.0, 24.0001, 0));
        let expected = 2.0 / (2.0 * leg / 1000.0);
        assert!(approx_eq(acc.current_pace(), expected, 1e-3));
    }

    #[test]
    fn test_current_pace_zero_time_span() {
        let mut acc = DistanceAccumulator::default();
        acc.push(lap_point(24.00, 1_000));
        acc.push(lap_point(24.01, 1_000));
        assert_eq!(acc.current_pace(), 0.0);
    }

    #[test]
    fn test_stationary_tail_after_long_run_has_no_pace() {
        let mut acc = DistanceAccumulator::default();
        let mut t_ms = 0;
        let mut lat = 60.0;
        let mut lng = 24.0;
        for i in 0..500 {
            lat += 0.00001 * ((i * 7 % 13) as f64 + 0.37);
            lng += 0.00001 * ((i * 5 % 11) as f64 + 0.91);
            t_ms += 900 + (i * 37 % 400) as i64;
            acc.push(GpsPoint::new(lat, lng, t_ms));
        }
        assert!(acc.current_pace() > 0.0);

        for _ in 0..15 {
            t_ms += 1_000;
            acc.push(GpsPoint::new(lat, lng, t_ms));
        }
        assert_eq!(acc.current_pace(), 0.0);
        assert_eq!(acc.snapshot(600.0, false).current_pace_secs_per_km, 0.0);
    }

    #[test]
    fn test_take_points_resets() {
        let mut acc = DistanceAccumulator::default();
        acc.push(lap_point(24.00, 0));
        acc.push(lap_point(24.01, 1_000));
        let points = acc.take_points();
        assert_eq!(points.len(), 2);
        assert_eq!(acc.distance_meters(), 0.0);
        assert!(acc.points().is_empty());
        assert_eq!(acc.current_pace(), 0.0);
    }

    #[test]
    fn test_pace_guards() {
        assert_eq!(pace_secs_per_km(0.0, 1000.0), 0.0);
        assert_eq!(pace_secs_per_km(100.0, 0.0), 0.0);
        assert_eq!(pace_secs_per_km(f64::NAN, 1000.0), 0.0);
        assert_eq!(pace_secs_per_km(100.0, f64::INFINITY), 0.0);
        assert_eq!(pace_secs_per_km(330.0, 1000.0), 330.0);
    }
}
