//! Step cadence from a cumulative pedometer count.
//!
//! The pedometer reports a running total since some device-defined epoch.
//! Each reading becomes a delta against the previous raw reading; positive
//! deltas enter a small FIFO window and the current bucket. A periodic tick
//! turns the window into a smoothed steps/minute figure and records the
//! bucket's own rate for the session maximum.
//!
//! The smoothed value divides by the window's current length, so with only a
//! few entries it covers a shorter period and follows recent bursts closely.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::TrackingConfig;

/// Cadence figures for a finished session.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CadenceResult {
    pub total_steps: u64,
    pub average_cadence_spm: f64,
    pub max_cadence_spm: f64,
}

impl CadenceResult {
    /// No pedometer data.
    pub fn empty() -> Self {
        Self { total_steps: 0, average_cadence_spm: 0.0, max_cadence_spm: 0.0 }
    }
}

#[derive(Debug, Clone)]
pub struct CadenceEstimator {
    window: VecDeque<u64>,
    window_capacity: usize,
    bucket_secs: f64,
    baseline: Option<u64>,
    last_total: Option<u64>,
    bucket_steps: u64,
    bucket_rates: Vec<f64>,
    smoothed_spm: f64,
}

impl CadenceEstimator {
    pub fn new(config: &TrackingConfig) -> Self {
        let window_capacity = (config.cadence_window_size as usize).max(1);
        Self {
            window: VecDeque::with_capacity(window_capacity),
            window_capacity,
            bucket_secs: config.cadence_bucket_seconds,
            baseline: None,
            last_total: None,
            bucket_steps: 0,
            bucket_rates: Vec::new(),
            smoothed_spm: 0.0,
        }
    }

    /// Feed a cumulative reading. Returns the delta against the previous
    /// reading, or `None` for the first one.
    ///
    /// The previous total is always replaced, so a reset only costs the one
    /// negative delta, which is discarded.
    ///
    /// ```
    /// use workout_tracking::{CadenceEstimator, TrackingConfig};
    ///
    /// let mut cadence = CadenceEstimator::new(&TrackingConfig::default());
    /// let deltas: Vec<_> = [100, 105, 103, 110]
    ///     .iter()
    ///     .map(|&t| cadence.on_reading(t))
    ///     .collect();
    ///
    /// assert_eq!(deltas, vec![None, Some(5), Some(-2), Some(7)]);
    /// assert_eq!(cadence.window(), vec![5, 7]);
    /// assert_eq!(cadence.last_total(), Some(110));
    /// ```
    pub fn on_reading(&mut self, total: u64) -> Option<i64> {
        let delta = self.observe(total)?;
        if delta > 0 {
            let steps = delta as u64;
            self.window.push_back(steps);
            while self.window.len() > self.window_capacity {
                self.window.pop_front();
            }
            self.bucket_steps += steps;
        } else if delta < 0 {
            warn!("[CadenceEstimator] step counter went backwards by {}, ignoring", -delta);
        }
        Some(delta)
    }

    /// Track a reading without counting it toward cadence (used while paused).
    pub fn skip_reading(&mut self, total: u64) {
        self.observe(total);
    }

    fn observe(&mut self, total: u64) -> Option<i64> {
        if self.baseline.is_none() {
            self.baseline = Some(total);
        }
        let previous = self.last_total.replace(total)?;
        Some(total as i64 - previous as i64)
    }

    /// Close the current bucket and refresh the smoothed cadence.
    pub fn tick(&mut self) -> f64 {
        if self.bucket_steps > 0 {
            let rate = self.bucket_steps as f64 * (60.0 / self.bucket_secs);
            debug!("[CadenceEstimator] bucket closed: {} steps ({:.0} spm)", self.bucket_steps, rate);
            self.bucket_rates.push(rate);
            self.bucket_steps = 0;
        }

        self.smoothed_spm = if self.window.is_empty() {
            0.0
        } else {
            let sum: u64 = self.window.iter().sum();
            let window_minutes = self.window.len() as f64 * self.bucket_secs / 60.0;
            sum as f64 / window_minutes
        };
        self.smoothed_spm
    }

    /// Last smoothed cadence (steps/minute).
    pub fn cadence_spm(&self) -> f64 {
        self.smoothed_spm
    }

    /// Workout steps so far: latest total minus the first reading, never negative.
    pub fn steps(&self) -> u64 {
        match (self.baseline, self.last_total) {
            (Some(base), Some(last)) => last.saturating_sub(base),
            _ => 0,
        }
    }

    pub fn window(&self) -> Vec<u64> {
        self.window.iter().copied().collect()
    }

    pub fn last_total(&self) -> Option<u64> {
        self.last_total
    }

    /// Summarise the session over `elapsed_secs` of active time and reset.
    pub fn finish(&mut self, elapsed_secs: f64) -> CadenceResult {
        let total_steps = self.steps();
        let elapsed_minutes = elapsed_secs / 60.0;
        let average_cadence_spm = if elapsed_minutes > 0.0 && elapsed_minutes.is_finite() {
            total_steps as f64 / elapsed_minutes
        } else {
            0.0
        };
        let max_cadence_spm = self
            .bucket_rates
            .iter()
            .copied()
            .reduce(f64::max)
            .unwrap_or(self.smoothed_spm);

        let result = CadenceResult { total_steps, average_cadence_spm, max_cadence_spm };
        *self = Self {
            window: VecDeque::with_capacity(self.window_capacity),
            window_capacity: self.window_capacity,
            bucket_secs: self.bucket_secs,
            baseline: None,
            last_total: None,
            bucket_steps: 0,
            bucket_rates: Vec::new(),
            smoothed_spm: 0.0,
        };
        result
    }
}

impl Default for CadenceEstimator {
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

    #[test]
    fn test_reset_guard() {
        let mut cadence = CadenceEstimator::default();
        for total in [100, 105, 103, 110] {
            cadence.on_reading(total);
        }
        assert_eq!(cadence.window(), vec![5, 7]);
        assert_eq!(cadence.last_total(), Some(110));
        assert_eq!(cadence.steps(), 10);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut cadence = CadenceEstimator::default();
        cadence.on_reading(0);
        let mut total = 0;
        for step in 1..=8 {
            total += step;
            cadence.on_reading(total);
        }
        assert_eq!(cadence.window(), vec![3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_zero_delta_not_pushed() {
        let mut cadence = CadenceEstimator::default();
        cadence.on_reading(50);
        assert_eq!(cadence.on_reading(50), Some(0));
        assert!(cadence.window().is_empty());
    }

    #[test]
    fn test_smoothed_cadence_full_window() {
        let mut cadence = CadenceEstimator::default();
        cadence.on_reading(0);
        let mut total = 0;
        for _ in 0..6 {
            total += 30;
            cadence.on_reading(total);
        }
        // 180 steps over 6 x 10 s
        assert!(approx_eq(cadence.tick(), 180.0, 1e-9));
    }

    #[test]
    fn test_smoothed_cadence_short_window() {
        let mut cadence = CadenceEstimator::default();
        cadence.on_reading(0);
        cadence.on_reading(25);
        // One entry is treated as one 10 s bucket
        assert!(approx_eq(cadence.tick(), 150.0, 1e-9));
    }

    #[test]
    fn test_tick_with_empty_window() {
        let mut cadence = CadenceEstimator::default();
        assert_eq!(cadence.tick(), 0.0);
    }

    #[test]
    fn test_max_from_bucket_rates() {
        let mut cadence = CadenceEstimator::default();
        cadence.on_reading(0);
        cadence.on_reading(20);
        cadence.tick(); // 120 spm bucket
        cadence.on_reading(48);
        cadence.tick(); // 168 spm bucket
        cadence.on_reading(60);
        cadence.tick(); // 72 spm bucket
        let result = cadence.finish(30.0);
        assert!(approx_eq(result.max_cadence_spm, 168.0, 1e-9));
        assert_eq!(result.total_steps, 60);
        assert!(approx_eq(result.average_cadence_spm, 120.0, 1e-9));
    }

    #[test]
    fn test_max_falls_back_to_smoothed() {
        let mut cadence = CadenceEstimator::default();
        cadence.on_reading(0);
        cadence.on_reading(10);
        let smoothed = cadence.tick();
        // tick recorded a bucket, so clear it to exercise the fallback
        cadence.bucket_rates.clear();
        let result = cadence.finish(60.0);
        assert_eq!(result.max_cadence_spm, smoothed);
    }

    #[test]
    fn test_finish_without_readings() {
        let mut cadence = CadenceEstimator::default();
        assert_eq!(cadence.finish(120.0), CadenceResult::empty());
    }

    #[test]
    fn test_finish_zero_duration() {
        let mut cadence = CadenceEstimator::default();
        cadence.on_reading(10);
        cadence.on_reading(20);
        let result = cadence.finish(0.0);
        assert_eq!(result.total_steps, 10);
        assert_eq!(result.average_cadence_spm, 0.0);
    }

    #[test]
    fn test_skip_reading_moves_last_total_only() {
        let mut cadence = CadenceEstimator::default();
        cadence.on_reading(100);
        cadence.skip_reading(140);
        cadence.on_reading(150);
        assert_eq!(cadence.window(), vec![10]);
        assert_eq!(cadence.steps(), 50);
    }

    #[test]
    fn test_counter_reset_below_baseline_clamps_steps() {
        let mut cadence = CadenceEstimator::default();
        cadence.on_reading(500);
        cadence.on_reading(20);
        assert_eq!(cadence.steps(), 0);
    }
}
