//! Pause-aware session clock.
//!
//! Elapsed time is wall time since `start` minus every paused interval,
//! including the one still open. While paused the reported elapsed time is
//! frozen no matter how often it is queried.

use log::{debug, warn};

/// Clock phase. `Idle` means no session is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClockState {
    Idle,
    Running,
    Paused,
}

/// A closed pause, in Unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PauseInterval {
    pub paused_at_ms: i64,
    pub resumed_at_ms: i64,
}

impl PauseInterval {
    /// Milliseconds of this pause that fall before `t_ms`.
    fn overlap_before(&self, t_ms: i64) -> i64 {
        (t_ms.min(self.resumed_at_ms) - self.paused_at_ms).max(0)
    }
}

/// What the clock reports when a session stops.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockResult {
    pub started_at_ms: i64,
    pub stopped_at_ms: i64,
    /// Active (unpaused) seconds
    pub duration_secs: f64,
    /// Total paused seconds, including a pause still open at stop time
    pub paused_duration_secs: f64,
    /// Every pause in chronological order
    pub pauses: Vec<PauseInterval>,
}

impl ClockResult {
    /// Active seconds between session start and `t_ms`, with pauses removed.
    ///
    /// Used to time splits from fix timestamps. Clamped to `[0, duration]`.
    pub fn active_secs_at(&self, t_ms: i64) -> f64 {
        let t = t_ms.clamp(self.started_at_ms, self.stopped_at_ms.max(self.started_at_ms));
        let paused: i64 = self.pauses.iter().map(|p| p.overlap_before(t)).sum();
        let active_ms = (t - self.started_at_ms - paused).max(0);
        active_ms as f64 / 1000.0
    }
}

/// Running/paused state machine for one session.
#[derive(Debug, Clone)]
pub struct SessionClock {
    state: ClockState,
    started_at_ms: i64,
    paused_at_ms: Option<i64>,
    paused_total_ms: i64,
    pauses: Vec<PauseInterval>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            state: ClockState::Idle,
            started_at_ms: 0,
            paused_at_ms: None,
            paused_total_ms: 0,
            pauses: Vec::new(),
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.state != ClockState::Idle
    }

    pub fn is_paused(&self) -> bool {
        self.state == ClockState::Paused
    }

    /// Begin timing at `now_ms`, discarding anything from an earlier session.
    pub fn start(&mut self, now_ms: i64) {
        *self = Self::new();
        self.state = ClockState::Running;
        self.started_at_ms = now_ms;
    }

    /// Freeze elapsed time. No-op unless running.
    pub fn pause(&mut self, now_ms: i64) {
        if self.state != ClockState::Running {
            debug!("[SessionClock] pause ignored in state {:?}", self.state);
            return;
        }
        self.paused_at_ms = Some(now_ms);
        self.state = ClockState::Paused;
    }

    /// Fold the open pause into the paused total. No-op unless paused.
    pub fn resume(&mut self, now_ms: i64) {
        if self.state != ClockState::Paused {
            debug!("[SessionClock] resume ignored in state {:?}", self.state);
            return;
        }
        self.close_pause(now_ms);
        self.state = ClockState::Running;
    }

    /// Elapsed active seconds at `now_ms`. Zero while idle, never negative.
    ///
    /// ```
    /// use workout_tracking::SessionClock;
    ///
    /// let mut clock = SessionClock::new();
    /// clock.start(0);
    /// clock.pause(10_000);
    /// assert_eq!(clock.elapsed_secs(15_000), 10.0);
    /// assert_eq!(clock.elapsed_secs(90_000), 10.0);
    /// ```
    pub fn elapsed_secs(&self, now_ms: i64) -> f64 {
        if self.state == ClockState::Idle {
            return 0.0;
        }
        let open_pause = self.paused_at_ms.map_or(0, |p| (now_ms - p).max(0));
        let active_ms = now_ms - self.started_at_ms - self.paused_total_ms - open_pause;
        active_ms.max(0) as f64 / 1000.0
    }

    /// Paused seconds so far, counting an open pause up to `now_ms`.
    pub fn paused_secs(&self, now_ms: i64) -> f64 {
        let open_pause = self.paused_at_ms.map_or(0, |p| (now_ms - p).max(0));
        (self.paused_total_ms + open_pause) as f64 / 1000.0
    }

    /// End the session from either state and reset to `Idle`.
    ///
    /// Returns `None` if no session was being timed.
    pub fn stop(&mut self, now_ms: i64) -> Option<ClockResult> {
        if self.state == ClockState::Idle {
            return None;
        }
        if self.state == ClockState::Paused {
            self.close_pause(now_ms);
        }

        let result = ClockResult {
            started_at_ms: self.started_at_ms,
            stopped_at_ms: now_ms,
            duration_secs: ((now_ms - self.started_at_ms - self.paused_total_ms).max(0)) as f64 / 1000.0,
            paused_duration_secs: self.paused_total_ms as f64 / 1000.0,
            pauses: std::mem::take(&mut self.pauses),
        };

        *self = Self::new();
        Some(result)
    }

    fn close_pause(&mut self, now_ms: i64) {
        if let Some(paused_at) = self.paused_at_ms.take() {
            let resumed_at = if now_ms < paused_at {
                warn!("[SessionClock] clock went backwards during pause ({} < {})", now_ms, paused_at);
                paused_at
            } else {
                now_ms
            };
            self.paused_total_ms += resumed_at - paused_at;
            self.pauses.push(PauseInterval { paused_at_ms: paused_at, resumed_at_ms: resumed_at });
        }
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_resume_scenario() {
        let mut clock = SessionClock::new();
        clock.start(0);
        clock.pause(10_000);
        clock.resume(40_000);
        let result = clock.stop(50_000).unwrap();
        assert_eq!(result.duration_secs, 20.0);
        assert_eq!(result.paused_duration_secs, 30.0);
        assert_eq!(result.pauses, vec![PauseInterval { paused_at_ms: 10_000, resumed_at_ms: 40_000 }]);
        assert_eq!(clock.state(), ClockState::Idle);
    }

    #[test]
    fn test_elapsed_frozen_while_paused() {
        let mut clock = SessionClock::new();
        clock.start(1_000);
        clock.pause(6_000);
        let a = clock.elapsed_secs(6_500);
        let b = clock.elapsed_secs(600_000);
        assert_eq!(a, 5.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_stop_while_paused_folds_open_pause() {
        let mut clock = SessionClock::new();
        clock.start(0);
        clock.pause(20_000);
        let result = clock.stop(35_000).unwrap();
        assert_eq!(result.duration_secs, 20.0);
        assert_eq!(result.paused_duration_secs, 15.0);
        assert_eq!(result.pauses.len(), 1);
    }

    #[test]
    fn test_double_pause_and_stray_resume_are_noops() {
        let mut clock = SessionClock::new();
        clock.start(0);
        clock.resume(1_000);
        assert_eq!(clock.state(), ClockState::Running);
        clock.pause(2_000);
        clock.pause(5_000);
        clock.resume(7_000);
        // The second pause must not move the pause instant
        assert_eq!(clock.paused_secs(7_000), 5.0);
    }

    #[test]
    fn test_pause_when_idle_is_noop() {
        let mut clock = SessionClock::new();
        clock.pause(1_000);
        assert_eq!(clock.state(), ClockState::Idle);
        assert!(clock.stop(2_000).is_none());
    }

    #[test]
    fn test_elapsed_never_negative() {
        let mut clock = SessionClock::new();
        clock.start(10_000);
        assert_eq!(clock.elapsed_secs(5_000), 0.0);
        assert_eq!(SessionClock::new().elapsed_secs(5_000), 0.0);
    }

    #[test]
    fn test_active_secs_at_skips_pauses() {
        let mut clock = SessionClock::new();
        clock.start(0);
        clock.pause(10_000);
        clock.resume(40_000);
        let result = clock.stop(50_000).unwrap();
        assert_eq!(result.active_secs_at(5_000), 5.0);
        assert_eq!(result.active_secs_at(25_000), 10.0);
        assert_eq!(result.active_secs_at(45_000), 15.0);
        assert_eq!(result.active_secs_at(99_000), 20.0);
    }

    #[test]
    fn test_restart_resets_state() {
        let mut clock = SessionClock::new();
        clock.start(0);
        clock.pause(1_000);
        clock.start(100_000);
        assert_eq!(clock.state(), ClockState::Running);
        assert_eq!(clock.paused_secs(100_000), 0.0);
        assert_eq!(clock.elapsed_secs(103_000), 3.0);
    }
}
