//! Lifetime analytics over finished workouts.
//!
//! [`WorkoutHistory`] folds [`WorkoutSummary`] values into running totals and
//! personal bests, and tracks which [`Achievement`]s have been unlocked.
//! Recording a workout reports only the achievements it newly unlocked.

use log::info;

use crate::finalizer::WorkoutSummary;

const FIVE_K_METERS: f64 = 5_000.0;
const TEN_K_METERS: f64 = 10_000.0;
const HALF_MARATHON_METERS: f64 = 21_097.5;
const MARATHON_METERS: f64 = 42_195.0;
const CENTURY_METERS: f64 = 100_000.0;
const CLIMBER_METERS: f64 = 500.0;
/// Shorter sessions don't compete for fastest pace.
const MIN_PACE_RECORD_METERS: f64 = 1_000.0;

/// Milestones a user can unlock once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Achievement {
    FirstWorkout,
    FirstFiveK,
    FirstTenK,
    FirstHalfMarathon,
    FirstMarathon,
    TenWorkouts,
    FiftyWorkouts,
    /// 100 km lifetime distance
    Century,
    /// 500 m lifetime elevation gain
    Climber,
}

impl Achievement {
    pub const ALL: [Achievement; 9] = [
        Achievement::FirstWorkout,
        Achievement::FirstFiveK,
        Achievement::FirstTenK,
        Achievement::FirstHalfMarathon,
        Achievement::FirstMarathon,
        Achievement::TenWorkouts,
        Achievement::FiftyWorkouts,
        Achievement::Century,
        Achievement::Climber,
    ];

    /// Whether `latest`, with `totals` already including it, earns this.
    fn is_earned(&self, totals: &WorkoutTotals, latest: &WorkoutSummary) -> bool {
        match self {
            Achievement::FirstWorkout => totals.workouts >= 1,
            Achievement::FirstFiveK => latest.distance_meters >= FIVE_K_METERS,
            Achievement::FirstTenK => latest.distance_meters >= TEN_K_METERS,
            Achievement::FirstHalfMarathon => latest.distance_meters >= HALF_MARATHON_METERS,
            Achievement::FirstMarathon => latest.distance_meters >= MARATHON_METERS,
            Achievement::TenWorkouts => totals.workouts >= 10,
            Achievement::FiftyWorkouts => totals.workouts >= 50,
            Achievement::Century => totals.distance_meters >= CENTURY_METERS,
            Achievement::Climber => totals.elevation_gain_meters >= CLIMBER_METERS,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::FirstWorkout => "First Workout",
            Achievement::FirstFiveK => "5K Finisher",
            Achievement::FirstTenK => "10K Finisher",
            Achievement::FirstHalfMarathon => "Half Marathoner",
            Achievement::FirstMarathon => "Marathoner",
            Achievement::TenWorkouts => "Regular",
            Achievement::FiftyWorkouts => "Dedicated",
            Achievement::Century => "Century",
            Achievement::Climber => "Climber",
        }
    }
}

/// Lifetime sums.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkoutTotals {
    pub workouts: u32,
    pub distance_meters: f64,
    pub duration_secs: f64,
    pub steps: u64,
    pub calories: f64,
    pub elevation_gain_meters: f64,
}

/// Best single-workout figures.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersonalBests {
    pub longest_distance_meters: f64,
    pub longest_duration_secs: f64,
    /// Lowest average pace among workouts of at least 1 km
    pub fastest_pace_secs_per_km: Option<f64>,
    /// Quickest single kilometer split
    pub fastest_split_secs: Option<f64>,
}

fn min_option(current: Option<f64>, candidate: f64) -> Option<f64> {
    if !(candidate > 0.0) || !candidate.is_finite() {
        return current;
    }
    Some(current.map_or(candidate, |c| c.min(candidate)))
}

#[derive(Debug, Clone, Default)]
pub struct WorkoutHistory {
    totals: WorkoutTotals,
    bests: PersonalBests,
    unlocked: Vec<Achievement>,
}

impl WorkoutHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay stored workouts in order.
    pub fn from_summaries(summaries: &[WorkoutSummary]) -> Self {
        let mut history = Self::new();
        for summary in summaries {
            history.record(summary);
        }
        history
    }

    pub fn totals(&self) -> &WorkoutTotals {
        &self.totals
    }

    pub fn bests(&self) -> &PersonalBests {
        &self.bests
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.unlocked
    }

    /// Fold in a finished workout and return what it newly unlocked.
    ///
    /// ```
    /// use workout_tracking::{Achievement, WorkoutHistory, WorkoutSession, GpsPoint, FinalizeOptions};
    ///
    /// let mut session = WorkoutSession::default();
    /// session.start(0).unwrap();
    /// session.on_location(GpsPoint::new(60.0, 24.0, 0));
    /// session.on_location(GpsPoint::new(60.0, 24.01, 180_000));
    /// let summary = session.stop(180_000).unwrap().finalize(&FinalizeOptions::default());
    ///
    /// let mut history = WorkoutHistory::new();
    /// assert_eq!(history.record(&summary), vec![Achievement::FirstWorkout]);
    /// assert!(history.record(&summary).is_empty());
    /// assert_eq!(history.totals().workouts, 2);
    /// ```
    pub fn record(&mut self, summary: &WorkoutSummary) -> Vec<Achievement> {
        self.totals.workouts += 1;
        self.totals.distance_meters += summary.distance_meters;
        self.totals.duration_secs += summary.duration_secs;
        self.totals.steps += summary.steps;
        self.totals.calories += summary.calories;
        self.totals.elevation_gain_meters += summary.elevation_gain_meters;

        self.bests.longest_distance_meters = self.bests.longest_distance_meters.max(summary.distance_meters);
        self.bests.longest_duration_secs = self.bests.longest_duration_secs.max(summary.duration_secs);
        if summary.distance_meters >= MIN_PACE_RECORD_METERS {
            self.bests.fastest_pace_secs_per_km =
                min_option(self.bests.fastest_pace_secs_per_km, summary.average_pace_secs_per_km);
        }
        for split in &summary.splits {
            self.bests.fastest_split_secs = min_option(self.bests.fastest_split_secs, split.pace_secs_per_km);
        }

        let newly: Vec<Achievement> = Achievement::ALL
            .iter()
            .copied()
            .filter(|a| !self.unlocked.contains(a) && a.is_earned(&self.totals, summary))
            .collect();
        for achievement in &newly {
            info!("[WorkoutHistory] unlocked {}", achievement.title());
        }
        self.unlocked.extend(newly.iter().copied());
        newly
    }

    /// What `latest` would unlock, without recording it.
    pub fn new_achievements(&self, latest: &WorkoutSummary) -> Vec<Achievement> {
        self.clone().record(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finalizer::{ActivityKind, Split};

    fn summary(distance_meters: f64, duration_secs: f64, elevation: f64) -> WorkoutSummary {
        let splits = (1..=(distance_meters / 1000.0) as usize)
            .map(|km| Split {
                distance_meters: km as f64 * 1000.0,
                elapsed_secs: km as f64 * 300.0,
                pace_secs_per_km: 300.0 - km as f64,
            })
            .collect();
        WorkoutSummary {
            activity: ActivityKind::Run,
            feeling: None,
            started_at_ms: 0,
            ended_at_ms: (duration_secs * 1000.0) as i64,
            points: Vec::new(),
            duration_secs,
            paused_duration_secs: 0.0,
            distance_meters,
            average_pace_secs_per_km: crate::accumulator::pace_secs_per_km(duration_secs, distance_meters),
            average_speed_mps: distance_meters / duration_secs,
            max_speed_mps: 0.0,
            splits,
            elevation_gain_meters: elevation,
            steps: 1000,
            average_cadence_spm: 0.0,
            max_cadence_spm: 0.0,
            calories: 100.0,
            bounds: None,
        }
    }

    #[test]
    fn test_totals_accumulate() {
        let history = WorkoutHistory::from_summaries(&[summary(3000.0, 900.0, 10.0), summary(2000.0, 700.0, 5.0)]);
        let totals = history.totals();
        assert_eq!(totals.workouts, 2);
        assert_eq!(totals.distance_meters, 5000.0);
        assert_eq!(totals.duration_secs, 1600.0);
        assert_eq!(totals.steps, 2000);
        assert_eq!(totals.calories, 200.0);
        assert_eq!(totals.elevation_gain_meters, 15.0);
    }

    #[test]
    fn test_personal_bests() {
        let history = WorkoutHistory::from_summaries(&[
            summary(3000.0, 900.0, 0.0),  // 300 s/km
            summary(2000.0, 500.0, 0.0),  // 250 s/km
            summary(500.0, 60.0, 0.0),    // too short for a pace record
        ]);
        let bests = history.bests();
        assert_eq!(bests.longest_distance_meters, 3000.0);
        assert_eq!(bests.longest_duration_secs, 900.0);
        assert_eq!(bests.fastest_pace_secs_per_km, Some(250.0));
        assert_eq!(bests.fastest_split_secs, Some(297.0));
    }

    #[test]
    fn test_no_pace_record_without_distance() {
        let history = WorkoutHistory::from_summaries(&[summary(0.0, 600.0, 0.0)]);
        assert_eq!(history.bests().fastest_pace_secs_per_km, None);
        assert_eq!(history.bests().fastest_split_secs, None);
    }

    #[test]
    fn test_distance_achievements_unlock_once() {
        let mut history = WorkoutHistory::new();
        let unlocked = history.record(&summary(10_500.0, 3600.0, 0.0));
        assert_eq!(
            unlocked,
            vec![Achievement::FirstWorkout, Achievement::FirstFiveK, Achievement::FirstTenK]
        );
        assert!(history.record(&summary(10_500.0, 3600.0, 0.0)).is_empty());
        assert_eq!(history.achievements().len(), 3);
    }

    #[test]
    fn test_cumulative_achievements() {
        let mut history = WorkoutHistory::new();
        let mut all = Vec::new();
        for _ in 0..10 {
            all.extend(history.record(&summary(4_000.0, 1_200.0, 60.0)));
        }
        assert!(all.contains(&Achievement::TenWorkouts));
        assert!(all.contains(&Achievement::Climber));
        assert!(!all.contains(&Achievement::Century));
        assert!(!all.contains(&Achievement::FirstFiveK));
    }

    #[test]
    fn test_new_achievements_does_not_record() {
        let history = WorkoutHistory::new();
        let preview = history.new_achievements(&summary(5_000.0, 1_500.0, 0.0));
        assert_eq!(preview, vec![Achievement::FirstWorkout, Achievement::FirstFiveK]);
        assert_eq!(history.totals().workouts, 0);
        assert!(history.achievements().is_empty());
    }

    #[test]
    fn test_titles_are_distinct() {
        let mut titles: Vec<&str> = Achievement::ALL.iter().map(|a| a.title()).collect();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), Achievement::ALL.len());
    }
}
