//! Build a workout history and watch achievements unlock.
//!
//! Run with: cargo run --example workout_history

use workout_tracking::format::{format_distance, format_pace};
use workout_tracking::{FinalizeOptions, GpsPoint, WorkoutHistory, WorkoutSession, WorkoutSummary};

/// Straight-line run of `km` kilometers at `pace_secs` per km.
fn simulated_run(km: f64, pace_secs: f64, climb_per_km: f64) -> WorkoutSummary {
    let mut session = WorkoutSession::default();
    session.start(0).unwrap();

    let fixes = (km * 100.0) as i64; // one fix per ~10 m
    let step_ms = (pace_secs * 10.0) as i64;
    for i in 0..=fixes {
        let fix = GpsPoint::new(60.0 + i as f64 * 0.0000899, 24.0, i * step_ms)
            .with_accuracy(5.0)
            .with_altitude(i as f64 * climb_per_km / 100.0);
        session.on_location(fix);
    }
    session.stop(fixes * step_ms).unwrap().finalize(&FinalizeOptions::default())
}

fn main() {
    println!("Workout History Example\n");

    let runs = [
        simulated_run(3.0, 360.0, 5.0),
        simulated_run(5.2, 340.0, 8.0),
        simulated_run(10.1, 330.0, 12.0),
        simulated_run(4.0, 300.0, 60.0),
    ];

    let mut history = WorkoutHistory::new();
    for run in &runs {
        let unlocked = history.record(run);
        println!(
            "{} at {} /km -> {}",
            format_distance(run.distance_meters),
            format_pace(run.average_pace_secs_per_km),
            if unlocked.is_empty() {
                "nothing new".to_string()
            } else {
                unlocked.iter().map(|a| a.title()).collect::<Vec<_>>().join(", ")
            }
        );
    }

    let totals = history.totals();
    let bests = history.bests();
    println!("\nTotals: {} workouts, {}, {:.0} m climbed", totals.workouts, format_distance(totals.distance_meters), totals.elevation_gain_meters);
    println!("Longest: {}", format_distance(bests.longest_distance_meters));
    if let Some(pace) = bests.fastest_pace_secs_per_km {
        println!("Fastest pace: {} /km", format_pace(pace));
    }
    if let Some(split) = bests.fastest_split_secs {
        println!("Fastest km: {} ", format_pace(split));
    }
}
