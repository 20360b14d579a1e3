//! Simulated run through the tracking engine, with a pause and a noisy fix.
//!
//! Run with: cargo run --example live_session

use workout_tracking::format::{format_distance, format_duration, format_pace};
use workout_tracking::{
    ActivityKind, Feeling, FinalizeOptions, GpsPoint, StatsSnapshot, TrackingConfig, WorkoutSession,
};

fn main() {
    let mut session = WorkoutSession::new(TrackingConfig::default()).unwrap();
    session.start(0).unwrap();

    session.subscribe(Box::new(|stats: &StatsSnapshot<'_>| {
        if stats.coordinates.len() % 60 == 0 {
            println!(
                "  {:>8}  {:>9}  now {} /km  avg {} /km  {:.0} spm",
                format_duration(stats.elapsed_secs),
                format_distance(stats.distance_meters),
                format_pace(stats.current_pace_secs_per_km),
                format_pace(stats.average_pace_secs_per_km),
                stats.cadence_spm,
            );
        }
    }));
    session.attach_subscription(Box::new(|| println!("  (location updates stopped)")));

    println!("Live Session Example\n");

    // Heading north at ~3 m/s, one fix per second, 85 steps per 10 s
    let mut t_ms = 0;
    let mut lat = 60.1699;
    let mut steps = 10_000;
    session.on_steps(steps);
    for second in 1..=900 {
        t_ms = second * 1_000;
        if second == 400 {
            println!("  -- paused at {}", format_duration(session.snapshot(t_ms).elapsed_secs));
            session.pause(t_ms);
            t_ms += 45_000;
            session.resume(t_ms);
        }
        lat += 0.000027;
        let altitude = 10.0 + (second as f64 / 60.0).sin() * 4.0;
        let fix = GpsPoint::new(lat, 24.9384, t_ms)
            .with_accuracy(6.0)
            .with_speed(3.0)
            .with_altitude(altitude);
        session.on_location(fix);

        if second == 500 {
            // A multipath jump the filter should drop
            session.on_location(GpsPoint::new(lat + 0.01, 24.95, t_ms).with_accuracy(120.0));
        }
        if second % 10 == 0 {
            steps += 85;
            session.on_steps(steps);
            session.on_cadence_tick();
        }
    }

    let stopped = session.stop(t_ms).unwrap();
    if let Err(e) = stopped.ensure_saveable() {
        println!("Not saving: {}", e);
        return;
    }

    let summary = stopped.finalize(&FinalizeOptions {
        activity: ActivityKind::Run,
        feeling: Some(Feeling::Good),
        body_weight_kg: Some(68.0),
    });

    println!("\nSummary:");
    println!("  distance  {}", format_distance(summary.distance_meters));
    println!("  time      {} (+{} paused)", format_duration(summary.duration_secs), format_duration(summary.paused_duration_secs));
    println!("  avg pace  {} /km", format_pace(summary.average_pace_secs_per_km));
    println!("  climb     {:.0} m", summary.elevation_gain_meters);
    println!("  steps     {} (avg {:.0} spm, max {:.0} spm)", summary.steps, summary.average_cadence_spm, summary.max_cadence_spm);
    println!("  calories  {:.0}", summary.calories);
    for split in &summary.splits {
        println!(
            "  km {:>2}    {} /km at {}",
            (split.distance_meters / 1000.0) as u32,
            format_pace(split.pace_secs_per_km),
            format_duration(split.elapsed_secs)
        );
    }
}
