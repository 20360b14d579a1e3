//! Display strings for live stats and summaries.

/// `m:ss` per kilometer, or `--:--` when there is no pace yet.
///
/// ```
/// use workout_tracking::format::format_pace;
///
/// assert_eq!(format_pace(330.0), "5:30");
/// assert_eq!(format_pace(0.0), "--:--");
/// ```
pub fn format_pace(secs_per_km: f64) -> String {
    if !(secs_per_km > 0.0) || !secs_per_km.is_finite() {
        return "--:--".to_string();
    }
    let total = secs_per_km.round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// `h:mm:ss` from one hour up, `mm:ss` below. Negative input shows as zero.
pub fn format_duration(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 { secs.floor() as u64 } else { 0 };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Whole meters under a kilometer, two-decimal kilometers above.
pub fn format_distance(meters: f64) -> String {
    let meters = if meters.is_finite() && meters > 0.0 { meters } else { 0.0 };
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pace() {
        assert_eq!(format_pace(300.0), "5:00");
        assert_eq!(format_pace(359.6), "6:00");
        assert_eq!(format_pace(61.0), "1:01");
        assert_eq!(format_pace(f64::INFINITY), "--:--");
        assert_eq!(format_pace(f64::NAN), "--:--");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00");
        assert_eq!(format_duration(59.9), "00:59");
        assert_eq!(format_duration(754.0), "12:34");
        assert_eq!(format_duration(3_725.0), "1:02:05");
        assert_eq!(format_duration(-4.0), "00:00");
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(850.4), "850 m");
        assert_eq!(format_distance(1234.0), "1.23 km");
        assert_eq!(format_distance(42_500.0), "42.50 km");
    }
}
