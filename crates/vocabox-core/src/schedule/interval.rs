//! Box -> re-study delay

use chrono::Duration;

/// Delay applied to any box above the last defined one
pub const OVERFLOW_INTERVAL_DAYS: i64 = 30;

/// Re-study delay for a box. Total: boxes above 5 clamp to 30 days.
pub fn interval_for(box_level: u8) -> Duration {
    match box_level {
        0 => Duration::zero(),
        1 => Duration::minutes(10),
        2 => Duration::days(1),
        3 => Duration::days(3),
        4 => Duration::days(7),
        5 => Duration::days(21),
        _ => Duration::days(OVERFLOW_INTERVAL_DAYS),
    }
}
