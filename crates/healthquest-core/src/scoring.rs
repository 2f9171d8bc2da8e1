//! Daily points scoring engine.
//!
//! Converts one day of metrics into an integer point value. Each metric is
//! scored independently and the sub-scores are summed:
//!
//! | Metric | Rule                                   | Ceiling |
//! |--------|----------------------------------------|---------|
//! | Steps  | `>= 10000` → 100, else `steps / 100`   | 100     |
//! | Water  | `>= 8` → 50, else `floor(water * 6.25)`| 50      |
//! | Sleep  | 7..=9 → 50, 6..=10 → 25, else 0        | 50      |
//!
//! All functions are pure.

use serde::{Deserialize, Serialize};

use crate::metrics::MetricsRecord;

/// Steps at which the steps sub-score stops growing.
pub const STEPS_TARGET: u64 = 10_000;
/// Glasses of water at which the water sub-score stops growing.
pub const WATER_TARGET: u64 = 8;
/// Highest possible result of [`compute_daily_points`].
pub const MAX_DAILY_POINTS: u64 = 200;

const STEPS_CEILING: u64 = 100;
const WATER_CEILING: u64 = 50;
const SLEEP_IDEAL: u64 = 50;
const SLEEP_ACCEPTABLE: u64 = 25;

/// Steps sub-score.
pub fn steps_score(steps: u64) -> u64 {
    // Caps anything past the target; floor(10000 / 100) is already 100.
    if steps >= STEPS_TARGET {
        STEPS_CEILING
    } else {
        steps / 100
    }
}

/// Water sub-score. `floor(water * 6.25)` computed exactly in integers.
pub fn water_score(water_intake: u64) -> u64 {
    if water_intake >= WATER_TARGET {
        WATER_CEILING
    } else {
        water_intake * 25 / 4
    }
}

/// Sleep sub-score.
pub fn sleep_score(sleep_hours: u64) -> u64 {
    match sleep_hours {
        7..=9 => SLEEP_IDEAL,
        6 | 10 => SLEEP_ACCEPTABLE,
        _ => 0,
    }
}

/// Points earned for one day of metrics. Calories do not score.
pub fn compute_daily_points(steps: u64, water_intake: u64, sleep_hours: u64) -> u64 {
    steps_score(steps) + water_score(water_intake) + sleep_score(sleep_hours)
}

/// Per-metric breakdown of a daily score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsBreakdown {
    pub steps: u64,
    pub water: u64,
    pub sleep: u64,
    pub total: u64,
}

/// Score a record and keep the individual terms.
pub fn score_breakdown(record: &MetricsRecord) -> PointsBreakdown {
    let steps = steps_score(record.steps);
    let water = water_score(record.water_intake);
    let sleep = sleep_score(record.sleep_hours);
    PointsBreakdown {
        steps,
        water,
        sleep,
        total: steps + water + sleep,
    }
}
