use crate::completion::day_completion;
use crate::progress::ProgressStore;
use crate::registry::HabitRegistry;
use chrono::{Duration, NaiveDate};
use tracing::debug;

/// How far back, in days before today, the scan looks.
pub const LOOKBACK_DAYS: i64 = 365;

/// Length of the current non-regressing run of scheduled days ending today.
///
/// Days are walked from today backwards; only days on which at least one
/// habit (by its current schedule) is active take part. The run continues
/// while each older day's completion does not exceed the newer one. A zero
/// day ends the run and is not counted.
pub fn compute_streak(habits: &HabitRegistry, progress: &ProgressStore, today: NaiveDate) -> u32 {
    let scheduled: Vec<f64> = (0..=LOOKBACK_DAYS)
        .map(|offset| today - Duration::days(offset))
        .filter(|date| habits.has_active_on(*date))
        .map(|date| day_completion(habits, progress, date))
        .collect();

    let streak = streak_from(&scheduled);
    debug!(today = %today, scheduled = scheduled.len(), streak, "streak recomputed");
    streak
}

/// `completions` holds one entry per scheduled day, newest first.
fn streak_from(completions: &[f64]) -> u32 {
    match completions {
        [] => 0,
        [only] => u32::from(*only > 0.0),
        [latest, ..] if *latest == 0.0 => 0,
        days => count_run(days),
    }
}

fn count_run(completions: &[f64]) -> u32 {
    let mut streak: u32 = 1;
    let mut counted_zero_day = false;

    for pair in completions.windows(2) {
        let (current, previous) = (pair[0], pair[1]);
        if previous == 0.0 {
            if current >= previous {
                streak += 1;
                counted_zero_day = true;
            }
            break;
        }
        if previous > current {
            break;
        }
        streak += 1;
    }

    if counted_zero_day {
        streak.saturating_sub(1)
    } else {
        streak
    }
}
