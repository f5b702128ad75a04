use crate::models::{Habit, HabitKind, ProgressValue};
use crate::progress::ProgressStore;
use crate::registry::HabitRegistry;
use chrono::NaiveDate;

/// Normalizes a raw progress value into a percentage in `[0, 100]`.
pub fn percent_of(habit: &Habit, value: &ProgressValue) -> f64 {
    let percent = match &habit.kind {
        HabitKind::Checkbox { tasks } if !tasks.is_empty() => {
            let done = value.as_tasks();
            let completed = tasks
                .iter()
                .filter(|task| done.iter().any(|name| *name == task.name))
                .count();
            100.0 * completed as f64 / tasks.len() as f64
        }
        HabitKind::Checkbox { .. } => {
            if *value == ProgressValue::Done(true) {
                100.0
            } else {
                0.0
            }
        }
        HabitKind::Slider { max_value } => {
            if *max_value <= 0 {
                0.0
            } else {
                let clamped = value.as_amount().clamp(0, *max_value);
                100.0 * clamped as f64 / *max_value as f64
            }
        }
        HabitKind::Timer { goal_time, .. } => {
            if *goal_time <= 0 {
                0.0
            } else {
                let capped = value.as_amount().clamp(0, *goal_time);
                100.0 * capped as f64 / *goal_time as f64
            }
        }
    };
    percent.clamp(0.0, 100.0)
}

/// Weighted mean completion of every habit active on `date`, or 0 when none are.
pub fn day_completion(habits: &HabitRegistry, progress: &ProgressStore, date: NaiveDate) -> f64 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for habit in habits.active_on(date) {
        let weight = habit.effective_weight();
        weighted += percent_of(habit, &progress.get(habit, date)) * weight;
        total_weight += weight;
    }
    if total_weight > 0.0 {
        weighted / total_weight
    } else {
        0.0
    }
}
