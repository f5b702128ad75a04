use crate::completion::percent_of;
use crate::models::{CalendarDay, DayPoint, HabitBreakdown, MonthCalendar, StatsResponse};
use crate::progress::date_key;
use crate::tracker::HabitTracker;
use chrono::{Datelike, Duration, NaiveDate};

const DAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn build_stats(tracker: &HabitTracker) -> StatsResponse {
    build_stats_for_week(tracker, week_start(tracker.today()))
}

pub fn build_stats_for_week(tracker: &HabitTracker, start: NaiveDate) -> StatsResponse {
    let start = week_start(start);
    let end = start + Duration::days(6);
    let days = week_data(tracker, start);

    let week_total: u32 = days.iter().map(|day| day.completion).sum();
    let week_completion = (f64::from(week_total) / days.len() as f64).round() as u32;

    let best_day = days
        .iter()
        .fold(None::<&DayPoint>, |best, day| match best {
            Some(best) if day.completion <= best.completion => Some(best),
            _ => Some(day),
        })
        .filter(|day| day.completion > 0)
        .cloned();

    StatsResponse {
        week_start: date_key(start),
        week_end: date_key(end),
        habits: habit_breakdown(tracker, start),
        days,
        week_completion,
        best_day,
        current_streak: tracker.streak().current_streak,
    }
}

pub fn week_data(tracker: &HabitTracker, start: NaiveDate) -> Vec<DayPoint> {
    (0..7)
        .map(|offset| {
            let date = start + Duration::days(offset);
            DayPoint {
                day: day_label(date).to_string(),
                date: date_key(date),
                completion: tracker.day_completion(date).round() as u32,
            }
        })
        .collect()
}

/// Mean completion of each habit over the days of the week it is scheduled on.
pub fn habit_breakdown(tracker: &HabitTracker, start: NaiveDate) -> Vec<HabitBreakdown> {
    tracker
        .habits()
        .habits()
        .iter()
        .map(|habit| {
            let mut total = 0.0;
            let mut active_days = 0u32;
            for offset in 0..7 {
                let date = start + Duration::days(offset);
                if habit.is_active_on(date) {
                    total += percent_of(habit, &tracker.progress().get(habit, date));
                    active_days += 1;
                }
            }
            HabitBreakdown {
                id: habit.id.clone(),
                name: habit.name.clone(),
                color: habit.color.clone(),
                weight: habit.effective_weight(),
                average_completion: if active_days > 0 {
                    total / f64::from(active_days)
                } else {
                    0.0
                },
            }
        })
        .collect()
}

pub fn month_calendar(tracker: &HabitTracker, year: i32, month: u32) -> Option<MonthCalendar> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days = first
        .iter_days()
        .take_while(|date| date.month() == month)
        .map(|date| CalendarDay {
            date: date_key(date),
            completion: tracker.day_completion(date).round() as u32,
            locked: tracker.is_locked(date),
            has_active_habits: tracker.habits().has_active_on(date),
        })
        .collect();
    Some(MonthCalendar { year, month, days })
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

fn day_label(date: NaiveDate) -> &'static str {
    DAY_LABELS[date.weekday().num_days_from_sunday() as usize]
}
