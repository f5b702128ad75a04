use crate::errors::AppError;
use crate::models::{
    DayView, Habit, HabitDraft, HabitKind, HabitResponse, LockResponse, MonthCalendar,
    ProgressValue, SliderRequest, StatsResponse, StreakData, TaskToggleRequest, TimerStatus,
    ValueRequest, WriteOutcome, WriteResponse,
};
use crate::progress::{date_key, parse_date_key};
use crate::state::AppState;
use crate::stats::{build_stats, build_stats_for_week, month_calendar};
use crate::storage::save_tracker;
use crate::timer::TimerBoard;
use crate::tracker::HabitTracker;
use crate::workers::spawn_timer;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub week_start: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimerResponse {
    pub outcome: WriteOutcome,
    pub status: Option<TimerStatus>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    parse_date_key(raw)
        .ok_or_else(|| AppError::bad_request(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

fn write_response(
    tracker: &HabitTracker,
    outcome: WriteOutcome,
    habit_id: &str,
    date: NaiveDate,
) -> WriteResponse {
    WriteResponse {
        outcome,
        value: tracker.value(habit_id, date),
        streak: tracker.streak().current_streak,
    }
}

pub async fn list_habits(State(state): State<AppState>) -> Json<Vec<Habit>> {
    let tracker = state.tracker.lock().await;
    Json(tracker.habits().habits().to_vec())
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(draft): Json<HabitDraft>,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    let mut tracker = state.tracker.lock().await;
    let habit = tracker.create_habit(draft)?;
    save_tracker(&state.store, &tracker).await;
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<HabitDraft>,
) -> Result<Json<HabitResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let updated = tracker.update_habit(&id, draft)?;
    let outcome = match updated {
        Some(_) => {
            save_tracker(&state.store, &tracker).await;
            WriteOutcome::Applied
        }
        None => WriteOutcome::UnknownHabit,
    };
    Ok(Json(HabitResponse {
        outcome,
        habit: updated,
    }))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<HabitResponse> {
    let mut tracker = state.tracker.lock().await;
    let removed = tracker.delete_habit(&id);
    if removed.is_some() {
        state.timers.lock().await.reset(&id);
        state.sliders.lock().await.discard_habit(&id);
        save_tracker(&state.store, &tracker).await;
    }
    Json(HabitResponse {
        outcome: if removed.is_some() {
            WriteOutcome::Applied
        } else {
            WriteOutcome::UnknownHabit
        },
        habit: removed,
    })
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayView>, AppError> {
    let date = parse_date(&date)?;
    let tracker = state.tracker.lock().await;
    Ok(Json(tracker.day_view(date)))
}

pub async fn set_value(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, String)>,
    Json(payload): Json<ValueRequest>,
) -> Result<Json<WriteResponse>, AppError> {
    let date = parse_date(&date)?;
    let mut tracker = state.tracker.lock().await;
    let outcome = tracker.set_progress(&id, date, payload.value);
    if outcome == WriteOutcome::Applied {
        save_tracker(&state.store, &tracker).await;
    }
    Ok(Json(write_response(&tracker, outcome, &id, date)))
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, String)>,
    Json(payload): Json<TaskToggleRequest>,
) -> Result<Json<WriteResponse>, AppError> {
    let date = parse_date(&date)?;
    let mut tracker = state.tracker.lock().await;
    let outcome = tracker.toggle_task(&id, date, &payload.task, payload.included);
    if outcome == WriteOutcome::Applied {
        save_tracker(&state.store, &tracker).await;
    }
    Ok(Json(write_response(&tracker, outcome, &id, date)))
}

/// Queues a slider value; the flusher commits the last one per window.
pub async fn push_slider(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, String)>,
    Json(payload): Json<SliderRequest>,
) -> Result<(StatusCode, Json<WriteResponse>), AppError> {
    let date = parse_date(&date)?;
    let tracker = state.tracker.lock().await;
    let outcome = match tracker.habit(&id) {
        Some(habit) if !matches!(habit.kind, HabitKind::Slider { .. }) => {
            warn!(
                habit = %id,
                kind = habit.kind.label(),
                "slider write for non-slider habit ignored"
            );
            WriteOutcome::UnknownHabit
        }
        None => {
            warn!(habit = %id, "slider write for unknown habit ignored");
            WriteOutcome::UnknownHabit
        }
        Some(_) if tracker.is_locked(date) => WriteOutcome::Locked,
        Some(_) => {
            state
                .sliders
                .lock()
                .await
                .push(&id, &date_key(date), ProgressValue::Amount(payload.value), Instant::now());
            WriteOutcome::Applied
        }
    };
    let status = if outcome == WriteOutcome::Applied {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(write_response(&tracker, outcome, &id, date))))
}

pub async fn lock_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<LockResponse>, AppError> {
    let date = parse_date(&date)?;
    let mut tracker = state.tracker.lock().await;
    if tracker.lock_day(date) {
        save_tracker(&state.store, &tracker).await;
    }
    Ok(Json(LockResponse {
        date: date_key(date),
        locked: tracker.is_locked(date),
    }))
}

pub async fn unlock_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<LockResponse>, AppError> {
    let date = parse_date(&date)?;
    let mut tracker = state.tracker.lock().await;
    if tracker.unlock_day(date) {
        save_tracker(&state.store, &tracker).await;
    }
    Ok(Json(LockResponse {
        date: date_key(date),
        locked: tracker.is_locked(date),
    }))
}

pub async fn toggle_lock(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<LockResponse>, AppError> {
    let date = parse_date(&date)?;
    let mut tracker = state.tracker.lock().await;
    let locked = tracker.toggle_lock(date);
    save_tracker(&state.store, &tracker).await;
    Ok(Json(LockResponse {
        date: date_key(date),
        locked,
    }))
}

pub async fn get_streak(State(state): State<AppState>) -> Json<StreakData> {
    let mut tracker = state.tracker.lock().await;
    tracker.refresh_streak();
    save_tracker(&state.store, &tracker).await;
    Json(tracker.streak().clone())
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.refresh_streak();
    let stats = match query.week_start.as_deref() {
        Some(raw) => build_stats_for_week(&tracker, parse_date(raw)?),
        None => build_stats(&tracker),
    };
    save_tracker(&state.store, &tracker).await;
    Ok(Json(stats))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthCalendar>, AppError> {
    let tracker = state.tracker.lock().await;
    month_calendar(&tracker, year, month)
        .map(Json)
        .ok_or_else(|| AppError::bad_request(format!("invalid month {year}-{month}")))
}

fn timer_status(tracker: &HabitTracker, timers: &TimerBoard, id: &str) -> Option<TimerStatus> {
    let habit = tracker.habit(id)?;
    let HabitKind::Timer { goal_time, .. } = &habit.kind else {
        return None;
    };
    Some(TimerStatus {
        habit_id: habit.id.clone(),
        running: timers.is_running(id),
        checkpoint_reached: timers.checkpoint_reached(id),
        value: tracker.progress().get(habit, tracker.today()).as_amount(),
        goal_time: *goal_time,
    })
}

fn unknown_timer(id: &str) -> Json<TimerResponse> {
    warn!(habit = %id, "timer request for unknown or non-timer habit ignored");
    Json(TimerResponse {
        outcome: WriteOutcome::UnknownHabit,
        status: None,
    })
}

pub async fn get_timer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TimerStatus>, AppError> {
    let tracker = state.tracker.lock().await;
    let timers = state.timers.lock().await;
    timer_status(&tracker, &timers, &id)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no timer habit '{id}'")))
}

pub async fn start_timer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<TimerResponse> {
    let tracker = state.tracker.lock().await;
    let mut timers = state.timers.lock().await;
    if timer_status(&tracker, &timers, &id).is_none() {
        return unknown_timer(&id);
    }
    if let Some(run) = timers.start(&id) {
        info!(habit = %id, run, "timer started");
        spawn_timer(state.clone(), id.clone(), run);
    }
    Json(TimerResponse {
        outcome: WriteOutcome::Applied,
        status: timer_status(&tracker, &timers, &id),
    })
}

pub async fn stop_timer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<TimerResponse> {
    let tracker = state.tracker.lock().await;
    let mut timers = state.timers.lock().await;
    if timer_status(&tracker, &timers, &id).is_none() {
        return unknown_timer(&id);
    }
    timers.stop(&id);
    Json(TimerResponse {
        outcome: WriteOutcome::Applied,
        status: timer_status(&tracker, &timers, &id),
    })
}

pub async fn dismiss_checkpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<TimerResponse> {
    let tracker = state.tracker.lock().await;
    let mut timers = state.timers.lock().await;
    if timer_status(&tracker, &timers, &id).is_none() {
        return unknown_timer(&id);
    }
    timers.dismiss(&id);
    Json(TimerResponse {
        outcome: WriteOutcome::Applied,
        status: timer_status(&tracker, &timers, &id),
    })
}

pub async fn reset_timer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<TimerResponse> {
    let mut tracker = state.tracker.lock().await;
    let mut timers = state.timers.lock().await;
    if timer_status(&tracker, &timers, &id).is_none() {
        return unknown_timer(&id);
    }
    timers.reset(&id);
    let today = tracker.today();
    let outcome = tracker.set_progress(&id, today, ProgressValue::Amount(0));
    if outcome == WriteOutcome::Applied {
        save_tracker(&state.store, &tracker).await;
    }
    Json(TimerResponse {
        outcome,
        status: timer_status(&tracker, &timers, &id),
    })
}
