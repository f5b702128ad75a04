use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route("/api/habits/:id", put(handlers::update_habit).delete(handlers::delete_habit))
        .route("/api/days/:date", get(handlers::get_day))
        .route("/api/days/:date/habits/:id", put(handlers::set_value))
        .route("/api/days/:date/habits/:id/tasks", post(handlers::toggle_task))
        .route("/api/days/:date/habits/:id/slider", post(handlers::push_slider))
        .route("/api/days/:date/lock", post(handlers::lock_day).delete(handlers::unlock_day))
        .route("/api/days/:date/lock/toggle", post(handlers::toggle_lock))
        .route("/api/streak", get(handlers::get_streak))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/calendar/:year/:month", get(handlers::get_calendar))
        .route("/api/timers/:id", get(handlers::get_timer))
        .route("/api/timers/:id/start", post(handlers::start_timer))
        .route("/api/timers/:id/stop", post(handlers::stop_timer))
        .route("/api/timers/:id/reset", post(handlers::reset_timer))
        .route("/api/timers/:id/dismiss", post(handlers::dismiss_checkpoint))
        .with_state(state)
}
