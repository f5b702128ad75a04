use crate::progress::parse_date_key;
use crate::state::AppState;
use crate::storage::save_tracker;
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Ticks one timer run until it stops, is stopped, or is superseded.
pub fn spawn_timer(state: AppState, habit_id: String, run: u64) {
    tokio::spawn(async move {
        let mut ticker = interval(state.timer_tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let mut tracker = state.tracker.lock().await;
            let outcome = {
                let mut timers = state.timers.lock().await;
                if !timers.is_current(&habit_id, run) {
                    debug!(habit = %habit_id, run, "timer run ended");
                    break;
                }
                let today = tracker.today();
                let outcome = tracker.tick_timer(&habit_id, today);
                timers.apply(&habit_id, outcome);
                outcome
            };

            if outcome.written_value().is_some() {
                save_tracker(&state.store, &tracker).await;
            }
            if !outcome.keeps_running() {
                info!(habit = %habit_id, ?outcome, "timer stopped");
                break;
            }
        }
    });
}

/// Commits slider values once they have been quiet for the buffer window.
pub fn spawn_slider_flusher(state: AppState, window: Duration) {
    let poll = (window / 3).max(Duration::from_millis(10));
    tokio::spawn(async move {
        let mut ticker = interval(poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let due = state.sliders.lock().await.drain_due(Instant::now());
            if due.is_empty() {
                continue;
            }

            let mut tracker = state.tracker.lock().await;
            for write in &due {
                let Some(date) = parse_date_key(&write.date_key) else {
                    warn!(date = %write.date_key, "dropping slider write with bad date");
                    continue;
                };
                let outcome = tracker.set_progress(&write.habit_id, date, write.value.clone());
                debug!(
                    habit = %write.habit_id,
                    date = %write.date_key,
                    ?outcome,
                    "slider write flushed"
                );
            }
            save_tracker(&state.store, &tracker).await;
        }
    });
}
