//! Last-value-wins buffer for slider writes.

use crate::models::ProgressValue;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub habit_id: String,
    pub date_key: String,
    pub value: ProgressValue,
}

#[derive(Debug, Clone)]
struct Pending {
    value: ProgressValue,
    pushed_at: Instant,
}

/// Holds the latest value per (habit, day) until it has been quiet for the
/// window, so a drag gesture commits once instead of on every step.
#[derive(Debug)]
pub struct SliderBuffer {
    window: Duration,
    pending: HashMap<(String, String), Pending>,
}

impl Default for SliderBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl SliderBuffer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Replaces any pending value for the same habit and day.
    pub fn push(&mut self, habit_id: &str, date_key: &str, value: ProgressValue, now: Instant) {
        self.pending.insert(
            (habit_id.to_string(), date_key.to_string()),
            Pending {
                value,
                pushed_at: now,
            },
        );
    }

    /// Removes and returns every write that has been quiet for the window.
    pub fn drain_due(&mut self, now: Instant) -> Vec<PendingWrite> {
        let window = self.window;
        let mut ready = Vec::new();
        self.pending.retain(|(habit_id, date_key), pending| {
            if now.saturating_duration_since(pending.pushed_at) >= window {
                ready.push(PendingWrite {
                    habit_id: habit_id.clone(),
                    date_key: date_key.clone(),
                    value: pending.value.clone(),
                });
                false
            } else {
                true
            }
        });
        ready.sort_by(|a, b| (&a.date_key, &a.habit_id).cmp(&(&b.date_key, &b.habit_id)));
        ready
    }

    /// Drops pending writes for a habit that no longer exists.
    pub fn discard_habit(&mut self, habit_id: &str) {
        self.pending.retain(|(pending_habit, _), _| pending_habit != habit_id);
    }
}
