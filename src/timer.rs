//! Timer habit ticking.
//!
//! A running timer advances its habit's value by one second per tick. It
//! stops on its own when the goal is reached or when a checkpoint boundary
//! is crossed; in the latter case the checkpoint flag stays raised until the
//! timer is started again or the checkpoint is dismissed.

use crate::models::HabitKind;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Value advanced; keep ticking.
    Advanced(i64),
    /// Value advanced onto a checkpoint; the timer pauses.
    Checkpoint(i64),
    /// Value advanced onto the goal; the timer stops.
    Completed(i64),
    /// The goal was already met, nothing written.
    AlreadyComplete,
    /// The day is locked, nothing written.
    Locked,
    /// The habit is gone or is not a timer.
    NotATimer,
}

impl TickOutcome {
    pub fn keeps_running(self) -> bool {
        matches!(self, TickOutcome::Advanced(_))
    }

    pub fn written_value(self) -> Option<i64> {
        match self {
            TickOutcome::Advanced(value)
            | TickOutcome::Checkpoint(value)
            | TickOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// Decides the next value of a timer currently at `current` seconds.
/// Reaching the goal always wins over a checkpoint on the same second.
pub fn next_tick(kind: &HabitKind, current: i64) -> TickOutcome {
    let HabitKind::Timer {
        goal_time,
        checkpoint_time,
    } = kind
    else {
        return TickOutcome::NotATimer;
    };

    let current = current.max(0);
    if *goal_time > 0 && current >= *goal_time {
        return TickOutcome::AlreadyComplete;
    }

    let next = if *goal_time > 0 {
        (current + 1).min(*goal_time)
    } else {
        current + 1
    };

    if *goal_time > 0 && next == *goal_time {
        return TickOutcome::Completed(next);
    }
    match checkpoint_time {
        Some(checkpoint) if *checkpoint > 0 && next % checkpoint == 0 => {
            TickOutcome::Checkpoint(next)
        }
        _ => TickOutcome::Advanced(next),
    }
}

/// Per-habit run state of timers.
#[derive(Debug, Default)]
pub struct TimerBoard {
    entries: HashMap<String, TimerEntry>,
    runs: u64,
}

#[derive(Debug, Default, Clone, Copy)]
struct TimerEntry {
    running: bool,
    checkpoint_reached: bool,
    run: u64,
}

impl TimerBoard {
    /// Marks the timer running and clears its checkpoint flag. Returns the
    /// id of the new run, or `None` if it was already running.
    pub fn start(&mut self, habit_id: &str) -> Option<u64> {
        let entry = self.entries.entry(habit_id.to_string()).or_default();
        if entry.running {
            return None;
        }
        self.runs += 1;
        entry.running = true;
        entry.checkpoint_reached = false;
        entry.run = self.runs;
        Some(self.runs)
    }

    /// Whether `run` is still the live run of this timer. A tick loop from a
    /// stopped or superseded run must exit.
    pub fn is_current(&self, habit_id: &str, run: u64) -> bool {
        self.entries
            .get(habit_id)
            .is_some_and(|entry| entry.running && entry.run == run)
    }

    /// Stops the timer, keeping its checkpoint flag.
    pub fn stop(&mut self, habit_id: &str) -> bool {
        match self.entries.get_mut(habit_id) {
            Some(entry) if entry.running => {
                entry.running = false;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self, habit_id: &str) {
        self.entries.remove(habit_id);
    }

    pub fn dismiss(&mut self, habit_id: &str) {
        if let Some(entry) = self.entries.get_mut(habit_id) {
            entry.checkpoint_reached = false;
        }
    }

    pub fn is_running(&self, habit_id: &str) -> bool {
        self.entries.get(habit_id).is_some_and(|entry| entry.running)
    }

    pub fn checkpoint_reached(&self, habit_id: &str) -> bool {
        self.entries
            .get(habit_id)
            .is_some_and(|entry| entry.checkpoint_reached)
    }

    /// Records the effect of a tick on the run state.
    pub fn apply(&mut self, habit_id: &str, outcome: TickOutcome) {
        let Some(entry) = self.entries.get_mut(habit_id) else {
            return;
        };
        if !outcome.keeps_running() {
            entry.running = false;
        }
        if matches!(outcome, TickOutcome::Checkpoint(_)) {
            entry.checkpoint_reached = true;
        }
    }
}
