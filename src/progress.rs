use crate::models::{DayEntry, Habit, HabitKind, ProgressValue};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

/// Date-keyed progress values. Entries are created on first write and
/// removed once they hold neither live values nor a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressStore {
    days: BTreeMap<String, DayEntry>,
}

impl ProgressStore {
    pub fn entry(&self, date: NaiveDate) -> Option<&DayEntry> {
        self.days.get(&date_key(date))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn is_locked(&self, date: NaiveDate) -> bool {
        self.entry(date).is_some_and(DayEntry::is_locked)
    }

    /// Recorded value for the habit on `date`, read through the snapshot
    /// when the day is locked, or the habit's zero value.
    pub fn get(&self, habit: &Habit, date: NaiveDate) -> ProgressValue {
        let Some(entry) = self.entry(date) else {
            return habit.zero_value();
        };
        let source = entry.locked_snapshot.as_ref().unwrap_or(&entry.values);
        source
            .get(&habit.id)
            .cloned()
            .unwrap_or_else(|| habit.zero_value())
    }

    /// Writes a live value. Returns `false` without touching anything if the
    /// day is locked. Timer values are clamped to `[0, goal]`.
    pub fn set(&mut self, habit: &Habit, date: NaiveDate, value: ProgressValue) -> bool {
        if self.is_locked(date) {
            debug!(habit = %habit.id, date = %date, "write ignored on locked day");
            return false;
        }
        let value = match (&habit.kind, value) {
            (HabitKind::Timer { goal_time, .. }, ProgressValue::Amount(seconds))
                if *goal_time > 0 =>
            {
                ProgressValue::Amount(seconds.clamp(0, *goal_time))
            }
            (_, value) => value,
        };
        self.days
            .entry(date_key(date))
            .or_default()
            .values
            .insert(habit.id.clone(), value);
        true
    }

    pub fn toggle_task(
        &mut self,
        habit: &Habit,
        date: NaiveDate,
        task: &str,
        included: bool,
    ) -> bool {
        let mut names = match self.get(habit, date) {
            ProgressValue::Tasks(names) => names,
            _ => Vec::new(),
        };
        let present = names.iter().any(|name| name == task);
        if included && !present {
            names.push(task.to_string());
        } else if !included {
            names.retain(|name| name != task);
        }
        self.set(habit, date, ProgressValue::Tasks(names))
    }

    /// Freezes the current values of every habit active on `date`. Returns
    /// `false` if the day was already locked.
    pub fn lock<'a>(
        &mut self,
        date: NaiveDate,
        active: impl IntoIterator<Item = &'a Habit>,
    ) -> bool {
        if self.is_locked(date) {
            return false;
        }
        let entry = self.days.entry(date_key(date)).or_default();
        let snapshot = active
            .into_iter()
            .map(|habit| {
                let value = entry
                    .values
                    .get(&habit.id)
                    .cloned()
                    .unwrap_or_else(|| habit.zero_value());
                (habit.id.clone(), value)
            })
            .collect();
        entry.locked_snapshot = Some(snapshot);
        true
    }

    /// Drops the snapshot and seeds zero values for active habits that never
    /// had a live value. Returns `false` if the day was not locked.
    pub fn unlock<'a>(
        &mut self,
        date: NaiveDate,
        active: impl IntoIterator<Item = &'a Habit>,
    ) -> bool {
        let key = date_key(date);
        let Some(entry) = self.days.get_mut(&key) else {
            return false;
        };
        if entry.locked_snapshot.take().is_none() {
            return false;
        }
        for habit in active {
            entry
                .values
                .entry(habit.id.clone())
                .or_insert_with(|| habit.zero_value());
        }
        if entry.values.is_empty() {
            self.days.remove(&key);
        }
        true
    }

    /// Removes every trace of a habit, live and snapshotted, and drops days
    /// left with no values and no (non-empty) snapshot.
    pub fn purge_habit(&mut self, habit_id: &str) {
        self.days.retain(|_, entry| {
            entry.values.remove(habit_id);
            if let Some(snapshot) = entry.locked_snapshot.as_mut() {
                snapshot.remove(habit_id);
            }
            let has_snapshot = entry
                .locked_snapshot
                .as_ref()
                .is_some_and(|snapshot| !snapshot.is_empty());
            !entry.values.is_empty() || has_snapshot
        });
    }
}
