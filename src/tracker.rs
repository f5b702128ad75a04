use crate::completion::{day_completion, percent_of};
use crate::errors::Result;
use crate::models::{
    DayView, Habit, HabitDayView, HabitDraft, ProgressValue, StreakData, WriteOutcome,
};
use crate::progress::{date_key, ProgressStore};
use crate::registry::HabitRegistry;
use crate::streak::compute_streak;
use crate::timer::{next_tick, TickOutcome};
use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

/// Application state: the two persisted aggregates plus the derived streak.
/// Every mutation recomputes the streak from scratch before returning.
#[derive(Debug, Clone, Default)]
pub struct HabitTracker {
    habits: HabitRegistry,
    progress: ProgressStore,
    streak: StreakData,
    pinned_today: Option<NaiveDate>,
}

impl HabitTracker {
    pub fn new(habits: HabitRegistry, progress: ProgressStore, streak: StreakData) -> Self {
        Self {
            habits,
            progress,
            streak,
            pinned_today: None,
        }
    }

    /// Fixes "today" instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.pinned_today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.pinned_today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn habits(&self) -> &HabitRegistry {
        &self.habits
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn streak(&self) -> &StreakData {
        &self.streak
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.get(id)
    }

    pub fn refresh_streak(&mut self) -> u32 {
        let today = self.today();
        let current = compute_streak(&self.habits, &self.progress, today);
        self.streak = StreakData {
            current_streak: current,
            last_streak_date: Some(date_key(today)),
        };
        current
    }

    pub fn create_habit(&mut self, draft: HabitDraft) -> Result<Habit> {
        let habit = self.habits.create(draft)?;
        info!(habit = %habit.id, kind = habit.kind.label(), "habit created");
        self.refresh_streak();
        Ok(habit)
    }

    pub fn update_habit(&mut self, id: &str, draft: HabitDraft) -> Result<Option<Habit>> {
        let updated = self.habits.update(id, draft)?;
        match &updated {
            Some(habit) => {
                info!(habit = %habit.id, "habit updated");
                self.refresh_streak();
            }
            None => warn!(habit = %id, "update for unknown habit ignored"),
        }
        Ok(updated)
    }

    pub fn delete_habit(&mut self, id: &str) -> Option<Habit> {
        let Some(removed) = self.habits.remove(id) else {
            warn!(habit = %id, "delete for unknown habit ignored");
            return None;
        };
        self.progress.purge_habit(id);
        info!(habit = %id, "habit deleted");
        self.refresh_streak();
        Some(removed)
    }

    pub fn value(&self, habit_id: &str, date: NaiveDate) -> Option<ProgressValue> {
        let habit = self.habits.get(habit_id)?;
        Some(self.progress.get(habit, date))
    }

    pub fn set_progress(
        &mut self,
        habit_id: &str,
        date: NaiveDate,
        value: ProgressValue,
    ) -> WriteOutcome {
        let Some(habit) = self.habits.get(habit_id) else {
            warn!(habit = %habit_id, "progress write for unknown habit ignored");
            return WriteOutcome::UnknownHabit;
        };
        if !self.progress.set(habit, date, value) {
            return WriteOutcome::Locked;
        }
        self.refresh_streak();
        WriteOutcome::Applied
    }

    pub fn toggle_task(
        &mut self,
        habit_id: &str,
        date: NaiveDate,
        task: &str,
        included: bool,
    ) -> WriteOutcome {
        let Some(habit) = self.habits.get(habit_id) else {
            warn!(habit = %habit_id, "task toggle for unknown habit ignored");
            return WriteOutcome::UnknownHabit;
        };
        if !self.progress.toggle_task(habit, date, task, included) {
            return WriteOutcome::Locked;
        }
        debug!(habit = %habit_id, task, included, date = %date, "task toggled");
        self.refresh_streak();
        WriteOutcome::Applied
    }

    pub fn is_locked(&self, date: NaiveDate) -> bool {
        self.progress.is_locked(date)
    }

    pub fn lock_day(&mut self, date: NaiveDate) -> bool {
        let changed = self.progress.lock(date, self.habits.active_on(date));
        if changed {
            info!(date = %date, "day locked");
            self.refresh_streak();
        }
        changed
    }

    pub fn unlock_day(&mut self, date: NaiveDate) -> bool {
        let changed = self.progress.unlock(date, self.habits.active_on(date));
        if changed {
            info!(date = %date, "day unlocked");
            self.refresh_streak();
        }
        changed
    }

    /// Returns the lock state after toggling.
    pub fn toggle_lock(&mut self, date: NaiveDate) -> bool {
        if self.is_locked(date) {
            self.unlock_day(date);
            false
        } else {
            self.lock_day(date);
            true
        }
    }

    pub fn day_completion(&self, date: NaiveDate) -> f64 {
        day_completion(&self.habits, &self.progress, date)
    }

    pub fn day_view(&self, date: NaiveDate) -> DayView {
        let habits = self
            .habits
            .habits()
            .iter()
            .map(|habit| {
                let value = self.progress.get(habit, date);
                HabitDayView {
                    active: habit.is_active_on(date),
                    percent: percent_of(habit, &value),
                    value,
                    habit: habit.clone(),
                }
            })
            .collect();
        DayView {
            date: date_key(date),
            locked: self.is_locked(date),
            completion: self.day_completion(date),
            habits,
        }
    }

    /// Advances a timer habit by one tick through the normal write path.
    pub fn tick_timer(&mut self, habit_id: &str, date: NaiveDate) -> TickOutcome {
        let Some(habit) = self.habits.get(habit_id) else {
            warn!(habit = %habit_id, "tick for unknown habit ignored");
            return TickOutcome::NotATimer;
        };
        if self.progress.is_locked(date) {
            return TickOutcome::Locked;
        }
        let current = self.progress.get(habit, date).as_amount();
        let outcome = next_tick(&habit.kind, current);
        if let Some(value) = outcome.written_value() {
            self.set_progress(habit_id, date, ProgressValue::Amount(value));
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HabitKind, Task};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 15).unwrap()
    }

    fn tracker() -> HabitTracker {
        HabitTracker::default().with_today(today())
    }

    fn draft(name: &str, kind: HabitKind) -> HabitDraft {
        HabitDraft {
            name: name.into(),
            weight: None,
            days: Vec::new(),
            color: String::new(),
            kind,
        }
    }

    #[test]
    fn writes_refresh_the_streak() {
        let mut tracker = tracker();
        let habit = tracker
            .create_habit(draft("Walk", HabitKind::Checkbox { tasks: Vec::new() }))
            .unwrap();
        assert_eq!(tracker.streak().current_streak, 0);

        let outcome = tracker.set_progress(&habit.id, today(), ProgressValue::Done(true));
        assert_eq!(outcome, WriteOutcome::Applied);
        tracker.set_progress(&habit.id, today() - Duration::days(1), ProgressValue::Done(true));
        assert_eq!(tracker.streak().current_streak, 2);
        assert_eq!(tracker.streak().last_streak_date.as_deref(), Some("2026-07-15"));
    }

    #[test]
    fn unknown_habit_is_a_no_op() {
        let mut tracker = tracker();
        let outcome = tracker.set_progress("missing", today(), ProgressValue::Done(true));
        assert_eq!(outcome, WriteOutcome::UnknownHabit);
        assert!(tracker.progress().is_empty());
        assert!(tracker.delete_habit("missing").is_none());
        let update = tracker
            .update_habit("missing", draft("x", HabitKind::Checkbox { tasks: Vec::new() }))
            .unwrap();
        assert!(update.is_none());
    }

    #[test]
    fn locked_day_reports_locked() {
        let mut tracker = tracker();
        let habit = tracker
            .create_habit(draft("Water", HabitKind::Slider { max_value: 8 }))
            .unwrap();
        tracker.set_progress(&habit.id, today(), ProgressValue::Amount(4));
        assert!(tracker.toggle_lock(today()));

        let outcome = tracker.set_progress(&habit.id, today(), ProgressValue::Amount(8));
        assert_eq!(outcome, WriteOutcome::Locked);
        assert_eq!(tracker.value(&habit.id, today()), Some(ProgressValue::Amount(4)));

        assert!(!tracker.toggle_lock(today()));
        assert_eq!(
            tracker.set_progress(&habit.id, today(), ProgressValue::Amount(8)),
            WriteOutcome::Applied
        );
    }

    #[test]
    fn deleting_a_habit_purges_its_progress() {
        let mut tracker = tracker();
        let gone = tracker
            .create_habit(draft("Gone", HabitKind::Checkbox { tasks: Vec::new() }))
            .unwrap();
        let kept = tracker
            .create_habit(draft("Kept", HabitKind::Checkbox { tasks: Vec::new() }))
            .unwrap();
        let yesterday = today() - Duration::days(1);
        tracker.set_progress(&gone.id, today(), ProgressValue::Done(true));
        tracker.set_progress(&gone.id, yesterday, ProgressValue::Done(true));
        tracker.set_progress(&kept.id, yesterday, ProgressValue::Done(true));
        tracker.lock_day(yesterday);

        tracker.delete_habit(&gone.id);
        assert!(tracker.progress().entry(today()).is_none());
        let entry = tracker.progress().entry(yesterday).unwrap();
        assert!(!entry.values.contains_key(&gone.id));
        assert!(!entry.locked_snapshot.as_ref().unwrap().contains_key(&gone.id));
        assert_eq!(tracker.habits().habits().len(), 1);
    }

    #[test]
    fn task_toggles_drive_completion() {
        let mut tracker = tracker();
        let habit = tracker
            .create_habit(draft(
                "Morning",
                HabitKind::Checkbox {
                    tasks: vec![Task { name: "teeth".into() }, Task { name: "bed".into() }],
                },
            ))
            .unwrap();
        tracker.toggle_task(&habit.id, today(), "teeth", true);
        assert_eq!(tracker.day_completion(today()), 50.0);
        tracker.toggle_task(&habit.id, today(), "bed", true);
        assert_eq!(tracker.day_completion(today()), 100.0);

        let view = tracker.day_view(today());
        assert_eq!(view.date, "2026-07-15");
        assert_eq!(view.habits[0].percent, 100.0);
        assert!(!view.locked);
    }

    #[test]
    fn timer_ticks_clamp_at_goal() {
        let mut tracker = tracker();
        let habit = tracker
            .create_habit(draft(
                "Read",
                HabitKind::Timer {
                    goal_time: 300,
                    checkpoint_time: Some(60),
                },
            ))
            .unwrap();
        tracker.set_progress(&habit.id, today(), ProgressValue::Amount(299));

        assert_eq!(tracker.tick_timer(&habit.id, today()), TickOutcome::Completed(300));
        assert_eq!(tracker.value(&habit.id, today()), Some(ProgressValue::Amount(300)));
        assert_eq!(tracker.tick_timer(&habit.id, today()), TickOutcome::AlreadyComplete);
        assert_eq!(tracker.value(&habit.id, today()), Some(ProgressValue::Amount(300)));

        tracker.lock_day(today());
        assert_eq!(tracker.tick_timer(&habit.id, today()), TickOutcome::Locked);
    }

    #[test]
    fn habit_edits_recompute_the_streak() {
        let mut tracker = tracker();
        let habit = tracker
            .create_habit(draft("Walk", HabitKind::Checkbox { tasks: Vec::new() }))
            .unwrap();
        tracker.set_progress(&habit.id, today(), ProgressValue::Done(true));
        assert_eq!(tracker.streak().current_streak, 1);

        tracker
            .update_habit(&habit.id, draft("Walk", HabitKind::Slider { max_value: 10 }))
            .unwrap();
        assert_eq!(tracker.streak().current_streak, 0);
    }
}
