use crate::errors::{Result, TrackerError};
use crate::models::{default_weight, Habit, HabitDraft, HabitKind, Task, DEFAULT_SLIDER_MAX};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordered list of habit definitions. Order is creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitRegistry {
    habits: Vec<Habit>,
}

impl HabitRegistry {
    pub fn new(habits: Vec<Habit>) -> Self {
        Self { habits }
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn active_on(&self, date: NaiveDate) -> impl Iterator<Item = &Habit> {
        self.habits.iter().filter(move |habit| habit.is_active_on(date))
    }

    pub fn has_active_on(&self, date: NaiveDate) -> bool {
        self.active_on(date).next().is_some()
    }

    pub fn create(&mut self, draft: HabitDraft) -> Result<Habit> {
        let habit = build_habit(uuid::Uuid::new_v4().to_string(), draft)?;
        self.habits.push(habit.clone());
        Ok(habit)
    }

    /// Replaces every field of the habit except its id. Returns `Ok(None)`
    /// when no habit has that id.
    pub fn update(&mut self, id: &str, draft: HabitDraft) -> Result<Option<Habit>> {
        let rebuilt = build_habit(id.to_string(), draft)?;
        match self.habits.iter_mut().find(|habit| habit.id == id) {
            Some(slot) => {
                *slot = rebuilt.clone();
                Ok(Some(rebuilt))
            }
            None => Ok(None),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Habit> {
        let index = self.habits.iter().position(|habit| habit.id == id)?;
        Some(self.habits.remove(index))
    }
}

fn build_habit(id: String, draft: HabitDraft) -> Result<Habit> {
    let name = draft.name.trim().to_string();
    if name.is_empty() {
        return Err(TrackerError::Validation("habit name is required".into()));
    }

    let mut days = draft.days;
    if let Some(day) = days.iter().find(|day| **day > 6) {
        return Err(TrackerError::Validation(format!(
            "weekday index {day} is out of range 0-6"
        )));
    }
    days.sort_unstable();
    days.dedup();

    let weight = match draft.weight {
        Some(weight) if weight > 0.0 && weight.is_finite() => weight,
        _ => default_weight(),
    };

    let kind = match draft.kind {
        HabitKind::Checkbox { tasks } => HabitKind::Checkbox {
            tasks: tasks
                .into_iter()
                .map(|task| task.name.trim().to_string())
                .filter(|name| !name.is_empty())
                .map(|name| Task { name })
                .collect(),
        },
        HabitKind::Slider { max_value } => HabitKind::Slider {
            max_value: if max_value > 0 {
                max_value
            } else {
                DEFAULT_SLIDER_MAX
            },
        },
        HabitKind::Timer {
            goal_time,
            checkpoint_time,
        } => {
            if goal_time <= 0 {
                return Err(TrackerError::Validation(
                    "timer goal must be greater than zero".into(),
                ));
            }
            HabitKind::Timer {
                goal_time,
                checkpoint_time: checkpoint_time.filter(|cp| *cp > 0 && *cp < goal_time),
            }
        }
    };

    Ok(Habit {
        id,
        name,
        weight,
        days,
        color: draft.color,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn create_assigns_id_and_normalizes() {
        let mut registry = HabitRegistry::default();
        let mut input = draft(
            "  Stretch ",
            HabitKind::Checkbox {
                tasks: vec![
                    Task { name: " legs ".into() },
                    Task { name: "  ".into() },
                ],
            },
        );
        input.days = vec![3, 1, 3];
        input.weight = Some(0.0);

        let habit = registry.create(input).unwrap();
        assert!(!habit.id.is_empty());
        assert_eq!(habit.name, "Stretch");
        assert_eq!(habit.days, vec![1, 3]);
        assert_eq!(habit.weight, 1.0);
        assert_eq!(
            habit.kind,
            HabitKind::Checkbox {
                tasks: vec![Task { name: "legs".into() }]
            }
        );
        assert_eq!(registry.get(&habit.id), Some(&habit));
    }

    #[test]
    fn non_positive_weights_fall_back_to_one() {
        let mut registry = HabitRegistry::default();
        for raw in [-1.0, -0.5, f64::NAN, f64::INFINITY] {
            let mut input = draft("Walk", HabitKind::Checkbox { tasks: Vec::new() });
            input.weight = Some(raw);
            assert_eq!(registry.create(input).unwrap().weight, 1.0);
        }
        let mut input = draft("Walk", HabitKind::Checkbox { tasks: Vec::new() });
        input.weight = Some(2.5);
        assert_eq!(registry.create(input).unwrap().weight, 2.5);
    }

    #[test]
    fn rejects_blank_name_and_bad_timer_goal() {
        let mut registry = HabitRegistry::default();
        let blank = registry.create(draft("   ", HabitKind::Checkbox { tasks: Vec::new() }));
        assert!(matches!(blank, Err(TrackerError::Validation(_))));

        let timer = registry.create(draft(
            "Focus",
            HabitKind::Timer {
                goal_time: 0,
                checkpoint_time: None,
            },
        ));
        assert!(matches!(timer, Err(TrackerError::Validation(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn checkpoint_outside_goal_is_dropped() {
        let mut registry = HabitRegistry::default();
        let habit = registry
            .create(draft(
                "Focus",
                HabitKind::Timer {
                    goal_time: 600,
                    checkpoint_time: Some(600),
                },
            ))
            .unwrap();
        assert_eq!(
            habit.kind,
            HabitKind::Timer {
                goal_time: 600,
                checkpoint_time: None
            }
        );
    }

    #[test]
    fn update_keeps_id_and_swaps_kind() {
        let mut registry = HabitRegistry::default();
        let habit = registry
            .create(draft("Water", HabitKind::Slider { max_value: 0 }))
            .unwrap();
        assert_eq!(habit.kind, HabitKind::Slider { max_value: 100 });

        let updated = registry
            .update(&habit.id, draft("Water", HabitKind::Checkbox { tasks: Vec::new() }))
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, habit.id);
        assert_eq!(updated.kind.label(), "checkbox");

        let missing = registry
            .update("nope", draft("x", HabitKind::Checkbox { tasks: Vec::new() }))
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn out_of_range_weekday_is_rejected() {
        let mut registry = HabitRegistry::default();
        let mut input = draft("Run", HabitKind::Checkbox { tasks: Vec::new() });
        input.days = vec![7];
        assert!(registry.create(input).is_err());
    }
}
