use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_SLIDER_MAX: i64 = 100;

pub fn default_weight() -> f64 {
    1.0
}

fn default_slider_max() -> i64 {
    DEFAULT_SLIDER_MAX
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
}

/// Per-type configuration of a habit. Serialized inline with the habit,
/// discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HabitKind {
    Checkbox {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tasks: Vec<Task>,
    },
    #[serde(rename_all = "camelCase")]
    Slider {
        #[serde(default = "default_slider_max")]
        max_value: i64,
    },
    #[serde(rename_all = "camelCase")]
    Timer {
        #[serde(default)]
        goal_time: i64,
        #[serde(default)]
        checkpoint_time: Option<i64>,
    },
}

impl HabitKind {
    pub fn label(&self) -> &'static str {
        match self {
            HabitKind::Checkbox { .. } => "checkbox",
            HabitKind::Slider { .. } => "slider",
            HabitKind::Timer { .. } => "timer",
        }
    }

    /// The value a habit reads as when nothing has been recorded for a day.
    pub fn zero_value(&self) -> ProgressValue {
        match self {
            HabitKind::Checkbox { tasks } if !tasks.is_empty() => ProgressValue::Tasks(Vec::new()),
            HabitKind::Checkbox { .. } => ProgressValue::Done(false),
            HabitKind::Slider { .. } | HabitKind::Timer { .. } => ProgressValue::Amount(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Weekday indexes, 0 = Sunday. Empty means every day.
    #[serde(default)]
    pub days: Vec<u8>,
    #[serde(default)]
    pub color: String,
    #[serde(flatten)]
    pub kind: HabitKind,
}

impl Habit {
    pub fn effective_weight(&self) -> f64 {
        if self.weight > 0.0 && self.weight.is_finite() {
            self.weight
        } else {
            default_weight()
        }
    }

    pub fn zero_value(&self) -> ProgressValue {
        self.kind.zero_value()
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        if self.days.is_empty() {
            return true;
        }
        let weekday = date.weekday().num_days_from_sunday() as u8;
        self.days.contains(&weekday)
    }
}

/// A recorded progress value. The shape depends on the habit type:
/// plain checkboxes store a flag, checkboxes with tasks store the names of
/// the completed tasks, sliders and timers store an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressValue {
    Done(bool),
    Amount(i64),
    Tasks(Vec<String>),
}

impl ProgressValue {
    pub fn as_amount(&self) -> i64 {
        match self {
            ProgressValue::Amount(value) => *value,
            _ => 0,
        }
    }

    pub fn as_tasks(&self) -> &[String] {
        match self {
            ProgressValue::Tasks(names) => names,
            _ => &[],
        }
    }
}

/// Progress recorded for one calendar day. Once `locked_snapshot` is set,
/// reads resolve through it and writes are refused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayEntry {
    #[serde(rename = "lockedSnapshot", default, skip_serializing_if = "Option::is_none")]
    pub locked_snapshot: Option<BTreeMap<String, ProgressValue>>,
    #[serde(flatten)]
    pub values: BTreeMap<String, ProgressValue>,
}

impl DayEntry {
    pub fn is_locked(&self) -> bool {
        self.locked_snapshot.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakData {
    pub current_streak: u32,
    pub last_streak_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HabitDraft {
    pub name: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub days: Vec<u8>,
    #[serde(default)]
    pub color: String,
    #[serde(flatten)]
    pub kind: HabitKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Applied,
    Locked,
    UnknownHabit,
}

#[derive(Debug, Deserialize)]
pub struct ValueRequest {
    pub value: ProgressValue,
}

#[derive(Debug, Deserialize)]
pub struct TaskToggleRequest {
    pub task: String,
    pub included: bool,
}

#[derive(Debug, Deserialize)]
pub struct SliderRequest {
    pub value: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WriteResponse {
    pub outcome: WriteOutcome,
    pub value: Option<ProgressValue>,
    pub streak: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitResponse {
    pub outcome: WriteOutcome,
    pub habit: Option<Habit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitDayView {
    pub habit: Habit,
    pub active: bool,
    pub value: ProgressValue,
    pub percent: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayView {
    pub date: String,
    pub locked: bool,
    pub completion: f64,
    pub habits: Vec<HabitDayView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LockResponse {
    pub date: String,
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPoint {
    pub day: String,
    pub date: String,
    pub completion: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitBreakdown {
    pub id: String,
    pub name: String,
    pub color: String,
    pub weight: f64,
    pub average_completion: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub week_start: String,
    pub week_end: String,
    pub days: Vec<DayPoint>,
    pub week_completion: u32,
    pub best_day: Option<DayPoint>,
    pub habits: Vec<HabitBreakdown>,
    pub current_streak: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: String,
    pub completion: u32,
    pub locked: bool,
    pub has_active_habits: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerStatus {
    pub habit_id: String,
    pub running: bool,
    pub checkpoint_reached: bool,
    pub value: i64,
    pub goal_time: i64,
}
