use crate::recurrence::RepeatRule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Duration assumed for items that don't specify one
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

/// A task template: a one-off task or a repeating habit.
///
/// Templates describe recurrence independent of any date; the materializer
/// turns them into date-bound instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    /// Life-area tag for grouping (e.g. "health", "work")
    #[serde(default)]
    pub pillar: Option<String>,
    pub repeat: RepeatRule,
    /// Wall-clock slot as "HH:MM"; absent means no slot in the timeline
    #[serde(default)]
    pub reminder_time: Option<String>,
    /// The single scheduled date for `Once` tasks
    #[serde(default)]
    pub reminder_date: Option<NaiveDate>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Present when the task is a multi-day challenge habit
    #[serde(default)]
    pub challenge_days: Option<u32>,
    /// Ground-truth completion ledger for habits, one date per completed day
    #[serde(default)]
    pub completion_dates: BTreeSet<NaiveDate>,
    /// Simple completed flag, meaningful only for `Once` tasks
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(name: impl Into<String>, repeat: RepeatRule) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            pillar: None,
            repeat,
            reminder_time: None,
            reminder_date: None,
            duration_minutes: None,
            challenge_days: None,
            completion_dates: BTreeSet::new(),
            completed: false,
        }
    }

    /// A habit tracks completion per date: anything recurring, or anything
    /// marked as a multi-day challenge
    pub fn is_habit(&self) -> bool {
        self.repeat.is_recurring() || self.challenge_days.is_some()
    }

    /// Effective duration, defaulted when the template has none
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES)
    }

    /// Display completion for the given date: ledger membership for habits,
    /// the simple flag for one-offs
    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        if self.is_habit() {
            self.completion_dates.contains(&date)
        } else {
            self.completed
        }
    }
}
