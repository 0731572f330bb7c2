use crate::domain::RepeatFrequency;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Recurrence rule shared by task and routine templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatRule {
    pub frequency: RepeatFrequency,
    /// Weekdays the template is active on; consulted only for `Custom`
    #[serde(default)]
    pub custom_days: HashSet<Weekday>,
}

impl RepeatRule {
    pub fn once() -> Self {
        Self {
            frequency: RepeatFrequency::Once,
            custom_days: HashSet::new(),
        }
    }

    pub fn daily() -> Self {
        Self {
            frequency: RepeatFrequency::Daily,
            custom_days: HashSet::new(),
        }
    }

    pub fn custom(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            frequency: RepeatFrequency::Custom,
            custom_days: days.into_iter().collect(),
        }
    }

    /// Whether the rule puts the template on the given date.
    ///
    /// `Once` templates are never recurrently active; their scheduling is
    /// decided by the materializer from the reminder date.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        match self.frequency {
            RepeatFrequency::Once => false,
            RepeatFrequency::Daily => true,
            RepeatFrequency::Custom => self.custom_days.contains(&date.weekday()),
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.frequency != RepeatFrequency::Once
    }
}
