use crate::recurrence::RepeatRule;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A routine template: an ordered bundle of habits and tasks that runs as
/// one block with its own schedule.
///
/// Routines carry no completion state; a rendered routine derives its
/// completion from its members' states on that date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    pub id: Uuid,
    pub name: String,
    /// Member habit templates, in routine order
    #[serde(default)]
    pub habit_ids: Vec<Uuid>,
    /// Member one-off task templates, in routine order
    #[serde(default)]
    pub task_ids: Vec<Uuid>,
    /// Block start as "HH:MM"
    pub start_time: String,
    /// Explicit block end; when absent the end is start plus the sum of
    /// member durations
    #[serde(default)]
    pub end_time: Option<String>,
    pub repeat: RepeatRule,
}

impl Routine {
    pub fn new(name: impl Into<String>, start_time: impl Into<String>, repeat: RepeatRule) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            habit_ids: Vec::new(),
            task_ids: Vec::new(),
            start_time: start_time.into(),
            end_time: None,
            repeat,
        }
    }

    /// All member ids, habits first, preserving routine order
    pub fn member_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.habit_ids.iter().chain(self.task_ids.iter()).copied()
    }

    pub fn references(&self, template_id: Uuid) -> bool {
        self.member_ids().any(|id| id == template_id)
    }
}
