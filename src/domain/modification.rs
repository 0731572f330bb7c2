use super::enums::{ItemType, OverrideStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Override payload carried by an overlay row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    pub status: OverrideStatus,
    /// Replacement start as "HH:MM" (rescheduled and added rows)
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Completion state for added copies, which never touch their template
    #[serde(default)]
    pub completed: Option<bool>,
}

impl Modification {
    pub fn skipped() -> Self {
        Self {
            status: OverrideStatus::Skipped,
            start_time: None,
            end_time: None,
            completed: None,
        }
    }

    pub fn added(start_time: Option<String>) -> Self {
        Self {
            status: OverrideStatus::Added,
            start_time,
            end_time: None,
            completed: None,
        }
    }

    pub fn rescheduled(start_time: impl Into<String>, end_time: Option<String>) -> Self {
        Self {
            status: OverrideStatus::Rescheduled,
            start_time: Some(start_time.into()),
            end_time,
            completed: None,
        }
    }

    /// Merge another payload into this one: status always wins, optional
    /// fields only overwrite when the incoming payload carries them
    pub fn merge(&mut self, other: &Modification) {
        self.status = other.status;
        if other.start_time.is_some() {
            self.start_time = other.start_time.clone();
        }
        if other.end_time.is_some() {
            self.end_time = other.end_time.clone();
        }
        if other.completed.is_some() {
            self.completed = other.completed;
        }
    }
}

/// A per-day override row layered on top of template scheduling.
///
/// At most one row exists per `(date, item_id, item_type)` without an
/// `instance_id` (the canonical row, converged by upsert). Rows with an
/// `instance_id` are added copies and are never deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyModification {
    pub id: Uuid,
    pub date: NaiveDate,
    pub item_id: Uuid,
    pub item_type: ItemType,
    /// Unique key distinguishing multiple added copies of one template on
    /// the same day; on skip rows it targets a specific copy
    #[serde(default)]
    pub instance_id: Option<Uuid>,
    pub modification: Modification,
}

impl DailyModification {
    pub fn new(
        date: NaiveDate,
        item_id: Uuid,
        item_type: ItemType,
        modification: Modification,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            item_id,
            item_type,
            instance_id: None,
            modification,
        }
    }

    /// The key this row contributes to skip matching and instance identity;
    /// falls back to the row's own id for legacy rows missing one
    pub fn effective_instance_id(&self) -> Uuid {
        self.instance_id.unwrap_or(self.id)
    }

    /// Whether this is the canonical (non-copy) row for its item and day
    pub fn is_canonical(&self) -> bool {
        self.instance_id.is_none()
    }
}
