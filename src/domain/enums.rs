use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How often a template recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatFrequency {
    /// One-off: scheduled only via its reminder date
    Once,
    /// Active every day
    Daily,
    /// Active on a custom set of weekdays
    Custom,
}

/// What kind of template an overlay row points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Task,
    Routine,
}

/// Per-day override kind carried by an overlay row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideStatus {
    /// Suppress the scheduled item (or a specific added copy) for the day
    Skipped,
    /// An extra copy of a template added just for the day
    Added,
    /// The scheduled item keeps its recurrence but moves to a new time
    Rescheduled,
}

/// Identity of a materialized instance.
///
/// Carries the instance's origin explicitly instead of encoding it into a
/// prefixed id string, so nothing in the crate ever parses an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceId {
    /// A template scheduled by its own recurrence rule
    Scheduled { template_id: Uuid },
    /// A copy added for one day via an overlay row; keyed by the row's
    /// collision-free instance id
    Added { instance_id: Uuid },
    /// A recurring habit with no time slot, shown outside the timeline
    Unscheduled { template_id: Uuid, date: NaiveDate },
}

impl InstanceId {
    /// The template behind this instance, if it has one directly
    /// (added copies resolve through their overlay row instead)
    pub fn template_id(&self) -> Option<Uuid> {
        match self {
            InstanceId::Scheduled { template_id } => Some(*template_id),
            InstanceId::Unscheduled { template_id, .. } => Some(*template_id),
            InstanceId::Added { .. } => None,
        }
    }

    /// Whether this instance came from an `added` overlay row
    pub fn is_added(&self) -> bool {
        matches!(self, InstanceId::Added { .. })
    }
}
