//! Resolves a completion toggle against the correct underlying record:
//! a template's completion ledger, a template's simple flag, or an added
//! copy's overlay row.
//!
//! `today` is injected by the caller rather than read from the wall clock,
//! so the future-date guard and flag recomputation are deterministic.

use crate::domain::{InstanceId, OverrideStatus, UserStats, POINTS_PER_COMPLETION};
use crate::store::ScheduleStore;
use anyhow::Result;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Engine-level resolution failures
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no template with id {0}")]
    UnknownTemplate(Uuid),
    #[error("no overlay row for added instance {0} on {1}")]
    UnknownInstance(Uuid, NaiveDate),
}

/// Result of a toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Completion state after the toggle (unchanged when rejected)
    pub completed: bool,
    /// Point change applied to the user's stats; 0 when rejected
    pub points_delta: i64,
}

impl ToggleOutcome {
    fn rejected(current: bool) -> Self {
        Self { completed: current, points_delta: 0 }
    }
}

/// Toggle completion of one instance for `date`.
///
/// Marking a date strictly in the future is silently rejected unless the
/// date is already completed, so an erroneous future mark can be undone but
/// not created. Every accepted toggle moves the point total by ±10,
/// floored at zero.
pub fn toggle_completion(
    store: &mut dyn ScheduleStore,
    instance: &InstanceId,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<ToggleOutcome> {
    match instance {
        InstanceId::Added { instance_id } => {
            toggle_added_copy(store, *instance_id, date, today)
        }
        InstanceId::Scheduled { template_id }
        | InstanceId::Unscheduled { template_id, .. } => {
            toggle_template(store, *template_id, date, today)
        }
    }
}

/// Added copies keep completion on their overlay row; the template's
/// ledger is never touched
fn toggle_added_copy(
    store: &mut dyn ScheduleStore,
    instance_id: Uuid,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<ToggleOutcome> {
    // A copy-targeted skip row carries the same instance id as the copy it
    // suppresses; only the added row itself holds the completion state
    let row = store
        .modifications()
        .iter()
        .find(|r| {
            r.date == date
                && r.modification.status == OverrideStatus::Added
                && r.effective_instance_id() == instance_id
        })
        .cloned()
        .ok_or(EngineError::UnknownInstance(instance_id, date))?;

    let current = row.modification.completed.unwrap_or(false);
    if rejected_by_future_guard(date, today, current) {
        return Ok(ToggleOutcome::rejected(current));
    }

    let mut updated = row;
    updated.modification.completed = Some(!current);
    store.update_modification(updated)?;

    finish(store, !current)
}

fn toggle_template(
    store: &mut dyn ScheduleStore,
    template_id: Uuid,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<ToggleOutcome> {
    let mut task = store
        .task(template_id)
        .cloned()
        .ok_or(EngineError::UnknownTemplate(template_id))?;

    let new_state = if task.is_habit() {
        let current = task.completion_dates.contains(&date);
        if rejected_by_future_guard(date, today, current) {
            return Ok(ToggleOutcome::rejected(current));
        }
        if current {
            task.completion_dates.remove(&date);
        } else {
            task.completion_dates.insert(date);
        }
        // The simple flag reflects today, not the toggled date; these
        // differ when toggling a past day
        task.completed = task.completion_dates.contains(&today);
        !current
    } else {
        let current = task.completed;
        if rejected_by_future_guard(date, today, current) {
            return Ok(ToggleOutcome::rejected(current));
        }
        task.completed = !current;
        !current
    };

    store.update_task(task)?;
    finish(store, new_state)
}

/// Policy guard, not a failure: future dates can only be un-marked
fn rejected_by_future_guard(date: NaiveDate, today: NaiveDate, current: bool) -> bool {
    if date > today && !current {
        debug!(%date, %today, "rejected completion toggle for future date");
        true
    } else {
        false
    }
}

fn finish(store: &mut dyn ScheduleStore, completed: bool) -> Result<ToggleOutcome> {
    let points_delta = if completed {
        POINTS_PER_COMPLETION
    } else {
        -POINTS_PER_COMPLETION
    };
    let mut stats: UserStats = store.stats().clone();
    stats.apply_delta(points_delta);
    store.save_stats(stats)?;

    Ok(ToggleOutcome { completed, points_delta })
}
