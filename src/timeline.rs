//! Merges a day's materialized instances into one chronological event list
//! with synthesized free-time gaps and a terminal day-end marker.
//!
//! For any non-empty plan the emitted spans tile `[day_start, 24:00)` with
//! no gaps; free time is whatever the scheduled items leave uncovered.

use crate::domain::{DailyModification, Routine, Task};
use crate::materialize::{materialize_day, DayPlan, RoutineInstance, TaskInstance};
use crate::timefmt::{self, DAY_END_MINUTES};
use chrono::NaiveDate;

/// Default start of the rendered day: 07:30
pub const DEFAULT_DAY_START: u32 = 7 * 60 + 30;

/// One entry in the day's chronological list. Ephemeral: rebuilt from
/// scratch on every composition, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEvent {
    Task(TaskInstance),
    Routine(RoutineInstance),
    FreeTime { start_minutes: u32, end_minutes: u32 },
    /// Visual closure marker; carries no span and joins no computation
    DayEnd,
}

impl TimelineEvent {
    pub fn start_minutes(&self) -> u32 {
        match self {
            TimelineEvent::Task(t) => t.start_minutes,
            TimelineEvent::Routine(r) => r.start_minutes,
            TimelineEvent::FreeTime { start_minutes, .. } => *start_minutes,
            TimelineEvent::DayEnd => DAY_END_MINUTES,
        }
    }

    pub fn end_minutes(&self) -> u32 {
        match self {
            TimelineEvent::Task(t) => t.end_minutes(),
            TimelineEvent::Routine(r) => r.end_minutes,
            TimelineEvent::FreeTime { end_minutes, .. } => *end_minutes,
            TimelineEvent::DayEnd => DAY_END_MINUTES,
        }
    }

    /// 12-hour display label, derived from the minute value at render time
    pub fn start_label(&self) -> String {
        timefmt::format_minutes_12(self.start_minutes())
    }

    pub fn is_free_time(&self) -> bool {
        matches!(self, TimelineEvent::FreeTime { .. })
    }
}

/// Build the ordered, gap-free event list for a materialized day.
///
/// `day_start_minutes` is the caller-configured start of the visible day;
/// instances starting earlier are kept and simply lead the list.
pub fn build_timeline(plan: &DayPlan, day_start_minutes: u32) -> Vec<TimelineEvent> {
    let mut events: Vec<TimelineEvent> = plan
        .tasks
        .iter()
        .cloned()
        .map(TimelineEvent::Task)
        .chain(plan.routines.iter().cloned().map(TimelineEvent::Routine))
        .collect();
    events.sort_by_key(|e| e.start_minutes());

    if events.is_empty() {
        return vec![
            TimelineEvent::FreeTime {
                start_minutes: day_start_minutes,
                end_minutes: DAY_END_MINUTES,
            },
            TimelineEvent::DayEnd,
        ];
    }

    let mut timeline = Vec::with_capacity(events.len() * 2 + 2);
    // Cursor tracks the furthest end seen, so overlapping items never open
    // a negative gap
    let mut cursor = day_start_minutes;

    for event in events {
        let start = event.start_minutes();
        if start > cursor {
            timeline.push(TimelineEvent::FreeTime {
                start_minutes: cursor,
                end_minutes: start,
            });
        }
        cursor = cursor.max(event.end_minutes());
        timeline.push(event);
    }

    if cursor < DAY_END_MINUTES {
        timeline.push(TimelineEvent::FreeTime {
            start_minutes: cursor,
            end_minutes: DAY_END_MINUTES,
        });
    }

    timeline.push(TimelineEvent::DayEnd);
    timeline
}

/// Compose a full day in one call: materialize instances, then build the
/// timeline. Pure and cheap; callers re-run it on every input change.
pub fn compose_day(
    tasks: &[Task],
    routines: &[Routine],
    rows: &[DailyModification],
    date: NaiveDate,
    day_start_minutes: u32,
) -> (Vec<TimelineEvent>, DayPlan) {
    let plan = materialize_day(tasks, routines, rows, date);
    let timeline = build_timeline(&plan, day_start_minutes);
    (timeline, plan)
}
