//! Daily schedule composition engine.
//!
//! Turns recurring templates (one-off tasks, repeating habits, routines)
//! plus a sparse set of per-day overrides (skip / add / reschedule) into
//! one ordered, gap-free timeline for a single calendar day, and resolves
//! completion toggles against the correct underlying record.
//!
//! The engine is pure and synchronous: it reads an immutable snapshot of
//! templates and overlay rows and performs no I/O of its own. Writes go
//! through the [`store::ScheduleStore`] seam; the owning application
//! recomposes the day whenever its store notifies it of a change.
//!
//! ```
//! use dayline::domain::Task;
//! use dayline::recurrence::RepeatRule;
//! use dayline::timeline::{compose_day, DEFAULT_DAY_START};
//!
//! let mut run = Task::new("Morning run", RepeatRule::daily());
//! run.reminder_time = Some("08:00".to_string());
//!
//! let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
//! let (timeline, plan) = compose_day(&[run], &[], &[], date, DEFAULT_DAY_START);
//! assert_eq!(plan.tasks.len(), 1);
//! assert_eq!(timeline.first().unwrap().start_label(), "7:30 AM");
//! ```

pub mod domain;
pub mod materialize;
pub mod overlay;
pub mod recurrence;
pub mod store;
pub mod timefmt;
pub mod timeline;
pub mod toggle;

pub use domain::{
    DailyModification, InstanceId, ItemType, Modification, OverrideStatus, RepeatFrequency,
    Routine, Task, UserStats,
};
pub use materialize::{materialize_day, DayPlan, RoutineInstance, TaskInstance};
pub use recurrence::RepeatRule;
pub use store::{MemoryStore, ScheduleStore};
pub use timeline::{build_timeline, compose_day, TimelineEvent, DEFAULT_DAY_START};
pub use toggle::{toggle_completion, EngineError, ToggleOutcome};
