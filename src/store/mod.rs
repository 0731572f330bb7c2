pub mod memory;

pub use memory::{default_snapshot_path, MemoryStore, Snapshot};

use crate::domain::{DailyModification, Routine, Task, UserStats};
use anyhow::Result;
use uuid::Uuid;

/// The external persistent store, seen as in-process calls.
///
/// The engine reads an immutable snapshot of the three per-user collections
/// and issues fire-and-forget writes; the store's own change-notification
/// mechanism (which drives recomputation) stays outside this crate. Writes
/// are idempotent at the row level, so a write that loses a race with a
/// newer toggle is simply superseded by the next notification.
pub trait ScheduleStore {
    fn tasks(&self) -> &[Task];
    fn routines(&self) -> &[Routine];
    fn modifications(&self) -> &[DailyModification];
    fn stats(&self) -> &UserStats;

    fn add_task(&mut self, task: Task) -> Result<()>;
    fn update_task(&mut self, task: Task) -> Result<()>;
    fn delete_task(&mut self, id: Uuid) -> Result<()>;

    fn add_routine(&mut self, routine: Routine) -> Result<()>;
    fn update_routine(&mut self, routine: Routine) -> Result<()>;
    fn delete_routine(&mut self, id: Uuid) -> Result<()>;

    fn insert_modification(&mut self, row: DailyModification) -> Result<()>;
    fn update_modification(&mut self, row: DailyModification) -> Result<()>;

    fn save_stats(&mut self, stats: UserStats) -> Result<()>;

    fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks().iter().find(|t| t.id == id)
    }

    fn routine(&self, id: Uuid) -> Option<&Routine> {
        self.routines().iter().find(|r| r.id == id)
    }
}
