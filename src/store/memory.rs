use super::ScheduleStore;
use crate::domain::{DailyModification, Routine, Task, UserStats};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Serialized form of a full store: the three collections plus stats
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub routines: Vec<Routine>,
    #[serde(default)]
    pub modifications: Vec<DailyModification>,
    #[serde(default)]
    pub stats: UserStats,
}

/// In-memory reference store.
///
/// Serves as the test double for the external persistent store and as a
/// simple JSON-snapshot store for standalone use. It has no subscription
/// mechanism; callers recompose the day after their own writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tasks: Vec<Task>,
    routines: Vec<Routine>,
    modifications: Vec<DailyModification>,
    stats: UserStats,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            tasks: snapshot.tasks,
            routines: snapshot.routines,
            modifications: snapshot.modifications,
            stats: snapshot.stats,
        }
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            routines: self.routines.clone(),
            modifications: self.modifications.clone(),
            stats: self.stats.clone(),
        }
    }

    /// Load a store from a JSON snapshot file; a missing file yields an
    /// empty store
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Write the store to a JSON snapshot file atomically (temp file +
    /// rename in the target directory)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = path.parent().context("Snapshot path has no parent directory")?;
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let content = serde_json::to_string_pretty(&self.to_snapshot())
            .context("Failed to serialize snapshot")?;

        let mut temp_file =
            NamedTempFile::new_in(dir).context("Failed to create temporary file")?;
        temp_file
            .write_all(content.as_bytes())
            .context("Failed to write to temporary file")?;
        temp_file
            .as_file()
            .sync_all()
            .context("Failed to sync temporary file")?;
        temp_file
            .persist(path)
            .with_context(|| format!("Failed to persist snapshot: {}", path.display()))?;

        Ok(())
    }
}

/// Default snapshot location: `~/.dayline/schedule.json`
pub fn default_snapshot_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".dayline").join("schedule.json"))
}

impl ScheduleStore for MemoryStore {
    fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    fn routines(&self) -> &[Routine] {
        &self.routines
    }

    fn modifications(&self) -> &[DailyModification] {
        &self.modifications
    }

    fn stats(&self) -> &UserStats {
        &self.stats
    }

    fn add_task(&mut self, task: Task) -> Result<()> {
        self.tasks.push(task);
        Ok(())
    }

    fn update_task(&mut self, task: Task) -> Result<()> {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => {
                *existing = task;
                Ok(())
            }
            None => bail!("No task with id {}", task.id),
        }
    }

    fn delete_task(&mut self, id: Uuid) -> Result<()> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            bail!("No task with id {}", id);
        }
        Ok(())
    }

    fn add_routine(&mut self, routine: Routine) -> Result<()> {
        self.routines.push(routine);
        Ok(())
    }

    fn update_routine(&mut self, routine: Routine) -> Result<()> {
        match self.routines.iter_mut().find(|r| r.id == routine.id) {
            Some(existing) => {
                *existing = routine;
                Ok(())
            }
            None => bail!("No routine with id {}", routine.id),
        }
    }

    fn delete_routine(&mut self, id: Uuid) -> Result<()> {
        let before = self.routines.len();
        self.routines.retain(|r| r.id != id);
        if self.routines.len() == before {
            bail!("No routine with id {}", id);
        }
        Ok(())
    }

    fn insert_modification(&mut self, row: DailyModification) -> Result<()> {
        self.modifications.push(row);
        Ok(())
    }

    fn update_modification(&mut self, row: DailyModification) -> Result<()> {
        match self.modifications.iter_mut().find(|m| m.id == row.id) {
            Some(existing) => {
                *existing = row;
                Ok(())
            }
            None => bail!("No modification row with id {}", row.id),
        }
    }

    fn save_stats(&mut self, stats: UserStats) -> Result<()> {
        self.stats = stats;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::RepeatRule;

    #[test]
    fn test_update_task_replaces_by_id() {
        let mut store = MemoryStore::new();
        let mut task = Task::new("Read", RepeatRule::daily());
        store.add_task(task.clone()).unwrap();

        task.name = "Read more".to_string();
        store.update_task(task.clone()).unwrap();

        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].name, "Read more");
    }

    #[test]
    fn test_update_missing_task_fails() {
        let mut store = MemoryStore::new();
        let task = Task::new("Ghost", RepeatRule::daily());
        assert!(store.update_task(task).is_err());
    }

    #[test]
    fn test_snapshot_round_trip_on_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("schedule.json");

        let mut store = MemoryStore::new();
        store.add_task(Task::new("Read", RepeatRule::daily())).unwrap();
        store
            .add_routine(Routine::new("Morning", "07:00", RepeatRule::daily()))
            .unwrap();
        let mut stats = store.stats().clone();
        stats.apply_delta(30);
        store.save_stats(stats).unwrap();
        store.save(&path).unwrap();

        let loaded = MemoryStore::load(&path).unwrap();
        assert_eq!(loaded.tasks().len(), 1);
        assert_eq!(loaded.tasks()[0].name, "Read");
        assert_eq!(loaded.routines().len(), 1);
        assert_eq!(loaded.stats().total_points, 30);
    }

    #[test]
    fn test_load_missing_file_is_empty_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load(temp_dir.path().join("nope.json")).unwrap();
        assert!(store.tasks().is_empty());
        assert!(store.routines().is_empty());
    }
}
