//! Turns templates plus one day's overlay rows into concrete, date-bound
//! instances with resolved times and completion state.
//!
//! Pure over its inputs: the same templates, rows, and date always produce
//! the same plan. Dangling references (an overlay row whose template was
//! deleted) are dropped with a warning; the rest of the day still renders.

use crate::domain::{
    DailyModification, InstanceId, ItemType, OverrideStatus, Routine, Task,
};
use crate::overlay;
use crate::timefmt;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

/// A date-bound task occurrence with resolved time and completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInstance {
    pub id: InstanceId,
    pub template_id: Uuid,
    pub name: String,
    pub pillar: Option<String>,
    /// Minutes since midnight; items with no slot resolve to 0
    pub start_minutes: u32,
    pub duration_minutes: u32,
    pub completed: bool,
    pub is_habit: bool,
    /// Whether the template carried a time slot at all (drives member sort)
    has_slot: bool,
}

impl TaskInstance {
    pub fn end_minutes(&self) -> u32 {
        self.start_minutes + self.duration_minutes
    }

    /// Unique key for list renderers
    pub fn render_key(&self) -> String {
        match self.id {
            InstanceId::Scheduled { template_id } => {
                format!("{}-{}", template_id, self.start_minutes)
            }
            InstanceId::Added { instance_id } => instance_id.to_string(),
            InstanceId::Unscheduled { template_id, date } => {
                format!("unscheduled-{}-{}", template_id, date)
            }
        }
    }
}

/// A date-bound routine occurrence with its member items expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineInstance {
    pub id: InstanceId,
    pub template_id: Uuid,
    pub name: String,
    pub start_minutes: u32,
    pub end_minutes: u32,
    /// Members in display order: timed members ascending, timeless last
    pub members: Vec<TaskInstance>,
}

impl RoutineInstance {
    /// Routine completion is derived: every member done on the day
    pub fn is_fully_completed(&self) -> bool {
        !self.members.is_empty() && self.members.iter().all(|m| m.completed)
    }
}

/// Everything materialized for one day, before timeline assembly
#[derive(Debug, Clone)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub routines: Vec<RoutineInstance>,
    /// Standalone timeline tasks, sorted ascending by start
    pub tasks: Vec<TaskInstance>,
    /// Recurring habits with no slot and no routine, outside the timeline
    pub unscheduled: Vec<TaskInstance>,
}

impl DayPlan {
    pub fn is_empty(&self) -> bool {
        self.routines.is_empty() && self.tasks.is_empty()
    }
}

/// Materialize all instances for `date` from templates and overlay rows
pub fn materialize_day(
    tasks: &[Task],
    routines: &[Routine],
    rows: &[DailyModification],
    date: NaiveDate,
) -> DayPlan {
    let day_rows = overlay::rows_for_day(rows, date);
    let skipped = overlay::skipped_keys(&day_rows);

    // Member ids claimed by routines running today (before routine-level
    // skips, so a skipped routine hides its members rather than spilling
    // them into the standalone list)
    let added_routine_rows = overlay::added_rows(&day_rows, ItemType::Routine);
    let claimed: HashSet<Uuid> = routines
        .iter()
        .filter(|r| {
            r.repeat.occurs_on(date)
                || added_routine_rows.iter().any(|row| row.item_id == r.id)
        })
        .flat_map(|r| r.member_ids())
        .collect();

    // Ids belonging to any routine at all, for the unscheduled bucket
    let in_any_routine: HashSet<Uuid> = routines.iter().flat_map(|r| r.member_ids()).collect();

    let mut routine_instances = Vec::new();
    for routine in routines.iter().filter(|r| r.repeat.occurs_on(date)) {
        if skipped.contains(&routine.id) {
            continue;
        }
        let resched = overlay::canonical_row(&day_rows, routine.id, ItemType::Routine)
            .filter(|row| row.modification.status == OverrideStatus::Rescheduled);
        let start_override = resched.and_then(|row| row.modification.start_time.as_deref());
        let end_override = resched.and_then(|row| row.modification.end_time.as_deref());
        routine_instances.push(build_routine_instance(
            routine,
            InstanceId::Scheduled { template_id: routine.id },
            start_override,
            end_override,
            tasks,
            &skipped,
            date,
        ));
    }

    for row in &added_routine_rows {
        let key = row.effective_instance_id();
        if skipped.contains(&key) {
            continue;
        }
        let Some(routine) = routines.iter().find(|r| r.id == row.item_id) else {
            warn!(routine_id = %row.item_id, %date, "dropping added routine row with missing template");
            continue;
        };
        routine_instances.push(build_routine_instance(
            routine,
            InstanceId::Added { instance_id: key },
            row.modification.start_time.as_deref(),
            row.modification.end_time.as_deref(),
            tasks,
            &skipped,
            date,
        ));
    }

    let mut task_instances = Vec::new();
    let mut unscheduled = Vec::new();
    for task in tasks {
        let scheduled_today =
            task.repeat.occurs_on(date) || task.reminder_date == Some(date);
        if !scheduled_today {
            continue;
        }

        // Recurring habit with no slot and no routine: the always-visible
        // bucket outside the timeline
        if task.repeat.is_recurring()
            && task.reminder_time.is_none()
            && !in_any_routine.contains(&task.id)
        {
            unscheduled.push(TaskInstance {
                id: InstanceId::Unscheduled { template_id: task.id, date },
                template_id: task.id,
                name: task.name.clone(),
                pillar: task.pillar.clone(),
                start_minutes: 0,
                duration_minutes: task.duration_minutes(),
                completed: task.is_completed_on(date),
                is_habit: task.is_habit(),
                has_slot: false,
            });
            continue;
        }

        if claimed.contains(&task.id) || skipped.contains(&task.id) {
            continue;
        }

        let resched = overlay::canonical_row(&day_rows, task.id, ItemType::Task)
            .filter(|row| row.modification.status == OverrideStatus::Rescheduled);
        task_instances.push(scheduled_task_instance(task, resched, date));
    }

    for row in overlay::added_rows(&day_rows, ItemType::Task) {
        let key = row.effective_instance_id();
        if skipped.contains(&key) {
            continue;
        }
        let Some(template) = tasks.iter().find(|t| t.id == row.item_id) else {
            warn!(task_id = %row.item_id, %date, "dropping added task row with missing template");
            continue;
        };
        task_instances.push(added_task_instance(template, row));
    }

    task_instances.sort_by_key(|t| t.start_minutes);

    DayPlan {
        date,
        routines: routine_instances,
        tasks: task_instances,
        unscheduled,
    }
}

/// Materialize one routine occurrence, expanding and ordering its members
fn build_routine_instance(
    routine: &Routine,
    id: InstanceId,
    start_override: Option<&str>,
    end_override: Option<&str>,
    tasks: &[Task],
    skipped: &HashSet<Uuid>,
    date: NaiveDate,
) -> RoutineInstance {
    let mut members = Vec::new();
    for member_id in routine.member_ids() {
        if skipped.contains(&member_id) {
            continue;
        }
        let Some(task) = tasks.iter().find(|t| t.id == member_id) else {
            warn!(member_id = %member_id, routine = %routine.name, "dropping routine member with missing template");
            continue;
        };
        members.push(TaskInstance {
            id: InstanceId::Scheduled { template_id: task.id },
            template_id: task.id,
            name: task.name.clone(),
            pillar: task.pillar.clone(),
            start_minutes: task
                .reminder_time
                .as_deref()
                .map(timefmt::parse_time)
                .unwrap_or(0),
            duration_minutes: task.duration_minutes(),
            completed: task.is_completed_on(date),
            is_habit: task.is_habit(),
            has_slot: task.reminder_time.is_some(),
        });
    }
    // Timed members ascending, timeless last; stable sort keeps routine
    // order on ties
    members.sort_by_key(|m| (!m.has_slot, m.start_minutes));

    let start_minutes = timefmt::parse_time(start_override.unwrap_or(&routine.start_time));
    let end_minutes = end_override
        .or(routine.end_time.as_deref())
        .map(timefmt::parse_time)
        .unwrap_or_else(|| {
            start_minutes + members.iter().map(|m| m.duration_minutes).sum::<u32>()
        });

    RoutineInstance {
        id,
        template_id: routine.id,
        name: routine.name.clone(),
        start_minutes,
        end_minutes,
        members,
    }
}

fn scheduled_task_instance(
    task: &Task,
    resched: Option<&DailyModification>,
    date: NaiveDate,
) -> TaskInstance {
    let start_minutes = resched
        .and_then(|row| row.modification.start_time.as_deref())
        .or(task.reminder_time.as_deref())
        .map(timefmt::parse_time)
        .unwrap_or(0);
    let duration_minutes = resched
        .and_then(|row| row.modification.end_time.as_deref())
        .map(timefmt::parse_time)
        .map(|end| end.saturating_sub(start_minutes))
        .filter(|d| *d > 0)
        .unwrap_or_else(|| task.duration_minutes());

    TaskInstance {
        id: InstanceId::Scheduled { template_id: task.id },
        template_id: task.id,
        name: task.name.clone(),
        pillar: task.pillar.clone(),
        start_minutes,
        duration_minutes,
        completed: task.is_completed_on(date),
        is_habit: task.is_habit(),
        has_slot: task.reminder_time.is_some(),
    }
}

/// An added copy is a synthetic one-off: completion lives on its overlay
/// row, never on the template
fn added_task_instance(template: &Task, row: &DailyModification) -> TaskInstance {
    let start_minutes = row
        .modification
        .start_time
        .as_deref()
        .or(template.reminder_time.as_deref())
        .map(timefmt::parse_time)
        .unwrap_or(0);

    TaskInstance {
        id: InstanceId::Added { instance_id: row.effective_instance_id() },
        template_id: template.id,
        name: template.name.clone(),
        pillar: template.pillar.clone(),
        start_minutes,
        duration_minutes: template.duration_minutes(),
        completed: row.modification.completed.unwrap_or(false),
        is_habit: false,
        has_slot: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Modification;
    use crate::recurrence::RepeatRule;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn timed_task(name: &str, time: &str, duration: u32) -> Task {
        let mut task = Task::new(name, RepeatRule::daily());
        task.reminder_time = Some(time.to_string());
        task.duration_minutes = Some(duration);
        task
    }

    #[test]
    fn test_daily_task_with_slot_enters_timeline() {
        let task = timed_task("Stretch", "08:00", 15);
        let d = date(2025, 1, 10);

        let plan = materialize_day(&[task.clone()], &[], &[], d);

        assert_eq!(plan.tasks.len(), 1);
        assert!(plan.unscheduled.is_empty());
        let instance = &plan.tasks[0];
        assert_eq!(instance.start_minutes, 480);
        assert_eq!(instance.end_minutes(), 495);
        assert_eq!(instance.id, InstanceId::Scheduled { template_id: task.id });
    }

    #[test]
    fn test_timeless_habit_lands_in_unscheduled_bucket() {
        let habit = Task::new("Drink water", RepeatRule::daily());
        let d = date(2025, 1, 10);

        let plan = materialize_day(&[habit.clone()], &[], &[], d);

        assert!(plan.tasks.is_empty());
        assert_eq!(plan.unscheduled.len(), 1);
        assert_eq!(
            plan.unscheduled[0].id,
            InstanceId::Unscheduled { template_id: habit.id, date: d }
        );
    }

    #[test]
    fn test_once_task_scheduled_only_on_reminder_date() {
        let mut task = Task::new("File taxes", RepeatRule::once());
        task.reminder_date = Some(date(2025, 4, 15));
        task.reminder_time = Some("10:00".to_string());

        let on_date = materialize_day(&[task.clone()], &[], &[], date(2025, 4, 15));
        assert_eq!(on_date.tasks.len(), 1);

        let off_date = materialize_day(&[task], &[], &[], date(2025, 4, 16));
        assert!(off_date.tasks.is_empty());
        assert!(off_date.unscheduled.is_empty());
    }

    #[test]
    fn test_skip_suppresses_for_that_day_only() {
        let task = timed_task("Run", "07:00", 60);
        let d = date(2025, 1, 10);
        let skip = DailyModification::new(d, task.id, ItemType::Task, Modification::skipped());

        let skipped_day = materialize_day(&[task.clone()], &[], &[skip.clone()], d);
        assert!(skipped_day.tasks.is_empty());

        let next_day = materialize_day(&[task], &[], &[skip], date(2025, 1, 11));
        assert_eq!(next_day.tasks.len(), 1);
    }

    #[test]
    fn test_added_row_materializes_as_overlay_backed_one_off() {
        let habit = timed_task("Stretch", "08:00", 15);
        let d = date(2025, 1, 10);

        let mut row = DailyModification::new(
            d,
            habit.id,
            ItemType::Task,
            Modification::added(Some("18:00".to_string())),
        );
        row.instance_id = Some(Uuid::new_v4());
        row.modification.completed = Some(true);

        let plan = materialize_day(&[habit.clone()], &[], &[row.clone()], d);

        assert_eq!(plan.tasks.len(), 2);
        let added = plan
            .tasks
            .iter()
            .find(|t| t.id.is_added())
            .expect("added copy present");
        assert_eq!(added.start_minutes, 1080);
        assert!(added.completed);
        assert!(!added.is_habit);
        assert_eq!(
            added.id,
            InstanceId::Added { instance_id: row.instance_id.unwrap() }
        );
        // The scheduled original is untouched
        let original = plan.tasks.iter().find(|t| !t.id.is_added()).unwrap();
        assert!(!original.completed);
    }

    #[test]
    fn test_added_row_with_missing_template_is_dropped() {
        let d = date(2025, 1, 10);
        let mut row = DailyModification::new(
            d,
            Uuid::new_v4(),
            ItemType::Task,
            Modification::added(Some("09:00".to_string())),
        );
        row.instance_id = Some(Uuid::new_v4());

        let plan = materialize_day(&[], &[], &[row], d);
        assert!(plan.tasks.is_empty());
    }

    #[test]
    fn test_routine_end_defaults_to_member_duration_sum() {
        let habit1 = timed_task("Meditate", "09:00", 30);
        let habit2 = timed_task("Journal", "09:30", 30);
        let mut routine = Routine::new("Morning", "09:00", RepeatRule::daily());
        routine.habit_ids = vec![habit1.id, habit2.id];

        let plan = materialize_day(
            &[habit1, habit2],
            &[routine],
            &[],
            date(2025, 1, 10),
        );

        assert_eq!(plan.routines.len(), 1);
        let instance = &plan.routines[0];
        assert_eq!(instance.start_minutes, 540);
        assert_eq!(instance.end_minutes, 600); // 09:00 + 30 + 30
        assert_eq!(instance.members.len(), 2);
    }

    #[test]
    fn test_routine_members_sort_timed_first() {
        let timeless = Task::new("Vitamins", RepeatRule::daily());
        let late = timed_task("Shower", "07:30", 15);
        let early = timed_task("Stretch", "07:00", 15);

        let mut routine = Routine::new("Morning", "07:00", RepeatRule::daily());
        routine.habit_ids = vec![timeless.id, late.id, early.id];

        let plan = materialize_day(
            &[timeless.clone(), late.clone(), early.clone()],
            &[routine],
            &[],
            date(2025, 1, 10),
        );

        let names: Vec<&str> = plan.routines[0]
            .members
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["Stretch", "Shower", "Vitamins"]);
    }

    #[test]
    fn test_routine_claims_members_from_standalone_list() {
        let habit = timed_task("Meditate", "09:00", 30);
        let mut routine = Routine::new("Morning", "09:00", RepeatRule::daily());
        routine.habit_ids = vec![habit.id];

        let plan = materialize_day(&[habit], &[routine], &[], date(2025, 1, 10));

        assert!(plan.tasks.is_empty());
        assert_eq!(plan.routines[0].members.len(), 1);
    }

    #[test]
    fn test_skipped_routine_hides_its_members_entirely() {
        let habit = timed_task("Meditate", "09:00", 30);
        let mut routine = Routine::new("Morning", "09:00", RepeatRule::daily());
        routine.habit_ids = vec![habit.id];
        let d = date(2025, 1, 10);
        let skip = DailyModification::new(d, routine.id, ItemType::Routine, Modification::skipped());

        let plan = materialize_day(&[habit], &[routine], &[skip], d);

        assert!(plan.routines.is_empty());
        assert!(plan.tasks.is_empty());
    }

    #[test]
    fn test_member_skip_removes_only_that_member() {
        let keep = timed_task("Meditate", "09:00", 30);
        let drop = timed_task("Journal", "09:30", 30);
        let mut routine = Routine::new("Morning", "09:00", RepeatRule::daily());
        routine.habit_ids = vec![keep.id, drop.id];
        let d = date(2025, 1, 10);
        let skip = DailyModification::new(d, drop.id, ItemType::Task, Modification::skipped());

        let plan = materialize_day(&[keep, drop], &[routine], &[skip], d);

        assert_eq!(plan.routines[0].members.len(), 1);
        assert_eq!(plan.routines[0].members[0].name, "Meditate");
    }

    #[test]
    fn test_two_added_routine_copies_are_independent() {
        let habit = timed_task("Meditate", "09:00", 30);
        let mut routine = Routine::new("Focus block", "09:00", RepeatRule::once());
        routine.habit_ids = vec![habit.id];
        let d = date(2025, 1, 10);

        let mut copy1 = DailyModification::new(
            d,
            routine.id,
            ItemType::Routine,
            Modification::added(Some("09:00".to_string())),
        );
        copy1.instance_id = Some(Uuid::new_v4());
        let mut copy2 = DailyModification::new(
            d,
            routine.id,
            ItemType::Routine,
            Modification::added(Some("15:00".to_string())),
        );
        copy2.instance_id = Some(Uuid::new_v4());

        // Skip the second copy by its instance id; the first survives
        let mut skip = DailyModification::new(
            d,
            routine.id,
            ItemType::Routine,
            Modification::skipped(),
        );
        skip.instance_id = copy2.instance_id;

        let both = materialize_day(
            &[habit.clone()],
            &[routine.clone()],
            &[copy1.clone(), copy2.clone()],
            d,
        );
        assert_eq!(both.routines.len(), 2);
        assert_eq!(both.routines[0].start_minutes, 540);
        assert_eq!(both.routines[1].start_minutes, 900);

        let one = materialize_day(&[habit], &[routine], &[copy1, copy2, skip], d);
        assert_eq!(one.routines.len(), 1);
        assert_eq!(one.routines[0].start_minutes, 540);
    }

    #[test]
    fn test_reschedule_moves_whole_routine_block() {
        let habit = timed_task("Meditate", "09:00", 30);
        let mut routine = Routine::new("Morning", "09:00", RepeatRule::daily());
        routine.habit_ids = vec![habit.id];
        let d = date(2025, 1, 10);

        let resched = DailyModification::new(
            d,
            routine.id,
            ItemType::Routine,
            Modification::rescheduled("14:00", None),
        );

        let plan = materialize_day(&[habit.clone()], &[routine.clone()], &[resched], d);

        assert_eq!(plan.routines.len(), 1);
        let block = &plan.routines[0];
        // Start moves and the derived end follows it
        assert_eq!(block.start_minutes, 840);
        assert_eq!(block.end_minutes, 870);
        assert_eq!(block.members.len(), 1);

        // An explicit end override moves with it too
        let resched_with_end = DailyModification::new(
            d,
            routine.id,
            ItemType::Routine,
            Modification::rescheduled("14:00", Some("15:30".to_string())),
        );
        let plan = materialize_day(&[habit], &[routine], &[resched_with_end], d);
        assert_eq!(plan.routines[0].start_minutes, 840);
        assert_eq!(plan.routines[0].end_minutes, 930);
    }

    #[test]
    fn test_reschedule_moves_scheduled_task() {
        let task = timed_task("Run", "07:00", 60);
        let d = date(2025, 1, 10);
        let resched = DailyModification::new(
            d,
            task.id,
            ItemType::Task,
            Modification::rescheduled("12:00", Some("12:45".to_string())),
        );

        let plan = materialize_day(&[task], &[], &[resched], d);

        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.tasks[0].start_minutes, 720);
        assert_eq!(plan.tasks[0].duration_minutes, 45);
    }

    #[test]
    fn test_tasks_sorted_by_start() {
        let late = timed_task("Dinner", "19:00", 45);
        let early = timed_task("Run", "07:00", 60);

        let plan = materialize_day(&[late, early], &[], &[], date(2025, 1, 10));

        assert_eq!(plan.tasks[0].name, "Run");
        assert_eq!(plan.tasks[1].name, "Dinner");
    }
}
