//! Queries and writes over the sparse per-day modification table.
//!
//! A day's overrides are a handful of rows layered on top of template
//! scheduling: the canonical row per `(date, item_id, item_type)` converges
//! through upsert, while `added` copies always insert fresh rows keyed by
//! their own instance id.

use crate::domain::{DailyModification, ItemType, Modification, OverrideStatus};
use crate::store::ScheduleStore;
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::HashSet;
use uuid::Uuid;

/// All overlay rows for one calendar day
pub fn rows_for_day(rows: &[DailyModification], date: NaiveDate) -> Vec<&DailyModification> {
    rows.iter().filter(|row| row.date == date).collect()
}

/// Keys suppressed by skip rows.
///
/// A skip row targeting an added copy carries that copy's instance id;
/// a skip of the scheduled original carries only the template id. Keeping
/// both in one set lets "skip this specific copy" and "skip the original"
/// coexist without touching each other.
pub fn skipped_keys(day_rows: &[&DailyModification]) -> HashSet<Uuid> {
    day_rows
        .iter()
        .filter(|row| row.modification.status == OverrideStatus::Skipped)
        .map(|row| match row.instance_id {
            Some(instance_id) => instance_id,
            None => row.item_id,
        })
        .collect()
}

/// Rows that add an extra copy of a template for the day
pub fn added_rows<'a>(
    day_rows: &[&'a DailyModification],
    item_type: ItemType,
) -> Vec<&'a DailyModification> {
    day_rows
        .iter()
        .filter(|row| row.modification.status == OverrideStatus::Added && row.item_type == item_type)
        .copied()
        .collect()
}

/// The canonical (non-copy) row for an item on a day, if any
pub fn canonical_row<'a>(
    day_rows: &[&'a DailyModification],
    item_id: Uuid,
    item_type: ItemType,
) -> Option<&'a DailyModification> {
    day_rows
        .iter()
        .find(|row| row.is_canonical() && row.item_id == item_id && row.item_type == item_type)
        .copied()
}

/// Upsert the canonical modification for `(date, item_id, item_type)`.
///
/// An existing canonical row absorbs the payload via field merge; otherwise
/// a fresh row is inserted. Repeated skips or reschedules of the same
/// scheduled item therefore converge to a single row. Added copies never go
/// through this path.
pub fn upsert(
    store: &mut dyn ScheduleStore,
    date: NaiveDate,
    item_id: Uuid,
    item_type: ItemType,
    modification: Modification,
) -> Result<DailyModification> {
    let existing = store
        .modifications()
        .iter()
        .find(|row| {
            row.is_canonical()
                && row.date == date
                && row.item_id == item_id
                && row.item_type == item_type
        })
        .cloned();

    match existing {
        Some(mut updated) => {
            updated.modification.merge(&modification);
            store.update_modification(updated.clone())?;
            Ok(updated)
        }
        None => {
            let row = DailyModification::new(date, item_id, item_type, modification);
            store.insert_modification(row.clone())?;
            Ok(row)
        }
    }
}

/// Insert an `added` copy of a template for the day.
///
/// Always inserts a fresh row with a newly generated instance id; two
/// additions of the same template on one day yield two independent copies.
pub fn add_item(
    store: &mut dyn ScheduleStore,
    date: NaiveDate,
    item_id: Uuid,
    item_type: ItemType,
    mut modification: Modification,
) -> Result<DailyModification> {
    modification.status = OverrideStatus::Added;
    let mut row = DailyModification::new(date, item_id, item_type, modification);
    row.instance_id = Some(Uuid::new_v4());
    store.insert_modification(row.clone())?;
    Ok(row)
}
