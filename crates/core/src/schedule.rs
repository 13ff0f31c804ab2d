//! # Program schedule derivation
//!
//! Turns an ordered list of program entries into time slots. Three pieces:
//!
//! - [`resolve_duration`] decides how long a single entry runs.
//! - [`compute_schedule`] threads a clock through the list once, starting at
//!   the program's start time.
//! - [`reorder`] moves one entry and renumbers positions `0..n`. It does not
//!   touch times; run [`compute_schedule`] again afterwards.
//!
//! A missing duration source (deleted activity, custom block with no
//! duration) counts as zero minutes so that one dangling reference never
//! blocks the rest of the program from being shown.

use std::collections::HashMap;

use uuid::Uuid;

use crate::errors::PlanResult;
use crate::models::activity::{Activity, ActivitySummary};
use crate::models::entry::{EntryKind, ProgramEntry, ScheduledEntry};
use crate::time::ClockTime;

/// Source of activity durations for [`resolve_duration`].
pub trait DurationLookup {
    /// Stored duration of the activity, `None` when the id is unknown.
    fn duration_of(&self, activity_id: Uuid) -> Option<i32>;
}

impl DurationLookup for HashMap<Uuid, i32> {
    fn duration_of(&self, activity_id: Uuid) -> Option<i32> {
        self.get(&activity_id).copied()
    }
}

impl DurationLookup for HashMap<Uuid, Activity> {
    fn duration_of(&self, activity_id: Uuid) -> Option<i32> {
        self.get(&activity_id)
            .map(|activity| activity.approximate_duration_minutes)
    }
}

impl DurationLookup for HashMap<Uuid, ActivitySummary> {
    fn duration_of(&self, activity_id: Uuid) -> Option<i32> {
        self.get(&activity_id)
            .map(|summary| summary.approximate_duration_minutes)
    }
}

impl DurationLookup for [Activity] {
    fn duration_of(&self, activity_id: Uuid) -> Option<i32> {
        self.iter()
            .find(|activity| activity.id == activity_id)
            .map(|activity| activity.approximate_duration_minutes)
    }
}

impl DurationLookup for Vec<Activity> {
    fn duration_of(&self, activity_id: Uuid) -> Option<i32> {
        self.as_slice().duration_of(activity_id)
    }
}

impl<L: DurationLookup + ?Sized> DurationLookup for &L {
    fn duration_of(&self, activity_id: Uuid) -> Option<i32> {
        (**self).duration_of(activity_id)
    }
}

fn non_negative(minutes: Option<i32>) -> u32 {
    minutes.and_then(|m| u32::try_from(m).ok()).unwrap_or(0)
}

/// Length of an entry in minutes. Never fails: unknown activities, null
/// custom durations and negative values all resolve to `0`.
pub fn resolve_duration<L: DurationLookup + ?Sized>(kind: &EntryKind, lookup: &L) -> u32 {
    match kind {
        EntryKind::Custom {
            custom_duration_minutes,
            ..
        } => non_negative(*custom_duration_minutes),
        EntryKind::Activity { activity_id } => non_negative(lookup.duration_of(*activity_id)),
    }
}

/// Derives start and end times for every entry, in input order.
pub fn compute_schedule<L: DurationLookup + ?Sized>(
    entries: &[ProgramEntry],
    program_start: ClockTime,
    lookup: &L,
) -> Vec<ScheduledEntry> {
    let mut current = program_start;

    entries
        .iter()
        .map(|entry| {
            let start_time = current;
            let end_time = start_time.plus_minutes(resolve_duration(&entry.kind, lookup));
            current = end_time;

            ScheduledEntry {
                entry: entry.clone(),
                start_time,
                end_time,
            }
        })
        .collect()
}

/// Like [`compute_schedule`], but parses the program start time first.
/// A malformed start time is rejected rather than guessed at.
pub fn compute_schedule_from_str<L: DurationLookup + ?Sized>(
    entries: &[ProgramEntry],
    program_start: &str,
    lookup: &L,
) -> PlanResult<Vec<ScheduledEntry>> {
    let start = ClockTime::parse_start(program_start)?;
    Ok(compute_schedule(entries, start, lookup))
}

/// End of the last entry, or the start time for an empty program.
pub fn schedule_end(schedule: &[ScheduledEntry], program_start: ClockTime) -> ClockTime {
    schedule
        .last()
        .map(|scheduled| scheduled.end_time)
        .unwrap_or(program_start)
}

/// Assigns `position = index` across an already ordered list.
pub fn renumber(entries: &mut [ProgramEntry]) {
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.position = index as i32;
    }
}

/// Moves `moved_id` to `to_index` and renumbers every position.
///
/// Returns the input unchanged when `moved_id` is not in the list. The id is
/// authoritative: if `from_index` points elsewhere, the entry's real index is
/// used. A `to_index` past the end lands on the last slot.
pub fn reorder(
    entries: &[ProgramEntry],
    moved_id: Uuid,
    from_index: usize,
    to_index: usize,
) -> Vec<ProgramEntry> {
    let from = match entries.get(from_index) {
        Some(entry) if entry.id == moved_id => from_index,
        _ => match entries.iter().position(|entry| entry.id == moved_id) {
            Some(index) => index,
            None => {
                tracing::debug!(%moved_id, "reorder target not in program, leaving order unchanged");
                return entries.to_vec();
            }
        },
    };

    let mut reordered = entries.to_vec();
    let moved = reordered.remove(from);
    let to = to_index.min(reordered.len());
    reordered.insert(to, moved);
    renumber(&mut reordered);

    reordered
}
