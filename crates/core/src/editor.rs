//! Two-phase editing of a program's entries.
//!
//! A [`ProgramEditor`] holds the entries last known to be persisted (the
//! snapshot) and, optionally, a tentative replacement. [`ProgramEditor::commit`]
//! writes the tentative list through a [`ProgramEntryStore`] and either
//! promotes it to the snapshot or throws it away. The outcome is returned as
//! a value; nothing here panics or relies on unwinding to roll back.

use uuid::Uuid;

use crate::models::entry::{ProgramEntry, ScheduledEntry};
use crate::schedule::{self, DurationLookup};
use crate::store::ProgramEntryStore;
use crate::time::ClockTime;

#[derive(Debug)]
pub enum CommitOutcome {
    /// The tentative entries were written and are now the snapshot.
    Committed(Vec<ScheduledEntry>),
    /// Nothing was staged, so nothing was written.
    Unchanged(Vec<ScheduledEntry>),
    /// The write failed. The schedule is the snapshot's.
    RolledBack {
        error: eyre::Report,
        schedule: Vec<ScheduledEntry>,
    },
}

impl CommitOutcome {
    pub fn schedule(&self) -> &[ScheduledEntry] {
        match self {
            CommitOutcome::Committed(schedule) | CommitOutcome::Unchanged(schedule) => schedule,
            CommitOutcome::RolledBack { schedule, .. } => schedule,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed(_))
    }

    /// Converts into a plain result, keeping the store's error on rollback.
    pub fn into_result(self) -> eyre::Result<Vec<ScheduledEntry>> {
        match self {
            CommitOutcome::Committed(schedule) | CommitOutcome::Unchanged(schedule) => Ok(schedule),
            CommitOutcome::RolledBack { error, .. } => Err(error),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgramEditor {
    program_id: Uuid,
    start_time: ClockTime,
    snapshot: Vec<ProgramEntry>,
    tentative: Option<Vec<ProgramEntry>>,
}

impl ProgramEditor {
    pub fn new(program_id: Uuid, start_time: ClockTime, entries: Vec<ProgramEntry>) -> Self {
        Self {
            program_id,
            start_time,
            snapshot: entries,
            tentative: None,
        }
    }

    pub fn program_id(&self) -> Uuid {
        self.program_id
    }

    pub fn snapshot(&self) -> &[ProgramEntry] {
        &self.snapshot
    }

    pub fn has_pending(&self) -> bool {
        self.tentative.is_some()
    }

    /// Entries as the caller should currently display them.
    pub fn view(&self) -> &[ProgramEntry] {
        self.tentative.as_deref().unwrap_or(&self.snapshot)
    }

    /// Stages a full replacement list; positions follow list order.
    pub fn stage(&mut self, mut entries: Vec<ProgramEntry>) {
        schedule::renumber(&mut entries);
        self.tentative = Some(entries);
    }

    /// Stages a drag-reorder of the current view. Returns `false` and stages
    /// nothing when `moved_id` is not part of the program.
    pub fn stage_reorder(&mut self, moved_id: Uuid, from_index: usize, to_index: usize) -> bool {
        let current = self.view();
        if !current.iter().any(|entry| entry.id == moved_id) {
            return false;
        }
        let reordered = schedule::reorder(current, moved_id, from_index, to_index);
        self.tentative = Some(reordered);
        true
    }

    /// Drops any staged change.
    pub fn discard(&mut self) {
        self.tentative = None;
    }

    pub fn schedule<L: DurationLookup + ?Sized>(&self, lookup: &L) -> Vec<ScheduledEntry> {
        schedule::compute_schedule(self.view(), self.start_time, lookup)
    }

    pub async fn commit<S, L>(&mut self, store: &S, lookup: &L) -> CommitOutcome
    where
        S: ProgramEntryStore + ?Sized,
        L: DurationLookup + ?Sized,
    {
        let Some(tentative) = self.tentative.take() else {
            return CommitOutcome::Unchanged(schedule::compute_schedule(
                &self.snapshot,
                self.start_time,
                lookup,
            ));
        };

        let scheduled = schedule::compute_schedule(&tentative, self.start_time, lookup);
        match store.replace_entries(self.program_id, &scheduled).await {
            Ok(()) => {
                tracing::debug!(
                    program_id = %self.program_id,
                    entries = scheduled.len(),
                    "committed program entries"
                );
                self.snapshot = tentative;
                CommitOutcome::Committed(scheduled)
            }
            Err(error) => {
                tracing::warn!(
                    program_id = %self.program_id,
                    "failed to persist program entries, rolling back: {}",
                    error
                );
                CommitOutcome::RolledBack {
                    error,
                    schedule: schedule::compute_schedule(&self.snapshot, self.start_time, lookup),
                }
            }
        }
    }
}
