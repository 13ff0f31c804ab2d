use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PlanError;
use crate::time::ClockTime;

/// What a program entry schedules: a catalogued activity or a free-form
/// block. The kind is fixed once an entry exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entry_type", rename_all = "lowercase")]
pub enum EntryKind {
    Activity {
        activity_id: Uuid,
    },
    Custom {
        custom_title: String,
        #[serde(default)]
        custom_duration_minutes: Option<i32>,
    },
}

impl EntryKind {
    pub fn entry_type(&self) -> &'static str {
        match self {
            EntryKind::Activity { .. } => "activity",
            EntryKind::Custom { .. } => "custom",
        }
    }

    pub fn activity_id(&self) -> Option<Uuid> {
        match self {
            EntryKind::Activity { activity_id } => Some(*activity_id),
            EntryKind::Custom { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramEntry {
    pub id: Uuid,
    pub position: i32,
    #[serde(flatten)]
    pub kind: EntryKind,
}

/// An entry with its derived time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEntry {
    #[serde(flatten)]
    pub entry: ProgramEntry,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl ScheduledEntry {
    pub fn duration_minutes(&self) -> u32 {
        self.end_time.minutes().saturating_sub(self.start_time.minutes())
    }
}

/// One element of a full replacement list. `position`, `start_time` and
/// `end_time` may be echoed back by clients but are re-derived from the
/// list order on write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryInput {
    pub id: Option<Uuid>,
    #[serde(flatten)]
    pub kind: EntryKind,
    pub position: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl EntryInput {
    pub fn validate(&self) -> Result<(), PlanError> {
        if let EntryKind::Custom {
            custom_title,
            custom_duration_minutes,
        } = &self.kind
        {
            if custom_title.trim().is_empty() {
                return Err(PlanError::Validation(
                    "custom_title must not be empty".to_string(),
                ));
            }
            if custom_duration_minutes.is_some_and(|d| d < 0) {
                return Err(PlanError::Validation(
                    "custom_duration_minutes must not be negative".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Turns the input into an entry, minting an id when the client sent none.
    pub fn into_entry(self, position: i32) -> ProgramEntry {
        ProgramEntry {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            position,
            kind: self.kind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceEntriesRequest {
    pub entries: Vec<EntryInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub moved_id: Uuid,
    pub from_index: usize,
    pub to_index: usize,
}

/// Entry as returned to clients, with display fields resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEntryResponse {
    #[serde(flatten)]
    pub scheduled: ScheduledEntry,
    pub duration_minutes: u32,
    pub activity_name: Option<String>,
}
