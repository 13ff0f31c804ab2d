use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PlanError;
use crate::models::entry::ScheduledEntryResponse;
use crate::time::ClockTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub start_time: ClockTime,
    pub user_id: Uuid,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Program {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn is_visible_to(&self, user_id: Option<Uuid>) -> bool {
        self.is_public || user_id.is_some_and(|id| self.is_owned_by(id))
    }
}

/// Body for creating a program and for its full-field update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramRequest {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub start_time: String,
    #[serde(default)]
    pub is_public: bool,
}

impl ProgramRequest {
    /// Validates the body and returns the parsed start time.
    pub fn validate(&self) -> Result<ClockTime, PlanError> {
        if self.name.trim().is_empty() {
            return Err(PlanError::Validation("Program name must not be empty".to_string()));
        }
        ClockTime::parse_start(&self.start_time)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramScope {
    #[default]
    Mine,
    Public,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramListQuery {
    #[serde(default)]
    pub scope: ProgramScope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramDetailResponse {
    #[serde(flatten)]
    pub program: Program,
    pub end_time: ClockTime,
    pub entries: Vec<ScheduledEntryResponse>,
}
