use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use scoutplan_core::models::{
    activity::{Activity, ActivitySummary, Category},
    entry::{EntryKind, ProgramEntry},
    program::Program,
    user::User,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            id: row.id,
            username: row.username,
            is_admin: row.is_admin,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCategory {
    pub id: Uuid,
    pub name: String,
}

impl From<DbCategory> for Category {
    fn from(row: DbCategory) -> Self {
        Category {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbActivity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub materials: Option<String>,
    pub approximate_duration_minutes: i32,
    pub group_size: Option<String>,
    pub effort_level: String,
    pub location: String,
    pub age_group: Option<String>,
    pub is_approved: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbActivity {
    pub fn into_activity(self, category_ids: Vec<Uuid>) -> Result<Activity> {
        Ok(Activity {
            effort_level: self.effort_level.parse()?,
            location: self.location.parse()?,
            id: self.id,
            name: self.name,
            description: self.description,
            materials: self.materials,
            approximate_duration_minutes: self.approximate_duration_minutes,
            group_size: self.group_size,
            age_group: self.age_group,
            is_approved: self.is_approved,
            created_by: self.created_by,
            category_ids,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbActivitySummary {
    pub id: Uuid,
    pub name: String,
    pub approximate_duration_minutes: i32,
}

impl From<DbActivitySummary> for ActivitySummary {
    fn from(row: DbActivitySummary) -> Self {
        ActivitySummary {
            id: row.id,
            name: row.name,
            approximate_duration_minutes: row.approximate_duration_minutes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbActivityCategory {
    pub activity_id: Uuid,
    pub category_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbProgram {
    pub id: Uuid,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub start_time: String,
    pub user_id: Uuid,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbProgram {
    pub fn into_program(self) -> Result<Program> {
        Ok(Program {
            start_time: self.start_time.parse()?,
            id: self.id,
            name: self.name,
            date: self.date,
            user_id: self.user_id,
            is_public: self.is_public,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Flat storage form of a program entry. The nullable columns carry the
/// fields of whichever [`EntryKind`] variant `entry_type` names.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbProgramEntry {
    pub id: Uuid,
    pub program_id: Uuid,
    pub position: i32,
    pub start_time: String,
    pub end_time: String,
    pub entry_type: String,
    pub activity_id: Option<Uuid>,
    pub custom_title: Option<String>,
    pub custom_duration_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl DbProgramEntry {
    /// Rebuilds the tagged entry, rejecting rows whose columns disagree
    /// with their `entry_type`.
    pub fn into_entry(self) -> Result<ProgramEntry> {
        let kind = match (
            self.entry_type.as_str(),
            self.activity_id,
            self.custom_title,
            self.custom_duration_minutes,
        ) {
            ("activity", Some(activity_id), None, None) => EntryKind::Activity { activity_id },
            ("custom", None, Some(custom_title), custom_duration_minutes) => EntryKind::Custom {
                custom_title,
                custom_duration_minutes,
            },
            (entry_type, ..) => {
                return Err(eyre!(
                    "Program entry {} has inconsistent fields for entry_type '{}'",
                    self.id,
                    entry_type
                ));
            }
        };

        Ok(ProgramEntry {
            id: self.id,
            position: self.position,
            kind,
        })
    }
}
