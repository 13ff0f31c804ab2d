use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PlanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffortLevel {
    Low,
    Medium,
    High,
}

impl EffortLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            EffortLevel::Low => "low",
            EffortLevel::Medium => "medium",
            EffortLevel::High => "high",
        }
    }
}

impl fmt::Display for EffortLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffortLevel {
    type Err = PlanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(EffortLevel::Low),
            "medium" => Ok(EffortLevel::Medium),
            "high" => Ok(EffortLevel::High),
            other => Err(PlanError::Validation(format!("Unknown effort level '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLocation {
    Indoor,
    Outdoor,
    Both,
}

impl ActivityLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLocation::Indoor => "indoor",
            ActivityLocation::Outdoor => "outdoor",
            ActivityLocation::Both => "both",
        }
    }
}

impl fmt::Display for ActivityLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityLocation {
    type Err = PlanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "indoor" => Ok(ActivityLocation::Indoor),
            "outdoor" => Ok(ActivityLocation::Outdoor),
            "both" => Ok(ActivityLocation::Both),
            other => Err(PlanError::Validation(format!("Unknown location '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub materials: Option<String>,
    pub approximate_duration_minutes: i32,
    pub group_size: Option<String>,
    pub effort_level: EffortLevel,
    pub location: ActivityLocation,
    pub age_group: Option<String>,
    pub is_approved: bool,
    pub created_by: Option<Uuid>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for both creating and (full-field) updating an activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub materials: Option<String>,
    pub approximate_duration_minutes: i32,
    pub group_size: Option<String>,
    pub effort_level: EffortLevel,
    pub location: ActivityLocation,
    pub age_group: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
}

impl ActivityRequest {
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.name.trim().is_empty() {
            return Err(PlanError::Validation("Activity name must not be empty".to_string()));
        }
        if self.approximate_duration_minutes < 0 {
            return Err(PlanError::Validation(
                "approximate_duration_minutes must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Query string accepted by the activity listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityFilter {
    pub search: Option<String>,
    pub effort_level: Option<EffortLevel>,
    pub location: Option<ActivityLocation>,
    pub age_group: Option<String>,
    pub max_duration: Option<i32>,
    pub category_id: Option<Uuid>,
    pub approved: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ActivityFilter {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    pub fn approved(&self) -> bool {
        self.approved.unwrap_or(true)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Trimmed search text, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityListResponse {
    pub activities: Vec<Activity>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub is_approved: bool,
}

/// The fields of an activity a program needs: its display name and length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub id: Uuid,
    pub name: String,
    pub approximate_duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}
