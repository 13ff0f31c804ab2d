use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PlanError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl CredentialsRequest {
    pub const MIN_USERNAME_LEN: usize = 3;
    pub const MAX_USERNAME_LEN: usize = 64;
    pub const MIN_PASSWORD_LEN: usize = 8;

    /// Rules applied at registration; login accepts whatever was stored.
    pub fn validate_new(&self) -> Result<(), PlanError> {
        let username_len = self.username.trim().chars().count();
        if !(Self::MIN_USERNAME_LEN..=Self::MAX_USERNAME_LEN).contains(&username_len) {
            return Err(PlanError::Validation(format!(
                "Username must be between {} and {} characters",
                Self::MIN_USERNAME_LEN,
                Self::MAX_USERNAME_LEN
            )));
        }
        if self.password.chars().count() < Self::MIN_PASSWORD_LEN {
            return Err(PlanError::Validation(format!(
                "Password must be at least {} characters",
                Self::MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}
