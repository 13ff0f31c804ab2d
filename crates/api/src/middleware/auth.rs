//! # Authentication Module
//!
//! Password hashing, session tokens and the request extractors that resolve
//! the calling user. Ownership checks for programs and activities live here
//! too so handlers apply them uniformly.
//!
//! Passwords are hashed with Argon2 using a fresh random salt per password.

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use eyre::Result;
use rand::{Rng, distributions::Alphanumeric};
use scoutplan_core::{
    errors::{PlanError, PlanResult},
    models::{activity::Activity, program::Program, user::User},
};

use crate::{ApiState, middleware::error_handling::AppError};

/// Length of generated session tokens.
pub const SESSION_TOKEN_LEN: usize = 48;

/// Hashes a password using the Argon2 algorithm
///
/// Returns the hash in PHC string format (algorithm, parameters, salt and hash).
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

pub fn generate_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

async fn resolve_user(state: &ApiState, token: &str) -> PlanResult<Option<User>> {
    let user = scoutplan_db::repositories::user::get_user_by_session_token(&state.db_pool, token)
        .await
        .map_err(PlanError::Database)?;
    Ok(user.map(User::from))
}

/// The authenticated caller. Rejects the request with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            PlanError::Authentication("Missing bearer token".to_string())
        })?;

        let user = resolve_user(state, token).await?.ok_or_else(|| {
            PlanError::Authentication("Invalid or expired session".to_string())
        })?;

        Ok(AuthUser(user))
    }
}

/// The caller if a valid session was presented; anonymous otherwise.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<User>);

impl MaybeAuthUser {
    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(|user| user.is_admin)
    }
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(&parts.headers) {
            Some(token) => Ok(MaybeAuthUser(resolve_user(state, token).await?)),
            None => Ok(MaybeAuthUser(None)),
        }
    }
}

pub fn ensure_owner(program: &Program, user: &User) -> PlanResult<()> {
    if program.is_owned_by(user.id) {
        Ok(())
    } else {
        Err(PlanError::Authorization(
            "Only the owner can modify this program".to_string(),
        ))
    }
}

pub fn ensure_visible(program: &Program, user: Option<&User>) -> PlanResult<()> {
    if program.is_visible_to(user.map(|u| u.id)) {
        Ok(())
    } else {
        Err(PlanError::Authorization(
            "This program is private".to_string(),
        ))
    }
}

pub fn ensure_admin(user: &User) -> PlanResult<()> {
    if user.is_admin {
        Ok(())
    } else {
        Err(PlanError::Authorization(
            "Administrator rights required".to_string(),
        ))
    }
}

/// Creators may edit their own activities; admins may edit any.
pub fn ensure_can_edit_activity(activity: &Activity, user: &User) -> PlanResult<()> {
    if user.is_admin || activity.created_by == Some(user.id) {
        Ok(())
    } else {
        Err(PlanError::Authorization(
            "Only the creator or an administrator can modify this activity".to_string(),
        ))
    }
}

/// Unapproved activities are visible to their creator and admins only.
/// Everyone else gets the same answer as for a missing activity.
pub fn ensure_activity_visible(activity: &Activity, user: Option<&User>) -> PlanResult<()> {
    let allowed = activity.is_approved
        || user.is_some_and(|u| u.is_admin || activity.created_by == Some(u.id));
    if allowed {
        Ok(())
    } else {
        Err(PlanError::NotFound(format!(
            "Activity with ID {} not found",
            activity.id
        )))
    }
}
