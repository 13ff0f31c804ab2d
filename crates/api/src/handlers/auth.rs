use std::sync::Arc;

use axum::{Json, extract::State, http::{HeaderMap, StatusCode}};
use chrono::Utc;
use scoutplan_core::{
    errors::PlanError,
    models::user::{CredentialsRequest, LoginResponse, User},
};

use crate::{
    ApiState,
    middleware::{
        auth::{self, AuthUser},
        error_handling::AppError,
    },
};

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    payload.validate_new()?;
    let username = payload.username.trim();

    let existing = scoutplan_db::repositories::user::get_user_by_username(&state.db_pool, username)
        .await
        .map_err(PlanError::Database)?;
    if existing.is_some() {
        return Err(PlanError::Validation(format!("Username '{}' is already taken", username)).into());
    }

    let password_hash = auth::hash_password(&payload.password).map_err(PlanError::Database)?;
    let user = scoutplan_db::repositories::user::create_user(&state.db_pool, username, &password_hash)
        .await
        .map_err(PlanError::Database)?;

    tracing::info!("Registered user {}", user.username);

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = scoutplan_db::repositories::user::verify_credentials(
        &state.db_pool,
        payload.username.trim(),
        &payload.password,
    )
    .await
    .map_err(PlanError::Database)?
    .ok_or_else(|| PlanError::Authentication("Invalid username or password".to_string()))?;

    let token = auth::generate_session_token();
    let expires_at = Utc::now() + state.session_ttl;
    scoutplan_db::repositories::user::create_session(&state.db_pool, &token, user.id, expires_at)
        .await
        .map_err(PlanError::Database)?;

    Ok(Json(LoginResponse {
        token,
        expires_at,
        user: user.into(),
    }))
}

/// Ends the presented session. Requires it to be valid.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<Arc<ApiState>>,
    AuthUser(_user): AuthUser,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    if let Some(token) = auth::bearer_token(&headers) {
        scoutplan_db::repositories::user::delete_session(&state.db_pool, token)
            .await
            .map_err(PlanError::Database)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
