use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use scoutplan_core::{
    errors::{PlanError, PlanResult},
    models::activity::{
        Activity, ActivityFilter, ActivityListResponse, ActivityRequest, ApprovalRequest, Category,
        CreateCategoryRequest,
    },
};
use uuid::Uuid;

use crate::{
    ApiState,
    cache::QueryKey,
    middleware::{
        auth::{self, AuthUser, MaybeAuthUser},
        error_handling::AppError,
    },
};

async fn fetch_activity(state: &ApiState, id: Uuid) -> Result<Activity, AppError> {
    let activity = scoutplan_db::repositories::activity::get_activity_by_id(&state.db_pool, id)
        .await
        .map_err(PlanError::Database)?
        .ok_or_else(|| PlanError::NotFound(format!("Activity with ID {} not found", id)))?;
    Ok(activity)
}

/// Activity writes change names and durations shown in program details.
async fn invalidate_activity(state: &ApiState, id: Uuid) {
    state.cache.invalidate(&QueryKey::activity(id)).await;
    state.cache.invalidate_programs();
}

/// Categories assigned to an activity must already exist.
pub fn ensure_categories_exist(requested: &[Uuid], known: &HashSet<Uuid>) -> PlanResult<()> {
    match requested.iter().find(|id| !known.contains(id)) {
        Some(missing) => Err(PlanError::Validation(format!(
            "Category {} does not exist",
            missing
        ))),
        None => Ok(()),
    }
}

async fn validate_request(state: &ApiState, request: &ActivityRequest) -> Result<(), AppError> {
    request.validate()?;
    let known = scoutplan_db::repositories::activity::existing_category_ids(
        &state.db_pool,
        &request.category_ids,
    )
    .await
    .map_err(PlanError::Database)?;
    ensure_categories_exist(&request.category_ids, &known)?;
    Ok(())
}

#[axum::debug_handler]
pub async fn list_activities(
    State(state): State<Arc<ApiState>>,
    caller: MaybeAuthUser,
    Query(filter): Query<ActivityFilter>,
) -> Result<Json<ActivityListResponse>, AppError> {
    if !filter.approved() && !caller.is_admin() {
        return Err(PlanError::Authorization(
            "Only administrators can list unapproved activities".to_string(),
        )
        .into());
    }

    let activities = scoutplan_db::repositories::activity::list_activities(&state.db_pool, &filter)
        .await
        .map_err(PlanError::Database)?;

    Ok(Json(ActivityListResponse {
        activities,
        limit: filter.limit(),
        offset: filter.offset(),
    }))
}

#[axum::debug_handler]
pub async fn get_activity(
    State(state): State<Arc<ApiState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Activity>, AppError> {
    let activity = match state.cache.activity(id).await {
        Some(cached) => cached,
        None => state.cache.put_activity(fetch_activity(&state, id).await?).await,
    };

    auth::ensure_activity_visible(&activity, user.as_ref())?;

    Ok(Json(Activity::clone(&activity)))
}

#[axum::debug_handler]
pub async fn create_activity(
    State(state): State<Arc<ApiState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<ActivityRequest>,
) -> Result<(StatusCode, Json<Activity>), AppError> {
    validate_request(&state, &payload).await?;

    let activity = scoutplan_db::repositories::activity::create_activity(
        &state.db_pool,
        &payload,
        Some(user.id),
        user.is_admin,
    )
    .await
    .map_err(PlanError::Database)?;

    Ok((StatusCode::CREATED, Json(activity)))
}

#[axum::debug_handler]
pub async fn update_activity(
    State(state): State<Arc<ApiState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActivityRequest>,
) -> Result<Json<Activity>, AppError> {
    let existing = fetch_activity(&state, id).await?;
    auth::ensure_can_edit_activity(&existing, &user)?;
    validate_request(&state, &payload).await?;

    let activity = scoutplan_db::repositories::activity::update_activity(&state.db_pool, id, &payload)
        .await
        .map_err(PlanError::Database)?
        .ok_or_else(|| PlanError::NotFound(format!("Activity with ID {} not found", id)))?;

    invalidate_activity(&state, id).await;

    Ok(Json(activity))
}

#[axum::debug_handler]
pub async fn delete_activity(
    State(state): State<Arc<ApiState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let existing = fetch_activity(&state, id).await?;
    auth::ensure_can_edit_activity(&existing, &user)?;

    let deleted = scoutplan_db::repositories::activity::delete_activity(&state.db_pool, id)
        .await
        .map_err(PlanError::Database)?;
    if !deleted {
        return Err(PlanError::NotFound(format!("Activity with ID {} not found", id)).into());
    }

    invalidate_activity(&state, id).await;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn set_approval(
    State(state): State<Arc<ApiState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalRequest>,
) -> Result<Json<Activity>, AppError> {
    auth::ensure_admin(&user)?;

    let activity =
        scoutplan_db::repositories::activity::set_approval(&state.db_pool, id, payload.is_approved)
            .await
            .map_err(PlanError::Database)?
            .ok_or_else(|| PlanError::NotFound(format!("Activity with ID {} not found", id)))?;

    tracing::info!(
        "Activity {} approval set to {} by {}",
        id,
        payload.is_approved,
        user.username
    );
    invalidate_activity(&state, id).await;

    Ok(Json(activity))
}

#[axum::debug_handler]
pub async fn list_categories(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = scoutplan_db::repositories::activity::list_categories(&state.db_pool)
        .await
        .map_err(PlanError::Database)?;
    Ok(Json(categories))
}

#[axum::debug_handler]
pub async fn create_category(
    State(state): State<Arc<ApiState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    auth::ensure_admin(&user)?;
    if payload.name.trim().is_empty() {
        return Err(PlanError::Validation("Category name must not be empty".to_string()).into());
    }

    let category = scoutplan_db::repositories::activity::create_category(&state.db_pool, &payload.name)
        .await
        .map_err(PlanError::Database)?;

    Ok((StatusCode::CREATED, Json(category)))
}
