//! Program handlers.
//!
//! Reads assemble a [`ProgramDetailResponse`] from the stored entries and the
//! current activity catalogue; times are always recomputed, never read back.
//! Writes go through a [`ProgramEditor`] so a failed store leaves the last
//! committed entries in place.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use scoutplan_core::{
    editor::ProgramEditor,
    errors::{PlanError, PlanResult},
    models::{
        activity::ActivitySummary,
        entry::{
            EntryInput, ProgramEntry, ReorderRequest, ReplaceEntriesRequest, ScheduledEntry,
            ScheduledEntryResponse,
        },
        program::{Program, ProgramDetailResponse, ProgramListQuery, ProgramRequest, ProgramScope},
        user::User,
    },
    schedule,
};
use scoutplan_db::repositories::program_entry::PgEntryStore;
use uuid::Uuid;

use crate::{
    ApiState,
    cache::QueryKey,
    middleware::{
        auth::{self, AuthUser, MaybeAuthUser},
        error_handling::AppError,
    },
};

/// Assembles the detail view of a program from an already computed schedule.
pub fn build_detail(
    program: Program,
    scheduled: Vec<ScheduledEntry>,
    activities: &HashMap<Uuid, ActivitySummary>,
) -> ProgramDetailResponse {
    let end_time = schedule::schedule_end(&scheduled, program.start_time);

    let entries = scheduled
        .into_iter()
        .map(|scheduled| {
            let activity_name = scheduled
                .entry
                .kind
                .activity_id()
                .and_then(|id| activities.get(&id))
                .map(|summary| summary.name.clone());
            ScheduledEntryResponse {
                duration_minutes: scheduled.duration_minutes(),
                activity_name,
                scheduled,
            }
        })
        .collect();

    ProgramDetailResponse {
        program,
        end_time,
        entries,
    }
}

fn activity_ids<'a>(entries: impl IntoIterator<Item = &'a ProgramEntry>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter_map(|entry| entry.kind.activity_id())
        .filter(|id| seen.insert(*id))
        .collect()
}

async fn fetch_program(state: &ApiState, id: Uuid) -> Result<Program, AppError> {
    let program = scoutplan_db::repositories::program::get_program_by_id(&state.db_pool, id)
        .await
        .map_err(PlanError::Database)?
        .ok_or_else(|| PlanError::NotFound(format!("Program with ID {} not found", id)))?;
    Ok(program)
}

async fn fetch_summaries(
    state: &ApiState,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, ActivitySummary>, AppError> {
    let summaries = scoutplan_db::repositories::activity::get_activity_summaries(&state.db_pool, ids)
        .await
        .map_err(PlanError::Database)?;
    Ok(summaries)
}

/// Loads the program's persisted entries into an editor, together with the
/// durations needed to schedule them.
async fn open_editor(
    state: &ApiState,
    program: &Program,
) -> Result<(ProgramEditor, HashMap<Uuid, ActivitySummary>), AppError> {
    let entries =
        scoutplan_db::repositories::program_entry::get_entries_by_program_id(&state.db_pool, program.id)
            .await
            .map_err(PlanError::Database)?;
    let summaries = fetch_summaries(state, &activity_ids(&entries)).await?;

    Ok((
        ProgramEditor::new(program.id, program.start_time, entries),
        summaries,
    ))
}

/// Detail for `program`, served from the cache when possible.
async fn load_detail(
    state: &ApiState,
    program: Program,
) -> Result<Arc<ProgramDetailResponse>, AppError> {
    if let Some(cached) = state.cache.program(program.id).await {
        return Ok(cached);
    }

    let (editor, summaries) = open_editor(state, &program).await?;
    let scheduled = editor.schedule(&summaries);
    Ok(state
        .cache
        .put_program(build_detail(program, scheduled, &summaries))
        .await)
}

/// Writes the editor's staged entries and refreshes the cached detail.
async fn commit_and_refresh(
    state: &ApiState,
    mut editor: ProgramEditor,
    summaries: &HashMap<Uuid, ActivitySummary>,
) -> Result<Arc<ProgramDetailResponse>, AppError> {
    let store = PgEntryStore::new(state.db_pool.clone());
    let scheduled = editor
        .commit(&store, summaries)
        .await
        .into_result()
        .map_err(PlanError::Database)?;

    // updated_at moved with the write
    let program = fetch_program(state, editor.program_id()).await?;
    state.cache.invalidate(&QueryKey::program(program.id)).await;
    Ok(state
        .cache
        .put_program(build_detail(program, scheduled, summaries))
        .await)
}

async fn owned_program(state: &ApiState, id: Uuid, user: &User) -> Result<Program, AppError> {
    let program = fetch_program(state, id).await?;
    auth::ensure_owner(&program, user)?;
    Ok(program)
}

/// Turns the client's list into entries in list order.
///
/// Ids are kept only for entries the program already has, and only once; any
/// other id is replaced by a fresh one. An existing entry may not change kind.
pub fn prepare_entries(
    inputs: Vec<EntryInput>,
    snapshot: &[ProgramEntry],
) -> PlanResult<Vec<ProgramEntry>> {
    let existing: HashMap<Uuid, &ProgramEntry> =
        snapshot.iter().map(|entry| (entry.id, entry)).collect();
    let mut used = HashSet::new();

    inputs
        .into_iter()
        .enumerate()
        .map(|(index, mut input)| {
            input.validate()?;

            let kept = input
                .id
                .and_then(|id| existing.get(&id).copied())
                .filter(|current| used.insert(current.id));

            if let Some(current) = kept {
                if current.kind.entry_type() != input.kind.entry_type() {
                    return Err(PlanError::Validation(format!(
                        "Entry {} cannot change from {} to {}",
                        current.id,
                        current.kind.entry_type(),
                        input.kind.entry_type()
                    )));
                }
            }
            input.id = kept.map(|current| current.id);

            Ok(input.into_entry(index as i32))
        })
        .collect()
}

/// Every referenced activity must be in the catalogue when entries are written.
pub fn ensure_activities_exist(
    referenced: &[Uuid],
    known: &HashMap<Uuid, ActivitySummary>,
) -> PlanResult<()> {
    match referenced.iter().find(|id| !known.contains_key(id)) {
        Some(missing) => Err(PlanError::Validation(format!(
            "Activity {} does not exist",
            missing
        ))),
        None => Ok(()),
    }
}

#[axum::debug_handler]
pub async fn create_program(
    State(state): State<Arc<ApiState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<ProgramRequest>,
) -> Result<(StatusCode, Json<ProgramDetailResponse>), AppError> {
    let start_time = payload.validate()?;

    let program = scoutplan_db::repositories::program::create_program(
        &state.db_pool,
        user.id,
        &payload,
        start_time,
    )
    .await
    .map_err(PlanError::Database)?;

    tracing::info!("Created program {} for {}", program.id, user.username);

    Ok((
        StatusCode::CREATED,
        Json(build_detail(program, Vec::new(), &HashMap::new())),
    ))
}

#[axum::debug_handler]
pub async fn list_programs(
    State(state): State<Arc<ApiState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Query(query): Query<ProgramListQuery>,
) -> Result<Json<Vec<Program>>, AppError> {
    let programs = match query.scope {
        ProgramScope::Public => {
            scoutplan_db::repositories::program::list_public_programs(&state.db_pool).await
        }
        ProgramScope::Mine => {
            let user = user.ok_or_else(|| {
                PlanError::Authentication("Sign in to list your programs".to_string())
            })?;
            scoutplan_db::repositories::program::list_programs_for_user(&state.db_pool, user.id)
                .await
        }
    }
    .map_err(PlanError::Database)?;

    Ok(Json(programs))
}

#[axum::debug_handler]
pub async fn get_program(
    State(state): State<Arc<ApiState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProgramDetailResponse>, AppError> {
    let detail = match state.cache.program(id).await {
        Some(cached) => cached,
        None => load_detail(&state, fetch_program(&state, id).await?).await?,
    };

    auth::ensure_visible(&detail.program, user.as_ref())?;

    Ok(Json(ProgramDetailResponse::clone(&detail)))
}

#[axum::debug_handler]
pub async fn update_program(
    State(state): State<Arc<ApiState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProgramRequest>,
) -> Result<Json<ProgramDetailResponse>, AppError> {
    owned_program(&state, id, &user).await?;
    let start_time = payload.validate()?;

    // Entry times are rewritten with the row when the start moves.
    let program = scoutplan_db::repositories::program::update_program(
        &state.db_pool,
        id,
        &payload,
        start_time,
    )
    .await
    .map_err(PlanError::Database)?
    .ok_or_else(|| PlanError::NotFound(format!("Program with ID {} not found", id)))?;

    state.cache.invalidate(&QueryKey::program(id)).await;

    let detail = load_detail(&state, program).await?;
    Ok(Json(ProgramDetailResponse::clone(&detail)))
}

#[axum::debug_handler]
pub async fn delete_program(
    State(state): State<Arc<ApiState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    owned_program(&state, id, &user).await?;

    let deleted = scoutplan_db::repositories::program::delete_program(&state.db_pool, id)
        .await
        .map_err(PlanError::Database)?;
    if !deleted {
        return Err(PlanError::NotFound(format!("Program with ID {} not found", id)).into());
    }

    state.cache.invalidate(&QueryKey::program(id)).await;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn replace_entries(
    State(state): State<Arc<ApiState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReplaceEntriesRequest>,
) -> Result<Json<ProgramDetailResponse>, AppError> {
    let program = owned_program(&state, id, &user).await?;
    let (mut editor, _) = open_editor(&state, &program).await?;

    let entries = prepare_entries(payload.entries, editor.snapshot())?;

    let referenced = activity_ids(&entries);
    let summaries = fetch_summaries(&state, &referenced).await?;
    ensure_activities_exist(&referenced, &summaries)?;

    editor.stage(entries);
    let detail = commit_and_refresh(&state, editor, &summaries).await?;

    Ok(Json(ProgramDetailResponse::clone(&detail)))
}

#[axum::debug_handler]
pub async fn reorder_entries(
    State(state): State<Arc<ApiState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<ProgramDetailResponse>, AppError> {
    let program = owned_program(&state, id, &user).await?;
    let (mut editor, summaries) = open_editor(&state, &program).await?;

    if !editor.stage_reorder(payload.moved_id, payload.from_index, payload.to_index) {
        let detail = build_detail(program, editor.schedule(&summaries), &summaries);
        return Ok(Json(detail));
    }

    let detail = commit_and_refresh(&state, editor, &summaries).await?;
    Ok(Json(ProgramDetailResponse::clone(&detail)))
}
