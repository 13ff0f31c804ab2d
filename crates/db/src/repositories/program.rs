use crate::models::DbProgram;
use crate::repositories::{
    activity::get_activity_summaries,
    program_entry::{get_entries_by_program_id, write_entries},
};
use chrono::Utc;
use eyre::Result;
use scoutplan_core::{
    models::program::{Program, ProgramRequest},
    schedule,
    time::ClockTime,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_program(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    request: &ProgramRequest,
    start_time: ClockTime,
) -> Result<Program> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating program: id={}, name={}, user_id={}, start_time={}",
        id,
        request.name,
        user_id,
        start_time
    );

    let program = sqlx::query_as::<_, DbProgram>(
        r#"
        INSERT INTO programs (id, name, date, start_time, user_id, is_public, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING id, name, date, start_time, user_id, is_public, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(request.name.trim())
    .bind(request.date)
    .bind(start_time.to_string())
    .bind(user_id)
    .bind(request.is_public)
    .bind(now)
    .fetch_one(pool)
    .await?;

    program.into_program()
}

pub async fn get_program_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Program>> {
    let program = sqlx::query_as::<_, DbProgram>(
        r#"
        SELECT id, name, date, start_time, user_id, is_public, created_at, updated_at
        FROM programs
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    if program.is_none() {
        tracing::debug!("Program not found: id={}", id);
    }

    program.map(DbProgram::into_program).transpose()
}

pub async fn list_programs_for_user(pool: &Pool<Postgres>, user_id: Uuid) -> Result<Vec<Program>> {
    let programs = sqlx::query_as::<_, DbProgram>(
        r#"
        SELECT id, name, date, start_time, user_id, is_public, created_at, updated_at
        FROM programs
        WHERE user_id = $1
        ORDER BY date DESC NULLS LAST, created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    programs.into_iter().map(DbProgram::into_program).collect()
}

pub async fn list_public_programs(pool: &Pool<Postgres>) -> Result<Vec<Program>> {
    let programs = sqlx::query_as::<_, DbProgram>(
        r#"
        SELECT id, name, date, start_time, user_id, is_public, created_at, updated_at
        FROM programs
        WHERE is_public = TRUE
        ORDER BY date DESC NULLS LAST, created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    programs.into_iter().map(DbProgram::into_program).collect()
}

/// Full-field update. Returns `None` when the program does not exist.
///
/// When the start time changes, the stored entry times are recomputed from
/// the new start in the same transaction, so the program row and its
/// entries never disagree.
pub async fn update_program(
    pool: &Pool<Postgres>,
    id: Uuid,
    request: &ProgramRequest,
    start_time: ClockTime,
) -> Result<Option<Program>> {
    let mut tx = pool.begin().await?;

    let previous_start = sqlx::query_scalar::<_, String>(
        "SELECT start_time FROM programs WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(previous_start) = previous_start else {
        return Ok(None);
    };

    let program = sqlx::query_as::<_, DbProgram>(
        r#"
        UPDATE programs
        SET name = $2, date = $3, start_time = $4, is_public = $5, updated_at = $6
        WHERE id = $1
        RETURNING id, name, date, start_time, user_id, is_public, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(request.name.trim())
    .bind(request.date)
    .bind(start_time.to_string())
    .bind(request.is_public)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?
    .into_program()?;

    if previous_start.parse::<ClockTime>().ok() != Some(start_time) {
        let entries = get_entries_by_program_id(&mut *tx, id).await?;
        let activity_ids: Vec<Uuid> = entries
            .iter()
            .filter_map(|entry| entry.kind.activity_id())
            .collect();
        let durations = get_activity_summaries(&mut *tx, &activity_ids).await?;
        let rescheduled = schedule::compute_schedule(&entries, start_time, &durations);

        write_entries(&mut tx, id, &rescheduled).await?;
        tracing::debug!(
            "Rescheduled {} entries of program {} from {}",
            rescheduled.len(),
            id,
            start_time
        );
    }

    tx.commit().await?;

    Ok(Some(program))
}

/// Deletes the program; its entries go with it.
pub async fn delete_program(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM programs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
