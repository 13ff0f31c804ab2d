use async_trait::async_trait;
use crate::models::DbProgramEntry;
use eyre::{Result, eyre};
use scoutplan_core::{
    models::entry::{EntryKind, ProgramEntry, ScheduledEntry},
    store::ProgramEntryStore,
};
use sqlx::{Executor, PgPool, Pool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

pub async fn get_entries_by_program_id<'e, E>(
    executor: E,
    program_id: Uuid,
) -> Result<Vec<ProgramEntry>>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, DbProgramEntry>(
        r#"
        SELECT id, program_id, position, start_time, end_time, entry_type,
            activity_id, custom_title, custom_duration_minutes, created_at
        FROM program_entries
        WHERE program_id = $1
        ORDER BY position ASC
        "#,
    )
    .bind(program_id)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(DbProgramEntry::into_entry).collect()
}

/// Deletes the program's entries and inserts `entries` in their place.
/// Returns how many rows were removed. The caller owns the transaction.
pub(crate) async fn write_entries(
    tx: &mut Transaction<'_, Postgres>,
    program_id: Uuid,
    entries: &[ScheduledEntry],
) -> Result<u64> {
    let deleted = sqlx::query("DELETE FROM program_entries WHERE program_id = $1")
        .bind(program_id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    if !entries.is_empty() {
        let mut insert = QueryBuilder::<Postgres>::new(
            "INSERT INTO program_entries (id, program_id, position, start_time, end_time, \
             entry_type, activity_id, custom_title, custom_duration_minutes) ",
        );
        insert.push_values(entries, |mut row, scheduled| {
            let (activity_id, custom_title, custom_duration_minutes) = match &scheduled.entry.kind {
                EntryKind::Activity { activity_id } => (Some(*activity_id), None, None),
                EntryKind::Custom {
                    custom_title,
                    custom_duration_minutes,
                } => (None, Some(custom_title.clone()), *custom_duration_minutes),
            };

            row.push_bind(scheduled.entry.id)
                .push_bind(program_id)
                .push_bind(scheduled.entry.position)
                .push_bind(scheduled.start_time.to_string())
                .push_bind(scheduled.end_time.to_string())
                .push_bind(scheduled.entry.kind.entry_type())
                .push_bind(activity_id)
                .push_bind(custom_title)
                .push_bind(custom_duration_minutes);
        });
        insert.build().execute(&mut **tx).await?;
    }

    Ok(deleted)
}

/// Replaces every entry of a program inside one transaction.
///
/// The program row is locked first, so two replaces of the same program run
/// one after the other instead of interleaving their deletes and inserts.
pub async fn replace_entries(
    pool: &Pool<Postgres>,
    program_id: Uuid,
    entries: &[ScheduledEntry],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM programs WHERE id = $1 FOR UPDATE")
        .bind(program_id)
        .fetch_optional(&mut *tx)
        .await?;
    if locked.is_none() {
        return Err(eyre!("Program {} not found", program_id));
    }

    let deleted = write_entries(&mut tx, program_id, entries).await?;

    sqlx::query("UPDATE programs SET updated_at = NOW() WHERE id = $1")
        .bind(program_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(
        "Replaced program entries: program_id={}, removed={}, inserted={}",
        program_id,
        deleted,
        entries.len()
    );

    Ok(())
}

/// [`ProgramEntryStore`] backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgramEntryStore for PgEntryStore {
    async fn replace_entries(&self, program_id: Uuid, entries: &[ScheduledEntry]) -> Result<()> {
        replace_entries(&self.pool, program_id, entries).await
    }
}
