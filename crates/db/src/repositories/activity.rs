use std::collections::{HashMap, HashSet};

use crate::models::{DbActivity, DbActivityCategory, DbActivitySummary, DbCategory};
use chrono::Utc;
use eyre::Result;
use scoutplan_core::models::activity::{
    Activity, ActivityFilter, ActivityRequest, ActivitySummary, Category,
};
use sqlx::{Executor, Pool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

const ACTIVITY_COLUMNS: &str = "a.id, a.name, a.description, a.materials, \
    a.approximate_duration_minutes, a.group_size, a.effort_level, a.location, \
    a.age_group, a.is_approved, a.created_by, a.created_at, a.updated_at";

/// Escapes `%`, `_` and `\` and wraps the term for a substring `ILIKE`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Appends the `WHERE` clause for an activity listing.
pub fn push_filter_clauses(query: &mut QueryBuilder<'_, Postgres>, filter: &ActivityFilter) {
    query.push(" WHERE a.is_approved = ");
    query.push_bind(filter.approved());

    if let Some(term) = filter.search_term() {
        let pattern = like_pattern(term);
        query.push(" AND (a.name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR a.description ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    if let Some(effort_level) = filter.effort_level {
        query.push(" AND a.effort_level = ");
        query.push_bind(effort_level.as_str());
    }

    if let Some(location) = filter.location {
        query.push(" AND a.location = ");
        query.push_bind(location.as_str());
    }

    if let Some(age_group) = filter.age_group.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        query.push(" AND a.age_group = ");
        query.push_bind(age_group.to_string());
    }

    if let Some(max_duration) = filter.max_duration {
        query.push(" AND a.approximate_duration_minutes <= ");
        query.push_bind(max_duration);
    }

    if let Some(category_id) = filter.category_id {
        query.push(
            " AND EXISTS (SELECT 1 FROM activity_categories ac \
             WHERE ac.activity_id = a.id AND ac.category_id = ",
        );
        query.push_bind(category_id);
        query.push(")");
    }
}

async fn category_ids_for(
    pool: &Pool<Postgres>,
    activity_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Uuid>>> {
    let links = sqlx::query_as::<_, DbActivityCategory>(
        r#"
        SELECT activity_id, category_id
        FROM activity_categories
        WHERE activity_id = ANY($1)
        "#,
    )
    .bind(activity_ids)
    .fetch_all(pool)
    .await?;

    let mut by_activity: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for link in links {
        by_activity
            .entry(link.activity_id)
            .or_default()
            .push(link.category_id);
    }
    Ok(by_activity)
}

async fn attach_categories(pool: &Pool<Postgres>, rows: Vec<DbActivity>) -> Result<Vec<Activity>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut categories = category_ids_for(pool, &ids).await?;

    rows.into_iter()
        .map(|row| {
            let category_ids = categories.remove(&row.id).unwrap_or_default();
            row.into_activity(category_ids)
        })
        .collect()
}

async fn replace_categories(
    tx: &mut Transaction<'_, Postgres>,
    activity_id: Uuid,
    category_ids: &[Uuid],
) -> Result<()> {
    sqlx::query("DELETE FROM activity_categories WHERE activity_id = $1")
        .bind(activity_id)
        .execute(&mut **tx)
        .await?;

    for category_id in category_ids {
        sqlx::query(
            r#"
            INSERT INTO activity_categories (activity_id, category_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(activity_id)
        .bind(category_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub async fn create_activity(
    pool: &Pool<Postgres>,
    request: &ActivityRequest,
    created_by: Option<Uuid>,
    is_approved: bool,
) -> Result<Activity> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating activity: id={}, name={}, approved={}",
        id,
        request.name,
        is_approved
    );

    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, DbActivity>(
        r#"
        INSERT INTO activities (
            id, name, description, materials, approximate_duration_minutes, group_size,
            effort_level, location, age_group, is_approved, created_by, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
        RETURNING id, name, description, materials, approximate_duration_minutes, group_size,
            effort_level, location, age_group, is_approved, created_by, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(request.name.trim())
    .bind(&request.description)
    .bind(&request.materials)
    .bind(request.approximate_duration_minutes)
    .bind(&request.group_size)
    .bind(request.effort_level.as_str())
    .bind(request.location.as_str())
    .bind(&request.age_group)
    .bind(is_approved)
    .bind(created_by)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    replace_categories(&mut tx, id, &request.category_ids).await?;
    tx.commit().await?;

    row.into_activity(request.category_ids.clone())
}

pub async fn get_activity_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Activity>> {
    let row = sqlx::query_as::<_, DbActivity>(&format!(
        "SELECT {} FROM activities a WHERE a.id = $1",
        ACTIVITY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(attach_categories(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

pub async fn list_activities(
    pool: &Pool<Postgres>,
    filter: &ActivityFilter,
) -> Result<Vec<Activity>> {
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {} FROM activities a",
        ACTIVITY_COLUMNS
    ));
    push_filter_clauses(&mut query, filter);
    query.push(" ORDER BY a.name ASC, a.id ASC LIMIT ");
    query.push_bind(filter.limit());
    query.push(" OFFSET ");
    query.push_bind(filter.offset());

    tracing::debug!("Listing activities: {}", query.sql());

    let rows = query
        .build_query_as::<DbActivity>()
        .fetch_all(pool)
        .await?;

    attach_categories(pool, rows).await
}

pub async fn update_activity(
    pool: &Pool<Postgres>,
    id: Uuid,
    request: &ActivityRequest,
) -> Result<Option<Activity>> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, DbActivity>(
        r#"
        UPDATE activities
        SET name = $2, description = $3, materials = $4, approximate_duration_minutes = $5,
            group_size = $6, effort_level = $7, location = $8, age_group = $9, updated_at = $10
        WHERE id = $1
        RETURNING id, name, description, materials, approximate_duration_minutes, group_size,
            effort_level, location, age_group, is_approved, created_by, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(request.name.trim())
    .bind(&request.description)
    .bind(&request.materials)
    .bind(request.approximate_duration_minutes)
    .bind(&request.group_size)
    .bind(request.effort_level.as_str())
    .bind(request.location.as_str())
    .bind(&request.age_group)
    .bind(Utc::now())
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    replace_categories(&mut tx, id, &request.category_ids).await?;
    tx.commit().await?;

    Ok(Some(row.into_activity(request.category_ids.clone())?))
}

pub async fn set_approval(
    pool: &Pool<Postgres>,
    id: Uuid,
    is_approved: bool,
) -> Result<Option<Activity>> {
    let row = sqlx::query_as::<_, DbActivity>(
        r#"
        UPDATE activities
        SET is_approved = $2, updated_at = $3
        WHERE id = $1
        RETURNING id, name, description, materials, approximate_duration_minutes, group_size,
            effort_level, location, age_group, is_approved, created_by, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(is_approved)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(attach_categories(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

pub async fn delete_activity(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM activities WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Names and durations for the given ids. Unknown ids are simply absent.
pub async fn get_activity_summaries<'e, E>(
    executor: E,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, ActivitySummary>>
where
    E: Executor<'e, Database = Postgres>,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, DbActivitySummary>(
        r#"
        SELECT id, name, approximate_duration_minutes
        FROM activities
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.id, ActivitySummary::from(row)))
        .collect())
}

pub async fn list_categories(pool: &Pool<Postgres>) -> Result<Vec<Category>> {
    let rows = sqlx::query_as::<_, DbCategory>(
        r#"
        SELECT id, name
        FROM categories
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Category::from).collect())
}

/// The subset of `ids` that name existing categories.
pub async fn existing_category_ids(pool: &Pool<Postgres>, ids: &[Uuid]) -> Result<HashSet<Uuid>> {
    if ids.is_empty() {
        return Ok(HashSet::new());
    }

    let found = sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(found.into_iter().collect())
}

pub async fn create_category(pool: &Pool<Postgres>, name: &str) -> Result<Category> {
    let row = sqlx::query_as::<_, DbCategory>(
        r#"
        INSERT INTO categories (id, name)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id, name
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name.trim())
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}
