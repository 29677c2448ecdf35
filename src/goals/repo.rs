use anyhow::Context;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::Date;
use uuid::Uuid;

use super::{
    dto::{GoalFilter, GoalInput},
    repo_types::{Goal, COLUMNS},
};
use crate::{
    choices::GoalType,
    pagination::{push_search, PageRequest},
};

pub const ORDERING: &[&str] = &["created_at", "updated_at", "target_date"];
pub const DEFAULT_ORDERING: &str = "-created_at";
const SEARCH: &[&str] = &["notes"];

fn push_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    user_id: Uuid,
    f: &GoalFilter,
    search: Option<&str>,
) {
    qb.push(" WHERE user_id = ").push_bind(user_id);
    if let Some(goal_type) = f.goal_type {
        qb.push(" AND goal_type = ").push_bind(goal_type.as_str());
    }
    if let Some(active) = f.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(target) = f.target_date {
        qb.push(" AND target_date = ").push_bind(target);
    }
    push_search(qb, SEARCH, search);
}

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    filter: &GoalFilter,
    search: Option<&str>,
    order: &str,
    page: PageRequest,
) -> anyhow::Result<(Vec<Goal>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM goals");
    push_filters(&mut count, user_id, filter, search);
    let total = count
        .build_query_scalar::<i64>()
        .fetch_one(db)
        .await
        .context("count goals")?;

    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM goals"));
    push_filters(&mut qb, user_id, filter, search);
    qb.push(format!(" ORDER BY {order}"))
        .push(" LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);
    let rows = qb
        .build_query_as::<Goal>()
        .fetch_all(db)
        .await
        .context("list goals")?;
    Ok((rows, total))
}

pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Goal>> {
    let row = sqlx::query_as::<_, Goal>(&format!(
        "SELECT {COLUMNS} FROM goals WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get goal")?;
    Ok(row)
}

pub async fn insert(db: &PgPool, user_id: Uuid, input: &GoalInput) -> anyhow::Result<Goal> {
    let row = sqlx::query_as::<_, Goal>(&format!(
        r#"
        INSERT INTO goals (user_id, goal_type, target_date, notes, is_active)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(input.goal_type.as_str())
    .bind(input.target_date)
    .bind(&input.notes)
    .bind(input.is_active)
    .fetch_one(db)
    .await
    .context("insert goal")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &GoalInput,
) -> anyhow::Result<Option<Goal>> {
    let row = sqlx::query_as::<_, Goal>(&format!(
        r#"
        UPDATE goals
           SET goal_type = $3, target_date = $4, notes = $5, is_active = $6, updated_at = now()
         WHERE id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(input.goal_type.as_str())
    .bind(input.target_date)
    .bind(&input.notes)
    .bind(input.is_active)
    .fetch_optional(db)
    .await
    .context("update goal")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete goal")?;
    Ok(res.rows_affected() > 0)
}

pub async fn active(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Goal>> {
    let rows = sqlx::query_as::<_, Goal>(&format!(
        r#"
        SELECT {COLUMNS} FROM goals
         WHERE user_id = $1 AND is_active
         ORDER BY created_at DESC, id
        "#
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("active goals")?;
    Ok(rows)
}

pub async fn by_type(
    db: &PgPool,
    user_id: Uuid,
    goal_type: Option<GoalType>,
) -> anyhow::Result<Vec<Goal>> {
    let rows = sqlx::query_as::<_, Goal>(&format!(
        r#"
        SELECT {COLUMNS} FROM goals
         WHERE user_id = $1 AND ($2::text IS NULL OR goal_type = $2)
         ORDER BY created_at DESC, id
        "#
    ))
    .bind(user_id)
    .bind(goal_type.map(GoalType::as_str))
    .fetch_all(db)
    .await
    .context("goals by type")?;
    Ok(rows)
}

/// Active goals due on or after `today`, soonest first.
pub async fn upcoming(db: &PgPool, user_id: Uuid, today: Date) -> anyhow::Result<Vec<Goal>> {
    let rows = sqlx::query_as::<_, Goal>(&format!(
        r#"
        SELECT {COLUMNS} FROM goals
         WHERE user_id = $1 AND is_active AND target_date >= $2
         ORDER BY target_date, id
        "#
    ))
    .bind(user_id)
    .bind(today)
    .fetch_all(db)
    .await
    .context("upcoming goals")?;
    Ok(rows)
}

/// Active goals whose target date has passed.
pub async fn overdue(db: &PgPool, user_id: Uuid, today: Date) -> anyhow::Result<Vec<Goal>> {
    let rows = sqlx::query_as::<_, Goal>(&format!(
        r#"
        SELECT {COLUMNS} FROM goals
         WHERE user_id = $1 AND is_active AND target_date < $2
         ORDER BY target_date, id
        "#
    ))
    .bind(user_id)
    .bind(today)
    .fetch_all(db)
    .await
    .context("overdue goals")?;
    Ok(rows)
}
