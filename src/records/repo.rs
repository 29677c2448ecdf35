use anyhow::Context;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{
    dto::{RecordFilter, RecordInput},
    repo_types::{MealRecord, COLUMNS},
};
use crate::pagination::{push_search, PageRequest};

pub const ORDERING: &[&str] = &["timestamp", "created_at"];
pub const DEFAULT_ORDERING: &str = "-timestamp";
const SEARCH: &[&str] = &["meal_name", "feedback"];

const UTC_DATE: &str = "(timestamp AT TIME ZONE 'UTC')::date";

fn push_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    user_id: Uuid,
    f: &RecordFilter,
    search: Option<&str>,
) {
    qb.push(" WHERE user_id = ").push_bind(user_id);
    if let Some(meal) = f.meal {
        qb.push(" AND meal_id = ").push_bind(meal);
    }
    if let Some(date) = f.date {
        qb.push(format!(" AND {UTC_DATE} = ")).push_bind(date);
    }
    push_search(qb, SEARCH, search);
}

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    filter: &RecordFilter,
    search: Option<&str>,
    order: &str,
    page: PageRequest,
) -> anyhow::Result<(Vec<MealRecord>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM meal_records");
    push_filters(&mut count, user_id, filter, search);
    let total = count
        .build_query_scalar::<i64>()
        .fetch_one(db)
        .await
        .context("count records")?;

    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM meal_records"));
    push_filters(&mut qb, user_id, filter, search);
    qb.push(format!(" ORDER BY {order}"))
        .push(" LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);
    let rows = qb
        .build_query_as::<MealRecord>()
        .fetch_all(db)
        .await
        .context("list records")?;
    Ok((rows, total))
}

pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<MealRecord>> {
    let row = sqlx::query_as::<_, MealRecord>(&format!(
        "SELECT {COLUMNS} FROM meal_records WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get record")?;
    Ok(row)
}

/// Caller must already have checked that `input.meal` is theirs.
pub async fn insert(db: &PgPool, user_id: Uuid, input: &RecordInput) -> anyhow::Result<MealRecord> {
    let timestamp = input.timestamp.unwrap_or_else(OffsetDateTime::now_utc);
    let row = sqlx::query_as::<_, MealRecord>(&format!(
        r#"
        INSERT INTO meal_records (user_id, meal_id, meal_name, quantity_grams, calories,
                                  proteins, carbs, fats, timestamp, photo, feedback)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(input.meal)
    .bind(&input.meal_name)
    .bind(input.quantity_grams)
    .bind(input.calories)
    .bind(input.proteins)
    .bind(input.carbs)
    .bind(input.fats)
    .bind(timestamp)
    .bind(&input.photo)
    .bind(&input.feedback)
    .fetch_one(db)
    .await
    .context("insert record")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &RecordInput,
) -> anyhow::Result<Option<MealRecord>> {
    let row = sqlx::query_as::<_, MealRecord>(&format!(
        r#"
        UPDATE meal_records
           SET meal_id = $3, meal_name = $4, quantity_grams = $5, calories = $6,
               proteins = $7, carbs = $8, fats = $9, timestamp = COALESCE($10, timestamp),
               photo = $11, feedback = $12, updated_at = now()
         WHERE id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(input.meal)
    .bind(&input.meal_name)
    .bind(input.quantity_grams)
    .bind(input.calories)
    .bind(input.proteins)
    .bind(input.carbs)
    .bind(input.fats)
    .bind(input.timestamp)
    .bind(&input.photo)
    .bind(&input.feedback)
    .fetch_optional(db)
    .await
    .context("update record")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meal_records WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete record")?;
    Ok(res.rows_affected() > 0)
}

/// Records whose UTC date lies in `[start, end]`, newest first.
pub async fn in_range(
    db: &PgPool,
    user_id: Uuid,
    start: Date,
    end: Date,
) -> anyhow::Result<Vec<MealRecord>> {
    let rows = sqlx::query_as::<_, MealRecord>(&format!(
        r#"
        SELECT {COLUMNS}
          FROM meal_records
         WHERE user_id = $1 AND {UTC_DATE} BETWEEN $2 AND $3
         ORDER BY timestamp DESC, id DESC
        "#
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
    .context("records in range")?;
    Ok(rows)
}
