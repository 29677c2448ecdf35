use anyhow::Context;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    dto::{DietFilter, DietInput},
    repo_types::{Diet, COLUMNS},
};
use crate::{
    measurements::services::today,
    pagination::{push_search, PageRequest},
};

pub const ORDERING: &[&str] = &["created_at", "updated_at", "start_date"];
pub const DEFAULT_ORDERING: &str = "-created_at";
const SEARCH: &[&str] = &["name", "notes"];

fn push_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    user_id: Uuid,
    f: &DietFilter,
    search: Option<&str>,
) {
    qb.push(" WHERE user_id = ").push_bind(user_id);
    if let Some(active) = f.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(start) = f.start_date {
        qb.push(" AND start_date = ").push_bind(start);
    }
    if let Some(end) = f.end_date {
        qb.push(" AND end_date = ").push_bind(end);
    }
    push_search(qb, SEARCH, search);
}

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    filter: &DietFilter,
    search: Option<&str>,
    order: &str,
    page: PageRequest,
) -> anyhow::Result<(Vec<Diet>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM diets");
    push_filters(&mut count, user_id, filter, search);
    let total = count
        .build_query_scalar::<i64>()
        .fetch_one(db)
        .await
        .context("count diets")?;

    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM diets"));
    push_filters(&mut qb, user_id, filter, search);
    qb.push(format!(" ORDER BY {order}"))
        .push(" LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);
    let rows = qb
        .build_query_as::<Diet>()
        .fetch_all(db)
        .await
        .context("list diets")?;
    Ok((rows, total))
}

pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Diet>> {
    let row = sqlx::query_as::<_, Diet>(&format!(
        "SELECT {COLUMNS} FROM diets WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get diet")?;
    Ok(row)
}

pub async fn insert(db: &PgPool, user_id: Uuid, input: &DietInput) -> anyhow::Result<Diet> {
    let row = sqlx::query_as::<_, Diet>(&format!(
        r#"
        INSERT INTO diets (user_id, name, day_proteins_g, day_fats_g, day_carbohydrates_g,
                           day_calories_kcal, is_active, start_date, end_date, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&input.name)
    .bind(input.day_proteins_g)
    .bind(input.day_fats_g)
    .bind(input.day_carbohydrates_g)
    .bind(input.day_calories_kcal)
    .bind(input.is_active)
    .bind(input.start_date.unwrap_or_else(today))
    .bind(input.end_date)
    .bind(&input.notes)
    .fetch_one(db)
    .await
    .context("insert diet")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &DietInput,
) -> anyhow::Result<Option<Diet>> {
    let row = sqlx::query_as::<_, Diet>(&format!(
        r#"
        UPDATE diets
           SET name = $3, day_proteins_g = $4, day_fats_g = $5, day_carbohydrates_g = $6,
               day_calories_kcal = $7, is_active = $8, start_date = COALESCE($9, start_date),
               end_date = $10, notes = $11, updated_at = now()
         WHERE id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(&input.name)
    .bind(input.day_proteins_g)
    .bind(input.day_fats_g)
    .bind(input.day_carbohydrates_g)
    .bind(input.day_calories_kcal)
    .bind(input.is_active)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(&input.notes)
    .fetch_optional(db)
    .await
    .context("update diet")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM diets WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete diet")?;
    Ok(res.rows_affected() > 0)
}

/// The owner's active diet; the most recently updated one wins if several are flagged.
pub async fn active(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Diet>> {
    let row = sqlx::query_as::<_, Diet>(&format!(
        r#"
        SELECT {COLUMNS} FROM diets
         WHERE user_id = $1 AND is_active
         ORDER BY updated_at DESC, id
         LIMIT 1
        "#
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("active diet")?;
    Ok(row)
}

pub async fn is_owned(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let found: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM diets WHERE id = $1 AND user_id = $2)")
            .bind(id)
            .bind(user_id)
            .fetch_one(db)
            .await
            .context("diet owned")?;
    Ok(found)
}
