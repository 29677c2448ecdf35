use anyhow::Context;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    dto::{PreferenceFilter, PreferenceInput},
    repo_types::{MealPreference, COLUMNS},
};
use crate::{
    choices::PreferenceType,
    pagination::{push_search, PageRequest},
};

pub const ORDERING: &[&str] = &["created_at", "preference_type"];
pub const DEFAULT_ORDERING: &str = "-created_at";
const SEARCH: &[&str] = &[
    "description",
    "(SELECT name FROM ingredients WHERE ingredients.id = meal_preferences.ingredient_id)",
];

fn push_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    user_id: Uuid,
    f: &PreferenceFilter,
    search: Option<&str>,
) {
    qb.push(" WHERE user_id = ").push_bind(user_id);
    if let Some(kind) = f.preference_type {
        qb.push(" AND preference_type = ").push_bind(kind.as_str());
    }
    if let Some(ingredient) = f.ingredient {
        qb.push(" AND ingredient_id = ").push_bind(ingredient);
    }
    push_search(qb, SEARCH, search);
}

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    filter: &PreferenceFilter,
    search: Option<&str>,
    order: &str,
    page: PageRequest,
) -> anyhow::Result<(Vec<MealPreference>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM meal_preferences");
    push_filters(&mut count, user_id, filter, search);
    let total = count
        .build_query_scalar::<i64>()
        .fetch_one(db)
        .await
        .context("count preferences")?;

    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM meal_preferences"));
    push_filters(&mut qb, user_id, filter, search);
    qb.push(format!(" ORDER BY {order}"))
        .push(" LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);
    let rows = qb
        .build_query_as::<MealPreference>()
        .fetch_all(db)
        .await
        .context("list preferences")?;
    Ok((rows, total))
}

pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<MealPreference>> {
    let row = sqlx::query_as::<_, MealPreference>(&format!(
        "SELECT {COLUMNS} FROM meal_preferences WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get preference")?;
    Ok(row)
}

/// Caller must already have checked that the ingredient is visible to them.
pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    input: &PreferenceInput,
) -> anyhow::Result<MealPreference> {
    let row = sqlx::query_as::<_, MealPreference>(&format!(
        r#"
        INSERT INTO meal_preferences (user_id, ingredient_id, barcode, description, preference_type)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(input.ingredient)
    .bind(&input.barcode)
    .bind(&input.description)
    .bind(input.preference_type.as_str())
    .fetch_one(db)
    .await
    .context("insert preference")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &PreferenceInput,
) -> anyhow::Result<Option<MealPreference>> {
    let row = sqlx::query_as::<_, MealPreference>(&format!(
        r#"
        UPDATE meal_preferences
           SET ingredient_id = $3, barcode = $4, description = $5, preference_type = $6,
               updated_at = now()
         WHERE id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(input.ingredient)
    .bind(&input.barcode)
    .bind(&input.description)
    .bind(input.preference_type.as_str())
    .fetch_optional(db)
    .await
    .context("update preference")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meal_preferences WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete preference")?;
    Ok(res.rows_affected() > 0)
}

pub async fn by_type(
    db: &PgPool,
    user_id: Uuid,
    kind: Option<PreferenceType>,
) -> anyhow::Result<Vec<MealPreference>> {
    let rows = sqlx::query_as::<_, MealPreference>(&format!(
        r#"
        SELECT {COLUMNS} FROM meal_preferences
         WHERE user_id = $1 AND ($2::text IS NULL OR preference_type = $2)
         ORDER BY created_at DESC, id
        "#
    ))
    .bind(user_id)
    .bind(kind.map(PreferenceType::as_str))
    .fetch_all(db)
    .await
    .context("preferences by type")?;
    Ok(rows)
}
