use anyhow::Context;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    dto::{IngredientFilter, IngredientInput},
    repo_types::{Ingredient, IngredientHit, COLUMNS},
};
use crate::pagination::{like_pattern, push_search, PageRequest};

pub const ORDERING: &[&str] = &["name", "calories", "proteins", "created_at"];
pub const DEFAULT_ORDERING: &str = "name";
const SEARCH: &[&str] = &["name", "description"];

/// Public ingredients plus the caller's own.
fn push_visible(qb: &mut QueryBuilder<'_, Postgres>, user_id: Uuid) {
    qb.push("(is_personal = FALSE OR created_by = ")
        .push_bind(user_id)
        .push(")");
}

fn push_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    user_id: Uuid,
    f: &IngredientFilter,
    search: Option<&str>,
) {
    qb.push(" WHERE ");
    push_visible(qb, user_id);
    if let Some(category) = f.category {
        qb.push(" AND category_id = ").push_bind(category);
    }
    if let Some(personal) = f.is_personal {
        qb.push(" AND is_personal = ").push_bind(personal);
    }
    push_search(qb, SEARCH, search);
}

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    filter: &IngredientFilter,
    search: Option<&str>,
    order: &str,
    page: PageRequest,
) -> anyhow::Result<(Vec<Ingredient>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM ingredients");
    push_filters(&mut count, user_id, filter, search);
    let total = count
        .build_query_scalar::<i64>()
        .fetch_one(db)
        .await
        .context("count ingredients")?;

    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM ingredients"));
    push_filters(&mut qb, user_id, filter, search);
    qb.push(format!(" ORDER BY {order}"))
        .push(" LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);
    let rows = qb
        .build_query_as::<Ingredient>()
        .fetch_all(db)
        .await
        .context("list ingredients")?;
    Ok((rows, total))
}

pub async fn get_visible(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Ingredient>> {
    let row = sqlx::query_as::<_, Ingredient>(&format!(
        r#"
        SELECT {COLUMNS} FROM ingredients
         WHERE id = $1 AND (is_personal = FALSE OR created_by = $2)
        "#
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get ingredient")?;
    Ok(row)
}

pub async fn is_visible(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let found: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM ingredients
             WHERE id = $1 AND (is_personal = FALSE OR created_by = $2)
        )
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_one(db)
    .await
    .context("ingredient visible")?;
    Ok(found)
}

/// Rows the caller may edit: the ones they created.
pub async fn get_owned(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Ingredient>> {
    let row = sqlx::query_as::<_, Ingredient>(&format!(
        "SELECT {COLUMNS} FROM ingredients WHERE id = $1 AND created_by = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get own ingredient")?;
    Ok(row)
}

/// Caller-created ingredients are always personal.
pub async fn insert(db: &PgPool, user_id: Uuid, input: &IngredientInput) -> anyhow::Result<Ingredient> {
    let row = sqlx::query_as::<_, Ingredient>(&format!(
        r#"
        INSERT INTO ingredients (name, category_id, calories, proteins, fats, carbs,
                                 fibers, sugars, description, is_personal, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&input.name)
    .bind(input.category)
    .bind(input.calories)
    .bind(input.proteins)
    .bind(input.fats)
    .bind(input.carbs)
    .bind(input.fibers)
    .bind(input.sugars)
    .bind(&input.description)
    .bind(user_id)
    .fetch_one(db)
    .await
    .context("insert ingredient")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &IngredientInput,
) -> anyhow::Result<Option<Ingredient>> {
    let row = sqlx::query_as::<_, Ingredient>(&format!(
        r#"
        UPDATE ingredients
           SET name = $3, category_id = $4, calories = $5, proteins = $6, fats = $7,
               carbs = $8, fibers = $9, sugars = $10, description = $11, updated_at = now()
         WHERE id = $1 AND created_by = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(&input.name)
    .bind(input.category)
    .bind(input.calories)
    .bind(input.proteins)
    .bind(input.fats)
    .bind(input.carbs)
    .bind(input.fibers)
    .bind(input.sugars)
    .bind(&input.description)
    .fetch_optional(db)
    .await
    .context("update ingredient")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM ingredients WHERE id = $1 AND created_by = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete ingredient")?;
    Ok(res.rows_affected() > 0)
}

/// Up to `limit` visible ingredients whose name or description contains `term`.
pub async fn search(
    db: &PgPool,
    user_id: Uuid,
    term: &str,
    limit: i64,
) -> anyhow::Result<Vec<IngredientHit>> {
    let rows = sqlx::query_as::<_, IngredientHit>(
        r#"
        SELECT id, name, category_id, calories, proteins, fats, carbs
          FROM ingredients
         WHERE (is_personal = FALSE OR created_by = $1)
           AND (name ILIKE $2 OR description ILIKE $2)
         ORDER BY name, id
         LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(like_pattern(term))
    .bind(limit)
    .fetch_all(db)
    .await
    .context("search ingredients")?;
    Ok(rows)
}

pub async fn personal(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Ingredient>> {
    let rows = sqlx::query_as::<_, Ingredient>(&format!(
        r#"
        SELECT {COLUMNS} FROM ingredients
         WHERE created_by = $1 AND is_personal
         ORDER BY name, id
        "#
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("personal ingredients")?;
    Ok(rows)
}
