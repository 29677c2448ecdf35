use anyhow::Context;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    dto::{CategoryFilter, CategoryInput},
    repo_types::{Category, COLUMNS},
};
use crate::pagination::{push_search, PageRequest};

pub const ORDERING: &[&str] = &["name", "created_at"];
pub const DEFAULT_ORDERING: &str = "name";
const SEARCH: &[&str] = &["name"];

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, f: &CategoryFilter, search: Option<&str>) {
    qb.push(" WHERE TRUE");
    if let Some(parent) = f.parent {
        qb.push(" AND parent_id = ").push_bind(parent);
    }
    push_search(qb, SEARCH, search);
}

pub async fn list(
    db: &PgPool,
    filter: &CategoryFilter,
    search: Option<&str>,
    order: &str,
    page: PageRequest,
) -> anyhow::Result<(Vec<Category>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM categories");
    push_filters(&mut count, filter, search);
    let total = count
        .build_query_scalar::<i64>()
        .fetch_one(db)
        .await
        .context("count categories")?;

    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM categories"));
    push_filters(&mut qb, filter, search);
    qb.push(format!(" ORDER BY {order}"))
        .push(" LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);
    let rows = qb
        .build_query_as::<Category>()
        .fetch_all(db)
        .await
        .context("list categories")?;
    Ok((rows, total))
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Category>> {
    let row = sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("get category")?;
    Ok(row)
}

pub async fn exists(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let found: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
        .bind(id)
        .fetch_one(db)
        .await
        .context("category exists")?;
    Ok(found)
}

/// Whether `candidate` is `id` itself or one of its descendants.
pub async fn is_descendant(db: &PgPool, id: Uuid, candidate: Uuid) -> anyhow::Result<bool> {
    let found: bool = sqlx::query_scalar(
        r#"
        WITH RECURSIVE subtree AS (
            SELECT id FROM categories WHERE id = $1
            UNION
            SELECT c.id FROM categories c JOIN subtree s ON c.parent_id = s.id
        )
        SELECT EXISTS (SELECT 1 FROM subtree WHERE id = $2)
        "#,
    )
    .bind(id)
    .bind(candidate)
    .fetch_one(db)
    .await
    .context("category subtree")?;
    Ok(found)
}

pub async fn insert(db: &PgPool, input: &CategoryInput) -> anyhow::Result<Category> {
    let row = sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (name, parent_id) VALUES ($1, $2) RETURNING {COLUMNS}"
    ))
    .bind(&input.name)
    .bind(input.parent)
    .fetch_one(db)
    .await
    .context("insert category")?;
    Ok(row)
}

pub async fn update(db: &PgPool, id: Uuid, input: &CategoryInput) -> anyhow::Result<Option<Category>> {
    let row = sqlx::query_as::<_, Category>(&format!(
        "UPDATE categories SET name = $2, parent_id = $3 WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(&input.name)
    .bind(input.parent)
    .fetch_optional(db)
    .await
    .context("update category")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete category")?;
    Ok(res.rows_affected() > 0)
}
