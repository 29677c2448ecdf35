use anyhow::Context;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    dto::{LineFilter, LineInput, MealFilter, MealInput},
    repo_types::{IngredientLine, Meal, MealIngredient, LINE_COLUMNS, MEAL_COLUMNS},
};
use crate::pagination::{push_search, PageRequest};

pub const MEAL_ORDERING: &[&str] = &["created_at", "updated_at", "start_date", "start_time"];
pub const MEAL_DEFAULT_ORDERING: &str = "-created_at";
const MEAL_SEARCH: &[&str] = &["name", "description"];

pub const LINE_ORDERING: &[&str] = &["created_at", "quantity"];
pub const LINE_DEFAULT_ORDERING: &str = "-created_at";

/// Meals are owned through their diet.
const OWNED_MEAL: &str = "diet_id IN (SELECT id FROM diets WHERE user_id = ";
/// Lines are owned through meal and diet.
const OWNED_LINE: &str = "meal_id IN (SELECT m.id FROM meals m JOIN diets d ON d.id = m.diet_id \
     WHERE d.user_id = ";

fn push_meal_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    user_id: Uuid,
    f: &MealFilter,
    search: Option<&str>,
) {
    qb.push(" WHERE ")
        .push(OWNED_MEAL)
        .push_bind(user_id)
        .push(")");
    if let Some(diet) = f.diet {
        qb.push(" AND diet_id = ").push_bind(diet);
    }
    if let Some(meal_type) = f.meal_type {
        qb.push(" AND meal_type = ").push_bind(meal_type.as_str());
    }
    if let Some(scheduled) = f.is_scheduled {
        qb.push(" AND is_scheduled = ").push_bind(scheduled);
    }
    if let Some(recurrence) = f.recurrence_type {
        qb.push(" AND recurrence_type = ")
            .push_bind(recurrence.as_str());
    }
    push_search(qb, MEAL_SEARCH, search);
}

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    filter: &MealFilter,
    search: Option<&str>,
    order: &str,
    page: PageRequest,
) -> anyhow::Result<(Vec<Meal>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM meals");
    push_meal_filters(&mut count, user_id, filter, search);
    let total = count
        .build_query_scalar::<i64>()
        .fetch_one(db)
        .await
        .context("count meals")?;

    let mut qb = QueryBuilder::new(format!("SELECT {MEAL_COLUMNS} FROM meals"));
    push_meal_filters(&mut qb, user_id, filter, search);
    qb.push(format!(" ORDER BY {order}"))
        .push(" LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);
    let rows = qb
        .build_query_as::<Meal>()
        .fetch_all(db)
        .await
        .context("list meals")?;
    Ok((rows, total))
}

pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Meal>> {
    let row = sqlx::query_as::<_, Meal>(&format!(
        "SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1 AND {OWNED_MEAL}$2)"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get meal")?;
    Ok(row)
}

pub async fn is_owned(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let found: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS (SELECT 1 FROM meals WHERE id = $1 AND {OWNED_MEAL}$2))"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_one(db)
    .await
    .context("meal owned")?;
    Ok(found)
}

/// Caller must already have checked that `input.diet` is theirs.
pub async fn insert(db: &PgPool, input: &MealInput) -> anyhow::Result<Meal> {
    let row = sqlx::query_as::<_, Meal>(&format!(
        r#"
        INSERT INTO meals (diet_id, name, description, meal_type, is_scheduled, start_date,
                           end_date, start_time, duration_minutes, recurrence_type,
                           recurrence_until, google_calendar_event_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {MEAL_COLUMNS}
        "#
    ))
    .bind(input.diet)
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.meal_type.as_str())
    .bind(input.is_scheduled)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(input.start_time)
    .bind(input.duration_minutes)
    .bind(input.recurrence_type.as_str())
    .bind(input.recurrence_until)
    .bind(&input.google_calendar_event_id)
    .fetch_one(db)
    .await
    .context("insert meal")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &MealInput,
) -> anyhow::Result<Option<Meal>> {
    let row = sqlx::query_as::<_, Meal>(&format!(
        r#"
        UPDATE meals
           SET diet_id = $3, name = $4, description = $5, meal_type = $6, is_scheduled = $7,
               start_date = $8, end_date = $9, start_time = $10, duration_minutes = $11,
               recurrence_type = $12, recurrence_until = $13, google_calendar_event_id = $14,
               updated_at = now()
         WHERE id = $1 AND {OWNED_MEAL}$2)
        RETURNING {MEAL_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(input.diet)
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.meal_type.as_str())
    .bind(input.is_scheduled)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(input.start_time)
    .bind(input.duration_minutes)
    .bind(input.recurrence_type.as_str())
    .bind(input.recurrence_until)
    .bind(&input.google_calendar_event_id)
    .fetch_optional(db)
    .await
    .context("update meal")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(&format!(
        "DELETE FROM meals WHERE id = $1 AND {OWNED_MEAL}$2)"
    ))
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await
    .context("delete meal")?;
    Ok(res.rows_affected() > 0)
}

/// Quantities and per-100 facts for every line of the given meals.
pub async fn ingredient_lines(db: &PgPool, meal_ids: &[Uuid]) -> anyhow::Result<Vec<IngredientLine>> {
    if meal_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, IngredientLine>(
        r#"
        SELECT mi.meal_id, mi.quantity, i.calories, i.proteins, i.fats, i.carbs
          FROM meal_ingredients mi
          JOIN ingredients i ON i.id = mi.ingredient_id
         WHERE mi.meal_id = ANY($1)
        "#,
    )
    .bind(meal_ids)
    .fetch_all(db)
    .await
    .context("ingredient lines")?;
    Ok(rows)
}

pub async fn lines_of_meal(db: &PgPool, meal_id: Uuid) -> anyhow::Result<Vec<MealIngredient>> {
    let rows = sqlx::query_as::<_, MealIngredient>(&format!(
        "SELECT {LINE_COLUMNS} FROM meal_ingredients WHERE meal_id = $1 ORDER BY created_at, id"
    ))
    .bind(meal_id)
    .fetch_all(db)
    .await
    .context("lines of meal")?;
    Ok(rows)
}

fn push_line_filters(qb: &mut QueryBuilder<'_, Postgres>, user_id: Uuid, f: &LineFilter) {
    qb.push(" WHERE ")
        .push(OWNED_LINE)
        .push_bind(user_id)
        .push(")");
    if let Some(meal) = f.meal {
        qb.push(" AND meal_id = ").push_bind(meal);
    }
    if let Some(ingredient) = f.ingredient {
        qb.push(" AND ingredient_id = ").push_bind(ingredient);
    }
}

pub async fn list_lines(
    db: &PgPool,
    user_id: Uuid,
    filter: &LineFilter,
    order: &str,
    page: PageRequest,
) -> anyhow::Result<(Vec<MealIngredient>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM meal_ingredients");
    push_line_filters(&mut count, user_id, filter);
    let total = count
        .build_query_scalar::<i64>()
        .fetch_one(db)
        .await
        .context("count meal ingredients")?;

    let mut qb = QueryBuilder::new(format!("SELECT {LINE_COLUMNS} FROM meal_ingredients"));
    push_line_filters(&mut qb, user_id, filter);
    qb.push(format!(" ORDER BY {order}"))
        .push(" LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);
    let rows = qb
        .build_query_as::<MealIngredient>()
        .fetch_all(db)
        .await
        .context("list meal ingredients")?;
    Ok((rows, total))
}

pub async fn get_line(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<MealIngredient>> {
    let row = sqlx::query_as::<_, MealIngredient>(&format!(
        "SELECT {LINE_COLUMNS} FROM meal_ingredients WHERE id = $1 AND {OWNED_LINE}$2)"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get meal ingredient")?;
    Ok(row)
}

/// Caller must already have checked the meal and ingredient references.
pub async fn insert_line<'e, E>(ex: E, meal_id: Uuid, input: &LineInput) -> anyhow::Result<MealIngredient>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, MealIngredient>(&format!(
        r#"
        INSERT INTO meal_ingredients (meal_id, ingredient_id, barcode, quantity, unit)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {LINE_COLUMNS}
        "#
    ))
    .bind(meal_id)
    .bind(input.ingredient)
    .bind(&input.barcode)
    .bind(input.quantity)
    .bind(&input.unit)
    .fetch_one(ex)
    .await
    .context("insert meal ingredient")?;
    Ok(row)
}

pub async fn update_line(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    meal_id: Uuid,
    input: &LineInput,
) -> anyhow::Result<Option<MealIngredient>> {
    let row = sqlx::query_as::<_, MealIngredient>(&format!(
        r#"
        UPDATE meal_ingredients
           SET meal_id = $3, ingredient_id = $4, barcode = $5, quantity = $6, unit = $7
         WHERE id = $1 AND {OWNED_LINE}$2)
        RETURNING {LINE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(meal_id)
    .bind(input.ingredient)
    .bind(&input.barcode)
    .bind(input.quantity)
    .bind(&input.unit)
    .fetch_optional(db)
    .await
    .context("update meal ingredient")?;
    Ok(row)
}

pub async fn delete_line(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(&format!(
        "DELETE FROM meal_ingredients WHERE id = $1 AND {OWNED_LINE}$2)"
    ))
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await
    .context("delete meal ingredient")?;
    Ok(res.rows_affected() > 0)
}
