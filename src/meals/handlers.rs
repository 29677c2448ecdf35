use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::{
    dto::{
        BulkLinesRequest, LineFilter, LineInput, LinePatch, MealFilter, MealInput, MealPatch,
        NutritionSummary,
    },
    repo,
    repo_types::{Meal, MealIngredient},
    services::meal_totals,
};
use crate::{
    auth::AuthUser,
    bulk::validate_batch,
    diets,
    error::AppError,
    extract::{JsonBody, QueryParams, ValidJson},
    ingredients,
    pagination::{order_clause, ListParams, Page},
    state::AppState,
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list).post(create))
        .route(
            "/meals/:id",
            get(retrieve).put(replace).patch(update).delete(destroy),
        )
        .route("/meals/:id/ingredients", get(ingredients_of))
        .route("/meals/:id/add_ingredient", post(add_ingredient))
        .route("/meals/:id/bulk_add_ingredients", post(bulk_add_ingredients))
        .route("/meals/:id/nutrition_summary", get(nutrition_summary))
}

pub fn line_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-ingredients", get(list_lines).post(create_line))
        .route(
            "/meal-ingredients/:id",
            get(retrieve_line)
                .put(replace_line)
                .patch(update_line)
                .delete(destroy_line),
        )
}

async fn check_diet(state: &AppState, user_id: Uuid, input: &MealInput) -> Result<(), AppError> {
    if !diets::repo::is_owned(&state.db, user_id, input.diet).await? {
        warn!(%user_id, diet_id = %input.diet, "meal references foreign diet");
        return Err(AppError::field("diet", "Diet does not exist."));
    }
    Ok(())
}

async fn load_meal(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Meal, AppError> {
    repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Meal"))
}

async fn check_ingredient(
    state: &AppState,
    user_id: Uuid,
    field: &str,
    ingredient: Uuid,
) -> Result<(), AppError> {
    if !ingredients::repo::is_visible(&state.db, user_id, ingredient).await? {
        return Err(AppError::field(field, "Ingredient does not exist."));
    }
    Ok(())
}

/// Meal the line points at; it must be one of the caller's.
async fn line_meal(state: &AppState, user_id: Uuid, input: &LineInput) -> Result<Uuid, AppError> {
    let meal = input
        .meal
        .ok_or_else(|| AppError::field("meal", "This field is required."))?;
    if !repo::is_owned(&state.db, user_id, meal).await? {
        return Err(AppError::field("meal", "Meal does not exist."));
    }
    Ok(meal)
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(params): QueryParams<ListParams>,
    QueryParams(filter): QueryParams<MealFilter>,
) -> Result<Json<Page<Meal>>, AppError> {
    let page = params.page_request(state.config.page_size)?;
    let order = order_clause(
        params.ordering.as_deref(),
        repo::MEAL_ORDERING,
        repo::MEAL_DEFAULT_ORDERING,
    )?;
    let (rows, count) =
        repo::list(&state.db, user_id, &filter, params.search_term(), &order, page).await?;
    Ok(Json(Page::new(rows, count, page)))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(payload): ValidJson<MealInput>,
) -> Result<(StatusCode, Json<Meal>), AppError> {
    check_diet(&state, user_id, &payload).await?;
    let meal = repo::insert(&state.db, &payload).await?;
    info!(%user_id, meal_id = %meal.id, diet_id = %meal.diet_id, "meal created");
    Ok((StatusCode::CREATED, Json(meal)))
}

#[instrument(skip(state))]
pub async fn retrieve(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Meal>, AppError> {
    Ok(Json(load_meal(&state, user_id, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn replace(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<MealInput>,
) -> Result<Json<Meal>, AppError> {
    load_meal(&state, user_id, id).await?;
    check_diet(&state, user_id, &payload).await?;
    let meal = repo::update(&state.db, user_id, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Meal"))?;
    info!(%user_id, meal_id = %id, "meal replaced");
    Ok(Json(meal))
}

#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(patch): JsonBody<MealPatch>,
) -> Result<Json<Meal>, AppError> {
    let current = load_meal(&state, user_id, id).await?;
    let input = patch.apply(&current);
    input.validate()?;
    check_diet(&state, user_id, &input).await?;

    let meal = repo::update(&state.db, user_id, id, &input)
        .await?
        .ok_or(AppError::NotFound("Meal"))?;
    info!(%user_id, meal_id = %id, "meal updated");
    Ok(Json(meal))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Meal"));
    }
    info!(%user_id, meal_id = %id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn ingredients_of(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MealIngredient>>, AppError> {
    let meal = load_meal(&state, user_id, id).await?;
    Ok(Json(repo::lines_of_meal(&state.db, meal.id).await?))
}

#[instrument(skip(state, payload))]
pub async fn add_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<LineInput>,
) -> Result<(StatusCode, Json<MealIngredient>), AppError> {
    let meal = load_meal(&state, user_id, id).await?;
    check_ingredient(&state, user_id, "ingredient", payload.ingredient).await?;

    let line = repo::insert_line(&state.db, meal.id, &payload).await?;
    info!(%user_id, meal_id = %meal.id, line_id = %line.id, "ingredient added to meal");
    Ok((StatusCode::CREATED, Json(line)))
}

/// Every line is validated before the first insert; inserts share one transaction.
#[instrument(skip(state, payload))]
pub async fn bulk_add_ingredients(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<BulkLinesRequest>,
) -> Result<(StatusCode, Json<Vec<MealIngredient>>), AppError> {
    let meal = load_meal(&state, user_id, id).await?;
    let lines: Vec<LineInput> = validate_batch("ingredients", payload.ingredients)?;
    for (index, line) in lines.iter().enumerate() {
        let field = format!("ingredients[{index}].ingredient");
        check_ingredient(&state, user_id, &field, line.ingredient)
            .await
            .map_err(|e| {
                warn!(%user_id, meal_id = %meal.id, index, "bulk line rejected");
                e
            })?;
    }

    let mut tx = state.db.begin().await?;
    let mut created = Vec::with_capacity(lines.len());
    for line in &lines {
        created.push(repo::insert_line(&mut *tx, meal.id, line).await?);
    }
    tx.commit().await?;

    info!(%user_id, meal_id = %meal.id, count = created.len(), "bulk ingredients added");
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state))]
pub async fn nutrition_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<NutritionSummary>, AppError> {
    let meal = load_meal(&state, user_id, id).await?;
    let lines = repo::ingredient_lines(&state.db, &[meal.id]).await?;
    Ok(Json(NutritionSummary::new(meal_totals(&lines), lines.len())))
}

#[instrument(skip(state))]
pub async fn list_lines(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(params): QueryParams<ListParams>,
    QueryParams(filter): QueryParams<LineFilter>,
) -> Result<Json<Page<MealIngredient>>, AppError> {
    let page = params.page_request(state.config.page_size)?;
    let order = order_clause(
        params.ordering.as_deref(),
        repo::LINE_ORDERING,
        repo::LINE_DEFAULT_ORDERING,
    )?;
    let (rows, count) = repo::list_lines(&state.db, user_id, &filter, &order, page).await?;
    Ok(Json(Page::new(rows, count, page)))
}

#[instrument(skip(state, payload))]
pub async fn create_line(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(payload): ValidJson<LineInput>,
) -> Result<(StatusCode, Json<MealIngredient>), AppError> {
    let meal_id = line_meal(&state, user_id, &payload).await?;
    check_ingredient(&state, user_id, "ingredient", payload.ingredient).await?;

    let line = repo::insert_line(&state.db, meal_id, &payload).await?;
    info!(%user_id, %meal_id, line_id = %line.id, "meal ingredient created");
    Ok((StatusCode::CREATED, Json(line)))
}

#[instrument(skip(state))]
pub async fn retrieve_line(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealIngredient>, AppError> {
    let line = repo::get_line(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Meal ingredient"))?;
    Ok(Json(line))
}

#[instrument(skip(state, payload))]
pub async fn replace_line(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<LineInput>,
) -> Result<Json<MealIngredient>, AppError> {
    repo::get_line(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Meal ingredient"))?;
    let meal_id = line_meal(&state, user_id, &payload).await?;
    check_ingredient(&state, user_id, "ingredient", payload.ingredient).await?;

    let line = repo::update_line(&state.db, user_id, id, meal_id, &payload)
        .await?
        .ok_or(AppError::NotFound("Meal ingredient"))?;
    info!(%user_id, line_id = %id, "meal ingredient replaced");
    Ok(Json(line))
}

#[instrument(skip(state, patch))]
pub async fn update_line(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(patch): JsonBody<LinePatch>,
) -> Result<Json<MealIngredient>, AppError> {
    let current = repo::get_line(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Meal ingredient"))?;
    let input = patch.apply(&current);
    input.validate()?;
    let meal_id = line_meal(&state, user_id, &input).await?;
    check_ingredient(&state, user_id, "ingredient", input.ingredient).await?;

    let line = repo::update_line(&state.db, user_id, id, meal_id, &input)
        .await?
        .ok_or(AppError::NotFound("Meal ingredient"))?;
    info!(%user_id, line_id = %id, "meal ingredient updated");
    Ok(Json(line))
}

#[instrument(skip(state))]
pub async fn destroy_line(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete_line(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Meal ingredient"));
    }
    info!(%user_id, line_id = %id, "meal ingredient deleted");
    Ok(StatusCode::NO_CONTENT)
}
