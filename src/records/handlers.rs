use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::{
    dto::{RangeQuery, RangeSummary, RecordFilter, RecordInput, RecordPatch},
    repo,
    repo_types::MealRecord,
    services,
};
use crate::{
    auth::AuthUser,
    error::AppError,
    extract::{JsonBody, QueryParams, ValidJson},
    meals::{self, services::totals_by_meal},
    measurements::services::today,
    pagination::{order_clause, ListParams, Page},
    state::AppState,
};

pub fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/records", get(list).post(create))
        .route("/records/today", get(today_records))
        .route("/records/nutrition_summary", get(nutrition_summary))
        .route(
            "/records/:id",
            get(retrieve).put(replace).patch(update).delete(destroy),
        )
}

async fn check_meal(state: &AppState, user_id: Uuid, input: &RecordInput) -> Result<(), AppError> {
    let Some(meal) = input.meal else {
        return Ok(());
    };
    if !meals::repo::is_owned(&state.db, user_id, meal).await? {
        warn!(%user_id, meal_id = %meal, "record references foreign meal");
        return Err(AppError::field("meal", "Meal does not exist."));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(params): QueryParams<ListParams>,
    QueryParams(filter): QueryParams<RecordFilter>,
) -> Result<Json<Page<MealRecord>>, AppError> {
    let page = params.page_request(state.config.page_size)?;
    let order = order_clause(
        params.ordering.as_deref(),
        repo::ORDERING,
        repo::DEFAULT_ORDERING,
    )?;
    let (rows, count) =
        repo::list(&state.db, user_id, &filter, params.search_term(), &order, page).await?;
    Ok(Json(Page::new(rows, count, page)))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(payload): ValidJson<RecordInput>,
) -> Result<(StatusCode, Json<MealRecord>), AppError> {
    check_meal(&state, user_id, &payload).await?;
    let row = repo::insert(&state.db, user_id, &payload).await?;
    info!(%user_id, record_id = %row.id, "meal record created");
    Ok((StatusCode::CREATED, Json(row)))
}

#[instrument(skip(state))]
pub async fn retrieve(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealRecord>, AppError> {
    let row = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Meal record"))?;
    Ok(Json(row))
}

#[instrument(skip(state, payload))]
pub async fn replace(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<RecordInput>,
) -> Result<Json<MealRecord>, AppError> {
    check_meal(&state, user_id, &payload).await?;
    let row = repo::update(&state.db, user_id, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Meal record"))?;
    info!(%user_id, record_id = %id, "meal record replaced");
    Ok(Json(row))
}

#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(patch): JsonBody<RecordPatch>,
) -> Result<Json<MealRecord>, AppError> {
    let current = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Meal record"))?;
    let input = patch.apply(&current);
    input.validate()?;
    check_meal(&state, user_id, &input).await?;

    let row = repo::update(&state.db, user_id, id, &input)
        .await?
        .ok_or(AppError::NotFound("Meal record"))?;
    info!(%user_id, record_id = %id, "meal record updated");
    Ok(Json(row))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Meal record"));
    }
    info!(%user_id, record_id = %id, "meal record deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn today_records(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MealRecord>>, AppError> {
    let day = today();
    let rows = repo::in_range(&state.db, user_id, day, day).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn nutrition_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(query): QueryParams<RangeQuery>,
) -> Result<Json<RangeSummary>, AppError> {
    let (start, end, period_days) = services::resolve_range(&query, today())?;

    let records = repo::in_range(&state.db, user_id, start, end).await?;
    let lines = meals::repo::ingredient_lines(&state.db, &services::linked_meals(&records)).await?;
    let totals = services::range_totals(&records, &totals_by_meal(&lines));

    Ok(Json(RangeSummary {
        period_days,
        start_date: start,
        end_date: end,
        total_calories: totals.calories,
        total_proteins: totals.proteins,
        total_fats: totals.fats,
        total_carbs: totals.carbs,
        record_count: records.len(),
    }))
}
