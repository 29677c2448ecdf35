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
    dto::{DietFilter, DietInput, DietPatch},
    repo,
    repo_types::Diet,
};
use crate::{
    activation::{self, Exclusive},
    auth::AuthUser,
    error::AppError,
    extract::{JsonBody, QueryParams, ValidJson},
    goals::dto::Status,
    pagination::{order_clause, ListParams, Page},
    state::AppState,
};

pub fn diet_routes() -> Router<AppState> {
    Router::new()
        .route("/diets", get(list).post(create))
        .route("/diets/active", get(active))
        .route(
            "/diets/:id",
            get(retrieve).put(replace).patch(update).delete(destroy),
        )
        .route("/diets/:id/activate", post(activate))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(params): QueryParams<ListParams>,
    QueryParams(filter): QueryParams<DietFilter>,
) -> Result<Json<Page<Diet>>, AppError> {
    let page = params.page_request(state.config.page_size)?;
    let order = order_clause(params.ordering.as_deref(), repo::ORDERING, repo::DEFAULT_ORDERING)?;
    let (rows, count) =
        repo::list(&state.db, user_id, &filter, params.search_term(), &order, page).await?;
    Ok(Json(Page::new(rows, count, page)))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(payload): ValidJson<DietInput>,
) -> Result<(StatusCode, Json<Diet>), AppError> {
    let diet = repo::insert(&state.db, user_id, &payload).await?;
    info!(%user_id, diet_id = %diet.id, "diet created");
    Ok((StatusCode::CREATED, Json(diet)))
}

#[instrument(skip(state))]
pub async fn retrieve(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Diet>, AppError> {
    let diet = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Diet"))?;
    Ok(Json(diet))
}

#[instrument(skip(state, payload))]
pub async fn replace(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<DietInput>,
) -> Result<Json<Diet>, AppError> {
    let diet = repo::update(&state.db, user_id, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Diet"))?;
    info!(%user_id, diet_id = %id, "diet replaced");
    Ok(Json(diet))
}

#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(patch): JsonBody<DietPatch>,
) -> Result<Json<Diet>, AppError> {
    let current = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Diet"))?;
    let input = patch.apply(&current);
    input.validate()?;

    let diet = repo::update(&state.db, user_id, id, &input)
        .await?
        .ok_or(AppError::NotFound("Diet"))?;
    info!(%user_id, diet_id = %id, "diet updated");
    Ok(Json(diet))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Diet"));
    }
    info!(%user_id, diet_id = %id, "diet deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn activate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Status>, AppError> {
    if !activation::activate(&state.db, Exclusive::Diets, user_id, id).await? {
        warn!(%user_id, diet_id = %id, "activate on unknown diet");
        return Err(AppError::NotFound("Diet"));
    }
    info!(%user_id, diet_id = %id, "diet activated");
    Ok(Json(Status {
        status: "diet activated",
    }))
}

#[instrument(skip(state))]
pub async fn active(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Diet>, AppError> {
    let diet = repo::active(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("Active diet"))?;
    Ok(Json(diet))
}
