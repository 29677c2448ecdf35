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
    dto::{PreferenceFilter, PreferenceInput, PreferenceOut, PreferencePatch, TypeQuery},
    repo,
};
use crate::{
    auth::AuthUser,
    error::AppError,
    extract::{JsonBody, QueryParams, ValidJson},
    ingredients,
    pagination::{order_clause, ListParams, Page},
    state::AppState,
};

pub fn preference_routes() -> Router<AppState> {
    Router::new()
        .route("/preferences", get(list).post(create))
        .route("/preferences/by_type", get(by_type))
        .route(
            "/preferences/:id",
            get(retrieve).put(replace).patch(update).delete(destroy),
        )
}

async fn check_ingredient(
    state: &AppState,
    user_id: Uuid,
    input: &PreferenceInput,
) -> Result<(), AppError> {
    if !ingredients::repo::is_visible(&state.db, user_id, input.ingredient).await? {
        warn!(%user_id, ingredient_id = %input.ingredient, "preference references hidden ingredient");
        return Err(AppError::field("ingredient", "Ingredient does not exist."));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(params): QueryParams<ListParams>,
    QueryParams(filter): QueryParams<PreferenceFilter>,
) -> Result<Json<Page<PreferenceOut>>, AppError> {
    let page = params.page_request(state.config.page_size)?;
    let order = order_clause(
        params.ordering.as_deref(),
        repo::ORDERING,
        repo::DEFAULT_ORDERING,
    )?;
    let (rows, count) =
        repo::list(&state.db, user_id, &filter, params.search_term(), &order, page).await?;
    Ok(Json(Page::new(rows, count, page).map(PreferenceOut::from)))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(payload): ValidJson<PreferenceInput>,
) -> Result<(StatusCode, Json<PreferenceOut>), AppError> {
    check_ingredient(&state, user_id, &payload).await?;
    let row = repo::insert(&state.db, user_id, &payload).await?;
    info!(%user_id, preference_id = %row.id, kind = %row.preference_type, "preference created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip(state))]
pub async fn retrieve(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PreferenceOut>, AppError> {
    let row = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Meal preference"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, payload))]
pub async fn replace(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<PreferenceInput>,
) -> Result<Json<PreferenceOut>, AppError> {
    check_ingredient(&state, user_id, &payload).await?;
    let row = repo::update(&state.db, user_id, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Meal preference"))?;
    info!(%user_id, preference_id = %id, "preference replaced");
    Ok(Json(row.into()))
}

#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(patch): JsonBody<PreferencePatch>,
) -> Result<Json<PreferenceOut>, AppError> {
    let current = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Meal preference"))?;
    let input = patch.apply(&current);
    input.validate()?;
    check_ingredient(&state, user_id, &input).await?;

    let row = repo::update(&state.db, user_id, id, &input)
        .await?
        .ok_or(AppError::NotFound("Meal preference"))?;
    info!(%user_id, preference_id = %id, "preference updated");
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Meal preference"));
    }
    info!(%user_id, preference_id = %id, "preference deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `?type=allergy`; without `type` every preference is returned.
#[instrument(skip(state))]
pub async fn by_type(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(query): QueryParams<TypeQuery>,
) -> Result<Json<Vec<PreferenceOut>>, AppError> {
    let rows = repo::by_type(&state.db, user_id, query.preference_type).await?;
    Ok(Json(rows.into_iter().map(PreferenceOut::from).collect()))
}
