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
    dto::{IngredientFilter, IngredientInput, IngredientPatch, SearchQuery, SEARCH_LIMIT},
    repo,
    repo_types::{Ingredient, IngredientHit},
};
use crate::{
    auth::AuthUser,
    categories,
    error::AppError,
    extract::{JsonBody, QueryParams, ValidJson},
    pagination::{order_clause, ListParams, Page},
    state::AppState,
};

pub fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list).post(create))
        .route("/ingredients/search", get(search))
        .route("/ingredients/personal", get(personal))
        .route(
            "/ingredients/:id",
            get(retrieve).put(replace).patch(update).delete(destroy),
        )
}

async fn check_category(state: &AppState, input: &IngredientInput) -> Result<(), AppError> {
    if let Some(category) = input.category {
        if !categories::repo::exists(&state.db, category).await? {
            return Err(AppError::field("category", "Category does not exist."));
        }
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(params): QueryParams<ListParams>,
    QueryParams(filter): QueryParams<IngredientFilter>,
) -> Result<Json<Page<Ingredient>>, AppError> {
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
    ValidJson(payload): ValidJson<IngredientInput>,
) -> Result<(StatusCode, Json<Ingredient>), AppError> {
    check_category(&state, &payload).await?;
    let ingredient = repo::insert(&state.db, user_id, &payload).await?;
    info!(%user_id, ingredient_id = %ingredient.id, "personal ingredient created");
    Ok((StatusCode::CREATED, Json(ingredient)))
}

#[instrument(skip(state))]
pub async fn retrieve(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Ingredient>, AppError> {
    let ingredient = repo::get_visible(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Ingredient"))?;
    Ok(Json(ingredient))
}

#[instrument(skip(state, payload))]
pub async fn replace(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<IngredientInput>,
) -> Result<Json<Ingredient>, AppError> {
    check_category(&state, &payload).await?;
    let ingredient = repo::update(&state.db, user_id, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Ingredient"))?;
    info!(%user_id, ingredient_id = %id, "ingredient replaced");
    Ok(Json(ingredient))
}

#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(patch): JsonBody<IngredientPatch>,
) -> Result<Json<Ingredient>, AppError> {
    let current = repo::get_owned(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Ingredient"))?;
    let input = patch.apply(&current);
    input.validate()?;
    check_category(&state, &input).await?;

    let ingredient = repo::update(&state.db, user_id, id, &input)
        .await?
        .ok_or(AppError::NotFound("Ingredient"))?;
    info!(%user_id, ingredient_id = %id, "ingredient updated");
    Ok(Json(ingredient))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Ingredient"));
    }
    info!(%user_id, ingredient_id = %id, "ingredient deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Autocomplete over name and description (`?q=`, at least two characters).
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<Vec<IngredientHit>>, AppError> {
    let Some(term) = query.term() else {
        warn!(%user_id, "ingredient search query too short");
        return Err(AppError::BadRequest(
            "Query must be at least 2 characters".into(),
        ));
    };
    let hits = repo::search(&state.db, user_id, term, SEARCH_LIMIT).await?;
    Ok(Json(hits))
}

#[instrument(skip(state))]
pub async fn personal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Ingredient>>, AppError> {
    Ok(Json(repo::personal(&state.db, user_id).await?))
}
