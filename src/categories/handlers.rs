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
    dto::{CategoryFilter, CategoryInput, CategoryPatch},
    repo,
    repo_types::Category,
};
use crate::{
    auth::AuthUser,
    error::AppError,
    extract::{JsonBody, QueryParams, ValidJson},
    pagination::{order_clause, ListParams, Page},
    state::AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list).post(create))
        .route(
            "/categories/:id",
            get(retrieve).put(replace).patch(update).delete(destroy),
        )
}

/// Parent must exist and, for an existing category, must not sit in its own subtree.
async fn check_parent(
    state: &AppState,
    id: Option<Uuid>,
    input: &CategoryInput,
) -> Result<(), AppError> {
    let Some(parent) = input.parent else {
        return Ok(());
    };
    if !repo::exists(&state.db, parent).await? {
        return Err(AppError::field("parent", "Category does not exist."));
    }
    if let Some(id) = id {
        if repo::is_descendant(&state.db, id, parent).await? {
            warn!(category_id = %id, %parent, "category parent would form a cycle");
            return Err(AppError::field(
                "parent",
                "A category cannot be nested under itself.",
            ));
        }
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    QueryParams(params): QueryParams<ListParams>,
    QueryParams(filter): QueryParams<CategoryFilter>,
) -> Result<Json<Page<Category>>, AppError> {
    let page = params.page_request(state.config.page_size)?;
    let order = order_clause(params.ordering.as_deref(), repo::ORDERING, repo::DEFAULT_ORDERING)?;
    let (rows, count) = repo::list(&state.db, &filter, params.search_term(), &order, page).await?;
    Ok(Json(Page::new(rows, count, page)))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(payload): ValidJson<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    check_parent(&state, None, &payload).await?;
    let category = repo::insert(&state.db, &payload).await?;
    info!(%user_id, category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state))]
pub async fn retrieve(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, AppError> {
    let category = repo::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Category"))?;
    Ok(Json(category))
}

#[instrument(skip(state, payload))]
pub async fn replace(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<CategoryInput>,
) -> Result<Json<Category>, AppError> {
    check_parent(&state, Some(id), &payload).await?;
    let category = repo::update(&state.db, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Category"))?;
    info!(%user_id, category_id = %id, "category replaced");
    Ok(Json(category))
}

#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(patch): JsonBody<CategoryPatch>,
) -> Result<Json<Category>, AppError> {
    let current = repo::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Category"))?;
    let input = patch.apply(&current);
    input.validate()?;
    check_parent(&state, Some(id), &input).await?;

    let category = repo::update(&state.db, id, &input)
        .await?
        .ok_or(AppError::NotFound("Category"))?;
    info!(%user_id, category_id = %id, "category updated");
    Ok(Json(category))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Category"));
    }
    info!(%user_id, category_id = %id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
