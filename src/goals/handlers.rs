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
    dto::{GoalFilter, GoalInput, GoalOut, GoalPatch, Progress, Status, TypeQuery},
    repo,
    repo_types::Goal,
    services::{self, PROGRESS_METRICS},
};
use crate::{
    activation::{self, Exclusive},
    auth::AuthUser,
    error::AppError,
    extract::{JsonBody, QueryParams, ValidJson},
    measurements::{self, services::today},
    pagination::{order_clause, ListParams, Page},
    state::AppState,
};

pub fn goal_routes() -> Router<AppState> {
    Router::new()
        .route("/goals", get(list).post(create))
        .route("/goals/active", get(active))
        .route("/goals/by_type", get(by_type))
        .route("/goals/upcoming", get(upcoming))
        .route("/goals/overdue", get(overdue))
        .route(
            "/goals/:id",
            get(retrieve).put(replace).patch(update).delete(destroy),
        )
        .route("/goals/:id/activate", post(activate))
        .route("/goals/:id/deactivate", post(deactivate))
        .route("/goals/:id/progress", get(progress))
}

fn render(rows: Vec<Goal>) -> Vec<GoalOut> {
    let today = today();
    rows.into_iter().map(|g| GoalOut::new(g, today)).collect()
}

async fn load(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Goal, AppError> {
    repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Goal"))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(params): QueryParams<ListParams>,
    QueryParams(filter): QueryParams<GoalFilter>,
) -> Result<Json<Page<GoalOut>>, AppError> {
    let page = params.page_request(state.config.page_size)?;
    let order = order_clause(params.ordering.as_deref(), repo::ORDERING, repo::DEFAULT_ORDERING)?;
    let (rows, count) =
        repo::list(&state.db, user_id, &filter, params.search_term(), &order, page).await?;
    let today = today();
    Ok(Json(Page::new(rows, count, page).map(|g| GoalOut::new(g, today))))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(payload): ValidJson<GoalInput>,
) -> Result<(StatusCode, Json<GoalOut>), AppError> {
    let goal = repo::insert(&state.db, user_id, &payload).await?;
    info!(%user_id, goal_id = %goal.id, goal_type = %goal.goal_type, "goal created");
    Ok((StatusCode::CREATED, Json(GoalOut::new(goal, today()))))
}

#[instrument(skip(state))]
pub async fn retrieve(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalOut>, AppError> {
    let goal = load(&state, user_id, id).await?;
    Ok(Json(GoalOut::new(goal, today())))
}

#[instrument(skip(state, payload))]
pub async fn replace(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<GoalInput>,
) -> Result<Json<GoalOut>, AppError> {
    let goal = repo::update(&state.db, user_id, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Goal"))?;
    info!(%user_id, goal_id = %id, "goal replaced");
    Ok(Json(GoalOut::new(goal, today())))
}

#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(patch): JsonBody<GoalPatch>,
) -> Result<Json<GoalOut>, AppError> {
    let current = load(&state, user_id, id).await?;
    let input = patch.apply(&current);
    input.validate()?;

    let goal = repo::update(&state.db, user_id, id, &input)
        .await?
        .ok_or(AppError::NotFound("Goal"))?;
    info!(%user_id, goal_id = %id, "goal updated");
    Ok(Json(GoalOut::new(goal, today())))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Goal"));
    }
    info!(%user_id, goal_id = %id, "goal deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn activate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Status>, AppError> {
    if !activation::activate(&state.db, Exclusive::Goals, user_id, id).await? {
        warn!(%user_id, goal_id = %id, "activate on unknown goal");
        return Err(AppError::NotFound("Goal"));
    }
    info!(%user_id, goal_id = %id, "goal activated");
    Ok(Json(Status {
        status: "goal activated",
    }))
}

#[instrument(skip(state))]
pub async fn deactivate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Status>, AppError> {
    if !activation::deactivate(&state.db, Exclusive::Goals, user_id, id).await? {
        return Err(AppError::NotFound("Goal"));
    }
    info!(%user_id, goal_id = %id, "goal deactivated");
    Ok(Json(Status {
        status: "goal deactivated",
    }))
}

#[instrument(skip(state))]
pub async fn active(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<GoalOut>>, AppError> {
    Ok(Json(render(repo::active(&state.db, user_id).await?)))
}

#[instrument(skip(state))]
pub async fn by_type(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(query): QueryParams<TypeQuery>,
) -> Result<Json<Vec<GoalOut>>, AppError> {
    Ok(Json(render(
        repo::by_type(&state.db, user_id, query.goal_type).await?,
    )))
}

#[instrument(skip(state))]
pub async fn upcoming(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<GoalOut>>, AppError> {
    Ok(Json(render(
        repo::upcoming(&state.db, user_id, today()).await?,
    )))
}

#[instrument(skip(state))]
pub async fn overdue(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<GoalOut>>, AppError> {
    Ok(Json(render(repo::overdue(&state.db, user_id, today()).await?)))
}

#[instrument(skip(state))]
pub async fn progress(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Progress>, AppError> {
    let goal = load(&state, user_id, id).await?;
    let (count, first, last) =
        measurements::repo::span(&state.db, user_id, &PROGRESS_METRICS).await?;
    Ok(Json(services::progress(
        GoalOut::new(goal, today()),
        count,
        first,
        last,
    )))
}
