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
        BulkMeasurementsRequest, MeasurementFilter, MeasurementInput, MeasurementOut,
        MeasurementPatch, MetricQuery, Summary, TrendQuery, TrendResponse,
    },
    repo, services,
};
use crate::{
    auth::AuthUser,
    bulk::validate_batch,
    choices::Metric,
    error::AppError,
    extract::{JsonBody, QueryParams, ValidJson},
    pagination::{order_clause, ListParams, Page},
    state::AppState,
};

pub fn measurement_routes() -> Router<AppState> {
    Router::new()
        .route("/measurements", get(list).post(create))
        .route("/measurements/latest", get(latest))
        .route("/measurements/by_metric", get(by_metric))
        .route("/measurements/trends", get(trends))
        .route("/measurements/summary", get(summary))
        .route("/measurements/bulk_create", post(bulk_create))
        .route(
            "/measurements/:id",
            get(retrieve).put(replace).patch(update).delete(destroy),
        )
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(params): QueryParams<ListParams>,
    QueryParams(filter): QueryParams<MeasurementFilter>,
) -> Result<Json<Page<MeasurementOut>>, AppError> {
    let page = params.page_request(state.config.page_size)?;
    let order = order_clause(
        params.ordering.as_deref(),
        repo::ORDERING,
        repo::DEFAULT_ORDERING,
    )?;
    let (rows, count) = repo::list(&state.db, user_id, &filter, &order, page).await?;
    Ok(Json(Page::new(rows, count, page).map(MeasurementOut::from)))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(payload): ValidJson<MeasurementInput>,
) -> Result<(StatusCode, Json<MeasurementOut>), AppError> {
    let row = repo::insert(&state.db, user_id, &payload).await?;
    info!(%user_id, measurement_id = %row.id, metric = %row.metric, "measurement recorded");
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip(state))]
pub async fn retrieve(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MeasurementOut>, AppError> {
    let row = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Measurement"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, payload))]
pub async fn replace(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<MeasurementInput>,
) -> Result<Json<MeasurementOut>, AppError> {
    let row = repo::update(&state.db, user_id, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Measurement"))?;
    info!(%user_id, measurement_id = %id, "measurement replaced");
    Ok(Json(row.into()))
}

#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(patch): JsonBody<MeasurementPatch>,
) -> Result<Json<MeasurementOut>, AppError> {
    let current = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Measurement"))?;
    let input = patch.apply(&current);
    input.validate()?;

    let row = repo::update(&state.db, user_id, id, &input)
        .await?
        .ok_or(AppError::NotFound("Measurement"))?;
    info!(%user_id, measurement_id = %id, "measurement updated");
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Measurement"));
    }
    info!(%user_id, measurement_id = %id, "measurement deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Newest measurement for each requested metric (`?metrics=a&metrics=b`).
#[instrument(skip(state))]
pub async fn latest(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(pairs): QueryParams<Vec<(String, String)>>,
) -> Result<Json<Vec<MeasurementOut>>, AppError> {
    let metrics = services::requested_metrics(&pairs)?;
    let rows = repo::latest_per_metric(&state.db, user_id, &metrics).await?;
    let rows = services::order_latest(rows, &metrics);
    Ok(Json(rows.into_iter().map(MeasurementOut::from).collect()))
}

#[instrument(skip(state))]
pub async fn by_metric(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(query): QueryParams<MetricQuery>,
) -> Result<Json<Vec<MeasurementOut>>, AppError> {
    let Some(metric) = query.metric else {
        warn!(%user_id, "by_metric without metric");
        return Err(AppError::BadRequest("metric parameter is required".into()));
    };
    let rows = repo::by_metric(&state.db, user_id, metric).await?;
    Ok(Json(rows.into_iter().map(MeasurementOut::from).collect()))
}

#[instrument(skip(state))]
pub async fn trends(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(query): QueryParams<TrendQuery>,
) -> Result<Json<TrendResponse>, AppError> {
    let metric = query.metric.unwrap_or(Metric::WeightKg);
    let days = query.days.unwrap_or(services::DEFAULT_TREND_DAYS);
    let (start, end) = services::trend_window(services::today(), days)?;

    let rows = repo::in_window(&state.db, user_id, metric, start, end).await?;
    let measurements = services::trend_points(&rows, start, end);
    Ok(Json(TrendResponse {
        metric,
        period_days: days,
        start_date: start,
        end_date: end,
        count: measurements.len(),
        measurements,
    }))
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Summary>, AppError> {
    let rows = repo::latest_per_metric(&state.db, user_id, &services::SUMMARY_METRICS).await?;
    Ok(Json(services::summarize(&rows)))
}

#[instrument(skip(state, payload))]
pub async fn bulk_create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<BulkMeasurementsRequest>,
) -> Result<(StatusCode, Json<Vec<MeasurementOut>>), AppError> {
    let inputs: Vec<MeasurementInput> =
        validate_batch("measurements", payload.measurements).map_err(|e| {
            warn!(%user_id, "bulk measurements rejected");
            e
        })?;

    let mut tx = state.db.begin().await?;
    let mut created = Vec::with_capacity(inputs.len());
    for input in &inputs {
        created.push(repo::insert(&mut *tx, user_id, input).await?);
    }
    tx.commit().await?;

    info!(%user_id, count = created.len(), "bulk measurements created");
    Ok((
        StatusCode::CREATED,
        Json(created.into_iter().map(MeasurementOut::from).collect()),
    ))
}
