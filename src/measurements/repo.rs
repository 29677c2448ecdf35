use anyhow::Context;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{
    dto::{MeasurementFilter, MeasurementInput},
    repo_types::{BodyMeasurement, COLUMNS},
};
use crate::{choices::Metric, pagination::PageRequest};

pub const ORDERING: &[&str] = &["timestamp", "created_at", "value"];
pub const DEFAULT_ORDERING: &str = "-timestamp";

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, user_id: Uuid, f: &MeasurementFilter) {
    qb.push(" WHERE user_id = ").push_bind(user_id);
    if let Some(metric) = f.metric {
        qb.push(" AND metric = ").push_bind(metric.as_str());
    }
    if let Some(kind) = f.measurement_type {
        qb.push(" AND measurement_type = ").push_bind(kind.as_str());
    }
}

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    filter: &MeasurementFilter,
    order: &str,
    page: PageRequest,
) -> anyhow::Result<(Vec<BodyMeasurement>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM body_measurements");
    push_filters(&mut count, user_id, filter);
    let total = count
        .build_query_scalar::<i64>()
        .fetch_one(db)
        .await
        .context("count measurements")?;

    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM body_measurements"));
    push_filters(&mut qb, user_id, filter);
    qb.push(format!(" ORDER BY {order}"))
        .push(" LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);
    let rows = qb
        .build_query_as::<BodyMeasurement>()
        .fetch_all(db)
        .await
        .context("list measurements")?;
    Ok((rows, total))
}

pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<BodyMeasurement>> {
    let row = sqlx::query_as::<_, BodyMeasurement>(&format!(
        "SELECT {COLUMNS} FROM body_measurements WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get measurement")?;
    Ok(row)
}

pub async fn insert<'e, E>(
    ex: E,
    user_id: Uuid,
    input: &MeasurementInput,
) -> anyhow::Result<BodyMeasurement>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, BodyMeasurement>(&format!(
        r#"
        INSERT INTO body_measurements (user_id, metric, measurement_type, value, timestamp)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(input.metric.as_str())
    .bind(input.measurement_type.as_str())
    .bind(input.value)
    .bind(input.timestamp.unwrap_or_else(OffsetDateTime::now_utc))
    .fetch_one(ex)
    .await
    .context("insert measurement")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &MeasurementInput,
) -> anyhow::Result<Option<BodyMeasurement>> {
    let row = sqlx::query_as::<_, BodyMeasurement>(&format!(
        r#"
        UPDATE body_measurements
           SET metric = $3, measurement_type = $4, value = $5,
               timestamp = COALESCE($6, timestamp), updated_at = now()
         WHERE id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(input.metric.as_str())
    .bind(input.measurement_type.as_str())
    .bind(input.value)
    .bind(input.timestamp)
    .fetch_optional(db)
    .await
    .context("update measurement")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM body_measurements WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete measurement")?;
    Ok(res.rows_affected() > 0)
}

/// Newest row per metric among `metrics`; ties on timestamp fall to the larger id.
pub async fn latest_per_metric(
    db: &PgPool,
    user_id: Uuid,
    metrics: &[Metric],
) -> anyhow::Result<Vec<BodyMeasurement>> {
    let names: Vec<&str> = metrics.iter().map(|m| m.as_str()).collect();
    let rows = sqlx::query_as::<_, BodyMeasurement>(&format!(
        r#"
        SELECT DISTINCT ON (metric) {COLUMNS}
          FROM body_measurements
         WHERE user_id = $1 AND metric = ANY($2)
         ORDER BY metric, timestamp DESC, id DESC
        "#
    ))
    .bind(user_id)
    .bind(&names)
    .fetch_all(db)
    .await
    .context("latest measurements")?;
    Ok(rows)
}

pub async fn by_metric(
    db: &PgPool,
    user_id: Uuid,
    metric: Metric,
) -> anyhow::Result<Vec<BodyMeasurement>> {
    let rows = sqlx::query_as::<_, BodyMeasurement>(&format!(
        r#"
        SELECT {COLUMNS}
          FROM body_measurements
         WHERE user_id = $1 AND metric = $2
         ORDER BY timestamp DESC, id DESC
        "#
    ))
    .bind(user_id)
    .bind(metric.as_str())
    .fetch_all(db)
    .await
    .context("measurements by metric")?;
    Ok(rows)
}

/// Rows of `metric` whose UTC date lies in `[start, end]`, oldest first.
pub async fn in_window(
    db: &PgPool,
    user_id: Uuid,
    metric: Metric,
    start: Date,
    end: Date,
) -> anyhow::Result<Vec<BodyMeasurement>> {
    let rows = sqlx::query_as::<_, BodyMeasurement>(&format!(
        r#"
        SELECT {COLUMNS}
          FROM body_measurements
         WHERE user_id = $1 AND metric = $2
           AND (timestamp AT TIME ZONE 'UTC')::date BETWEEN $3 AND $4
         ORDER BY timestamp ASC, id ASC
        "#
    ))
    .bind(user_id)
    .bind(metric.as_str())
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
    .context("measurements in window")?;
    Ok(rows)
}

/// Count plus earliest and latest row across `metrics`, read from one snapshot.
pub async fn span(
    db: &PgPool,
    user_id: Uuid,
    metrics: &[Metric],
) -> anyhow::Result<(i64, Option<BodyMeasurement>, Option<BodyMeasurement>)> {
    let names: Vec<&str> = metrics.iter().map(|m| m.as_str()).collect();

    let mut tx = db.begin().await.context("begin span")?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
        .execute(&mut *tx)
        .await
        .context("span isolation")?;

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM body_measurements WHERE user_id = $1 AND metric = ANY($2)",
    )
    .bind(user_id)
    .bind(&names)
    .fetch_one(&mut *tx)
    .await
    .context("count span")?;

    if count == 0 {
        tx.commit().await.context("commit span")?;
        return Ok((0, None, None));
    }

    let edge = |dir: &'static str| {
        format!(
            r#"
            SELECT {COLUMNS}
              FROM body_measurements
             WHERE user_id = $1 AND metric = ANY($2)
             ORDER BY timestamp {dir}, id {dir}
             LIMIT 1
            "#
        )
    };

    let first = sqlx::query_as::<_, BodyMeasurement>(&edge("ASC"))
        .bind(user_id)
        .bind(&names)
        .fetch_optional(&mut *tx)
        .await
        .context("first in span")?;
    let last = sqlx::query_as::<_, BodyMeasurement>(&edge("DESC"))
        .bind(user_id)
        .bind(&names)
        .fetch_optional(&mut *tx)
        .await
        .context("last in span")?;
    tx.commit().await.context("commit span")?;

    Ok((count, first, last))
}
