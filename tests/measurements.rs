#[macro_use]
mod common;

use axum::http::{Method, StatusCode};
use fithub::app::build_app;
use serde_json::json;
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};

use common::send;

fn days_ago(n: i64) -> String {
    (OffsetDateTime::now_utc() - Duration::days(n))
        .format(&Rfc3339)
        .unwrap()
}

#[tokio::test]
async fn latest_and_trend() {
    let state = require_db!();
    let app = build_app(state.clone());
    let (_, token) = common::user(&state).await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/measurements/bulk_create",
        Some(&token),
        Some(json!({"measurements": [
            {"metric": "weight_kg", "value": 82.0, "timestamp": days_ago(40)},
            {"metric": "weight_kg", "value": 80.5, "timestamp": days_ago(10)},
            {"metric": "weight_kg", "value": 79.0, "timestamp": days_ago(1)},
            {"metric": "waist_cm", "value": 90.0, "timestamp": days_ago(3)},
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.as_array().unwrap().len(), 4);

    let (_, latest) = send(
        &app,
        Method::GET,
        "/api/v1/measurements/latest?metrics=weight_kg&metrics=waist_cm",
        Some(&token),
        None,
    )
    .await;
    let latest = latest.as_array().unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0]["metric"], "weight_kg");
    assert_eq!(latest[0]["value"], 79.0);

    let (_, trend) = send(
        &app,
        Method::GET,
        "/api/v1/measurements/trends?metric=weight_kg&days=30",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(trend["count"], 2);
    let values: Vec<f64> = trend["measurements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["value"].as_f64().unwrap())
        .collect();
    assert_eq!(values, vec![80.5, 79.0]);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/measurements/trends?days=-5",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn by_metric_requires_the_parameter() {
    let state = require_db!();
    let app = build_app(state.clone());
    let (_, token) = common::user(&state).await;
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/measurements/by_metric",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "metric parameter is required");
}

#[tokio::test]
async fn invalid_bulk_item_names_its_index() {
    let state = require_db!();
    let app = build_app(state.clone());
    let (user_id, token) = common::user(&state).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/measurements/bulk_create",
        Some(&token),
        Some(json!({"measurements": [
            {"metric": "weight_kg", "value": 70},
            {"metric": "weight_kg", "value": 0},
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"].to_string().contains("measurements[1]"));

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM body_measurements WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn progress_count_agrees_with_its_edges() {
    let state = require_db!();
    let app = build_app(state.clone());
    let (_, token) = common::user(&state).await;

    let (_, goal) = send(
        &app,
        Method::POST,
        "/api/v1/goals",
        Some(&token),
        Some(json!({"goal_type": "weight_loss", "target_date": "2030-01-01"})),
    )
    .await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/measurements/bulk_create",
        Some(&token),
        Some(json!({"measurements": [
            {"metric": "weight_kg", "value": 90.0, "timestamp": days_ago(20)},
            {"metric": "body_fat_percentage", "value": 25.0, "timestamp": days_ago(10)},
            {"metric": "weight_kg", "value": 86.0, "timestamp": days_ago(0)},
            {"metric": "waist_cm", "value": 95.0, "timestamp": days_ago(30)},
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = goal["id"].as_str().unwrap();
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/goals/{id}/progress"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["measurements_count"], 3);
    assert_eq!(body["first_measurement"]["value"], 90.0);
    assert_eq!(body["latest_measurement"]["value"], 86.0);
    assert_eq!(body["days_since_start"], 20);
}
