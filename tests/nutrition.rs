#[macro_use]
mod common;

use axum::http::{Method, StatusCode};
use fithub::app::build_app;
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};

use common::send;

async fn meal_with_rice(app: &axum::Router, token: &str) -> (String, String) {
    let (status, ingredient) = send(
        app,
        Method::POST,
        "/api/v1/ingredients",
        Some(token),
        Some(json!({"name": "rice", "calories": 100, "proteins": 10, "fats": 5, "carbs": 20})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, diet) = send(app, Method::POST, "/api/v1/diets", Some(token), Some(json!({"name": "bulk"}))).await;
    let (status, meal) = send(
        app,
        Method::POST,
        "/api/v1/meals",
        Some(token),
        Some(json!({"diet": diet["id"], "name": "lunch bowl", "meal_type": "lunch"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (
        meal["id"].as_str().unwrap().to_string(),
        ingredient["id"].as_str().unwrap().to_string(),
    )
}

fn rfc3339(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap()
}

#[tokio::test]
async fn meal_summary_scales_per_hundred() {
    let state = require_db!();
    let app = build_app(state.clone());
    let (_, token) = common::user(&state).await;
    let (meal, rice) = meal_with_rice(&app, &token).await;

    let (_, empty) = send(
        &app,
        Method::GET,
        &format!("/api/v1/meals/{meal}/nutrition_summary"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(empty["total_calories"], 0.0);
    assert_eq!(empty["ingredient_count"], 0);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/meals/{meal}/add_ingredient"),
        Some(&token),
        Some(json!({"ingredient": rice, "quantity": 200})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, summary) = send(
        &app,
        Method::GET,
        &format!("/api/v1/meals/{meal}/nutrition_summary"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(summary["total_calories"], 200.0);
    assert_eq!(summary["total_proteins"], 20.0);
    assert_eq!(summary["total_fats"], 10.0);
    assert_eq!(summary["total_carbs"], 40.0);
    assert_eq!(summary["ingredient_count"], 1);
}

#[tokio::test]
async fn bulk_add_is_all_or_nothing() {
    let state = require_db!();
    let app = build_app(state.clone());
    let (_, token) = common::user(&state).await;
    let (meal, rice) = meal_with_rice(&app, &token).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/meals/{meal}/bulk_add_ingredients"),
        Some(&token),
        Some(json!({"ingredients": [
            {"ingredient": rice, "quantity": 50},
            {"ingredient": rice, "quantity": -1},
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"].to_string().contains("ingredients[1]"));

    let (_, lines) = send(
        &app,
        Method::GET,
        &format!("/api/v1/meals/{meal}/ingredients"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(lines.as_array().map(Vec::len), Some(0));

    let (status, created) = send(
        &app,
        Method::POST,
        &format!("/api/v1/meals/{meal}/bulk_add_ingredients"),
        Some(&token),
        Some(json!({"ingredients": [
            {"ingredient": rice, "quantity": 50},
            {"ingredient": rice, "quantity": 150},
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let quantities: Vec<f64> = created
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["quantity"].as_f64().unwrap())
        .collect();
    assert_eq!(quantities, vec![50.0, 150.0]);
}

#[tokio::test]
async fn record_summary_over_last_week() {
    let state = require_db!();
    let app = build_app(state.clone());
    let (_, token) = common::user(&state).await;

    let now = OffsetDateTime::now_utc();
    for i in 0..7i64 {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/records",
            Some(&token),
            Some(json!({
                "meal_name": format!("day {i}"),
                "calories": 100 * (i + 1),
                "timestamp": rfc3339(now - Duration::days(i)),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/records/nutrition_summary?days=7",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_calories"], 2800.0);
    assert_eq!(body["record_count"], 7);
    assert_eq!(body["period_days"], 7);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/records/nutrition_summary?days=-1",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn record_linked_to_meal_uses_meal_totals() {
    let state = require_db!();
    let app = build_app(state.clone());
    let (_, token) = common::user(&state).await;
    let (meal, rice) = meal_with_rice(&app, &token).await;
    send(
        &app,
        Method::POST,
        &format!("/api/v1/meals/{meal}/add_ingredient"),
        Some(&token),
        Some(json!({"ingredient": rice, "quantity": 200})),
    )
    .await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/records",
        Some(&token),
        Some(json!({"meal": meal, "calories": 9999})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/v1/records/nutrition_summary",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["total_calories"], 200.0);
    assert_eq!(body["record_count"], 1);
}

#[tokio::test]
async fn today_only_lists_own_records() {
    let state = require_db!();
    let app = build_app(state.clone());
    let (_, alice) = common::user(&state).await;
    let (_, bob) = common::user(&state).await;

    for token in [&alice, &bob] {
        send(
            &app,
            Method::POST,
            "/api/v1/records",
            Some(token),
            Some(json!({"meal_name": "toast", "calories": 150})),
        )
        .await;
    }
    let (_, older) = send(
        &app,
        Method::POST,
        "/api/v1/records",
        Some(&alice),
        Some(json!({
            "meal_name": "late snack",
            "timestamp": rfc3339(OffsetDateTime::now_utc() - Duration::days(2)),
        })),
    )
    .await;
    assert_eq!(older["meal_name"], "late snack");

    let (status, body) = send(&app, Method::GET, "/api/v1/records/today", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows: &Vec<Value> = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["meal_name"], "toast");
}

#[tokio::test]
async fn record_cannot_reference_someone_elses_meal() {
    let state = require_db!();
    let app = build_app(state.clone());
    let (_, alice) = common::user(&state).await;
    let (_, bob) = common::user(&state).await;
    let (meal, _) = meal_with_rice(&app, &alice).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/records",
        Some(&bob),
        Some(json!({"meal": meal})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["meal"].is_array());
}
