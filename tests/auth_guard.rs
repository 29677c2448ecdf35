mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use common::{keys, offline_app, send};

#[tokio::test]
async fn health_is_public() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn owner_scoped_routes_require_credentials() {
    let app = offline_app();
    let id = Uuid::new_v4();
    let routes = [
        (Method::GET, "/api/v1/goals".to_string()),
        (Method::GET, "/api/v1/goals/active".to_string()),
        (Method::POST, format!("/api/v1/goals/{id}/activate")),
        (Method::GET, "/api/v1/measurements/latest".to_string()),
        (Method::GET, "/api/v1/measurements/trends".to_string()),
        (Method::GET, "/api/v1/diets/active".to_string()),
        (Method::GET, format!("/api/v1/meals/{id}/nutrition_summary")),
        (Method::GET, "/api/v1/meal-ingredients".to_string()),
        (Method::GET, "/api/v1/ingredients/search?q=ap".to_string()),
        (Method::GET, "/api/v1/categories".to_string()),
        (Method::GET, "/api/v1/records/today".to_string()),
        (Method::GET, "/api/v1/records/nutrition_summary".to_string()),
        (Method::GET, "/api/v1/preferences/by_type".to_string()),
        (Method::GET, "/api/v1/accounts/profile".to_string()),
    ];
    for (method, uri) in routes {
        let (status, body) = send(&app, method.clone(), &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn create_without_credentials_is_rejected_before_the_body() {
    let app = offline_app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/measurements",
        None,
        Some(json!({"metric": "weight_kg", "value": -3})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_scheme_is_unauthorized() {
    let app = offline_app();
    let req = Request::builder()
        .uri("/api/v1/goals")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_bearer_token_is_unauthorized() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/api/v1/goals", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn refresh_token_cannot_be_used_as_access() {
    let app = offline_app();
    let refresh = keys().sign_refresh(Uuid::new_v4()).unwrap();
    let (status, body) = send(&app, Method::GET, "/api/v1/diets", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn verify_rejects_garbage() {
    let app = offline_app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/jwt/token/verify",
        None,
        Some(json!({"token": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
