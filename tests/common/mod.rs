#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use fithub::{
    app::build_app,
    auth::{jwt::JwtKeys, repo_types::NewUser, repo_types::User},
    config::AppConfig,
    state::AppState,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

/// Skip the test unless `TEST_DATABASE_URL` points at a Postgres we may write to.
macro_rules! require_db {
    () => {
        match common::db_state().await {
            Some(state) => state,
            None => {
                eprintln!("TEST_DATABASE_URL not set; skipping");
                return;
            }
        }
    };
}

pub fn offline_app() -> Router {
    build_app(AppState::fake())
}

pub fn keys() -> JwtKeys {
    JwtKeys::from(&AppConfig::test_default().jwt)
}

pub async fn db_state() -> Option<AppState> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let db = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("run migrations");
    let mut config = AppConfig::test_default();
    config.database_url = url;
    Some(AppState::from_parts(db, Arc::new(config)))
}

/// Fresh user plus a bearer access token for it.
pub async fn user(state: &AppState) -> (Uuid, String) {
    let tag = Uuid::new_v4().simple().to_string();
    let username = format!("u{}", &tag[..12]);
    let email = format!("{username}@example.com");
    let user = User::create(
        &state.db,
        NewUser {
            username: &username,
            email: &email,
            first_name: "",
            last_name: "",
            password_hash: "unused",
        },
    )
    .await
    .expect("create user");
    let token = keys().sign_access(user.id).expect("sign");
    (user.id, token)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => req.body(Body::empty()),
    }
    .expect("request");

    let res = app.clone().oneshot(req).await.expect("response");
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}
