use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{ApiTokenResponse, CredentialsRequest, RefreshRequest, TokenPair, VerifyRequest},
    jwt::JwtKeys,
    repo,
    repo_types::User,
    services::{authenticate, new_token_key},
};
use crate::{error::AppError, extract::ValidJson, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token", post(obtain_api_token))
        .route("/auth/jwt/token", post(obtain_jwt_pair))
        .route("/auth/jwt/token/refresh", post(refresh))
        .route("/auth/jwt/token/verify", post(verify))
}

/// Sign a fresh access/refresh pair for `user_id`.
pub fn issue_pair(keys: &JwtKeys, user_id: Uuid) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access: keys.sign_access(user_id)?,
        refresh: keys.sign_refresh(user_id)?,
    })
}

#[instrument(skip(state, payload))]
pub async fn obtain_api_token(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CredentialsRequest>,
) -> Result<Json<ApiTokenResponse>, AppError> {
    let user = authenticate(&state.db, &payload.username, &payload.password).await?;
    let token = repo::get_or_create_token(&state.db, user.id, &new_token_key()).await?;

    info!(user_id = %user.id, "api token issued");
    Ok(Json(ApiTokenResponse {
        token,
        user_id: user.id,
        username: user.username,
        email: user.email,
        is_staff: user.is_staff,
    }))
}

#[instrument(skip(state, payload))]
pub async fn obtain_jwt_pair(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CredentialsRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let user = authenticate(&state.db, &payload.username, &payload.password).await?;
    let pair = issue_pair(&JwtKeys::from_ref(&state), user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(pair))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AppError::InvalidToken
    })?;

    if !User::is_active(&state.db, claims.sub).await? {
        warn!(user_id = %claims.sub, "refresh for missing or inactive user");
        return Err(AppError::InvalidToken);
    }

    Ok(Json(issue_pair(&keys, claims.sub)?))
}

/// Signature/expiry check only; either token kind verifies.
#[instrument(skip(state, payload))]
pub async fn verify(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<VerifyRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    JwtKeys::from_ref(&state)
        .verify(&payload.token)
        .map_err(|_| AppError::InvalidToken)?;
    Ok(Json(json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn issued_pair_has_matching_kinds() {
        let keys = JwtKeys::from(&AppConfig::test_default().jwt);
        let user_id = Uuid::new_v4();
        let pair = issue_pair(&keys, user_id).unwrap();
        assert_eq!(keys.verify_access(&pair.access).unwrap().sub, user_id);
        assert_eq!(keys.verify_refresh(&pair.refresh).unwrap().sub, user_id);
    }

    #[test]
    fn token_pair_serializes_access_and_refresh() {
        let pair = TokenPair {
            access: "a".into(),
            refresh: "r".into(),
        };
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["access"], "a");
        assert_eq!(json["refresh"], "r");
    }
}
