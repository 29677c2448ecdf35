use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::{jwt::JwtKeys, repo, repo_types::User};
use crate::{error::AppError, state::AppState};

/// Owner identity of the request.
///
/// Accepts `Authorization: Bearer <access jwt>` or `Authorization: Token <key>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Credential<'a> {
    Jwt(&'a str),
    ApiToken(&'a str),
}

pub(crate) fn parse_authorization(header: &str) -> Option<Credential<'_>> {
    let (scheme, value) = header.trim().split_once(' ')?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(Credential::Jwt(value))
    } else if scheme.eq_ignore_ascii_case("token") {
        Some(Credential::ApiToken(value))
    } else {
        None
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let credential = parse_authorization(header).ok_or_else(|| {
            warn!("unsupported authorization scheme");
            AppError::Unauthorized
        })?;

        match credential {
            Credential::Jwt(token) => {
                let keys = JwtKeys::from_ref(state);
                let claims = keys.verify_access(token).map_err(|e| {
                    warn!(error = %e, "invalid or expired token");
                    AppError::InvalidToken
                })?;
                if !User::is_active(&state.db, claims.sub).await? {
                    warn!(user_id = %claims.sub, "token for missing or inactive user");
                    return Err(AppError::InvalidToken);
                }
                Ok(AuthUser(claims.sub))
            }
            Credential::ApiToken(key) => match repo::user_id_for_token(&state.db, key).await? {
                Some(id) => Ok(AuthUser(id)),
                None => {
                    warn!("unknown api token");
                    Err(AppError::InvalidToken)
                }
            },
        }
    }
}
