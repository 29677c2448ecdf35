use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{
    ChangePasswordRequest, Message, Profile, ProfileUpdated, RegisterRequest, RegisterResponse,
    UpdateProfileRequest,
};
use crate::{
    auth::{
        handlers::issue_pair,
        jwt::JwtKeys,
        repo_types::{NewUser, User},
        services::{hash_password, verify_password},
        AuthUser,
    },
    error::{AppError, FieldErrors},
    extract::ValidJson,
    state::AppState,
};

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/register", post(register))
        .route("/accounts/profile", get(get_profile).patch(update_profile))
        .route("/accounts/change-password", post(change_password))
        .route("/accounts/delete", post(delete_account))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(mut payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    let mut taken = FieldErrors::new();
    if User::username_taken(&state.db, &payload.username).await? {
        taken.insert(
            "username".into(),
            vec!["A user with that username already exists.".into()],
        );
    }
    if User::email_taken(&state.db, &payload.email, None).await? {
        taken.insert(
            "email".into(),
            vec!["A user with this email already exists.".into()],
        );
    }
    if !taken.is_empty() {
        warn!(username = %payload.username, "registration conflicts with existing user");
        return Err(AppError::Validation(taken));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        NewUser {
            username: &payload.username,
            email: &payload.email,
            first_name: payload.first_name.trim(),
            last_name: payload.last_name.trim(),
            password_hash: &hash,
        },
    )
    .await?;

    let tokens = issue_pair(&JwtKeys::from_ref(&state), user.id)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: user.into(),
            tokens,
            message: "User created successfully",
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Profile>, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(payload): ValidJson<UpdateProfileRequest>,
) -> Result<Json<ProfileUpdated>, AppError> {
    let email = payload.email.map(|e| e.trim().to_lowercase());
    if let Some(email) = email.as_deref() {
        if User::email_taken(&state.db, email, Some(user_id)).await? {
            return Err(AppError::field(
                "email",
                "A user with this email already exists.",
            ));
        }
    }

    let user = User::update_profile(
        &state.db,
        user_id,
        email.as_deref(),
        payload.first_name.as_deref().map(str::trim),
        payload.last_name.as_deref().map(str::trim),
    )
    .await?;

    info!(%user_id, "profile updated");
    Ok(Json(ProfileUpdated {
        user: user.into(),
        message: "Profile updated successfully",
    }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(payload): ValidJson<ChangePasswordRequest>,
) -> Result<Json<Message>, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    if !verify_password(&payload.old_password, &user.password_hash)? {
        warn!(%user_id, "change password with wrong old password");
        return Err(AppError::field("old_password", "Old password is incorrect."));
    }

    let hash = hash_password(&payload.new_password)?;
    User::set_password(&state.db, user_id, &hash).await?;

    info!(%user_id, "password changed");
    Ok(Json(Message {
        message: "Password changed successfully",
    }))
}

#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Message>, AppError> {
    User::delete(&state.db, user_id).await?;
    info!(%user_id, "account deleted");
    Ok(Json(Message {
        message: "Account deleted successfully",
    }))
}
