use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Username/password pair used by both token endpoints.
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub username: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub refresh: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub token: String,
}

/// Access/refresh pair.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Opaque API token plus who it belongs to.
#[derive(Debug, Serialize)]
pub struct ApiTokenResponse {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
}
