use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::{repo_types::User, services::is_valid_username, TokenPair};

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if is_valid_username(username) {
        Ok(())
    } else {
        Err(ValidationError::new("username").with_message(
            "Enter a valid username. Letters, digits and @/./+/-/_ only.".into(),
        ))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[validate(length(min = 8, message = "Ensure this field has at least 8 characters."))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords don't match."))]
    pub password_confirm: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub old_password: String,
    #[validate(length(min = 8, message = "Ensure this field has at least 8 characters."))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "New passwords don't match."))]
    pub new_password_confirm: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_joined: OffsetDateTime,
    pub is_active: bool,
}

impl From<User> for Profile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            date_joined: u.date_joined,
            is_active: u.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: Profile,
    pub tokens: TokenPair,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdated {
    pub user: Profile,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            username: "runner".into(),
            email: "runner@example.com".into(),
            first_name: String::new(),
            last_name: String::new(),
            password: password.into(),
            password_confirm: confirm.into(),
        }
    }

    #[test]
    fn register_accepts_matching_passwords() {
        assert!(register("longenough", "longenough").validate().is_ok());
    }

    #[test]
    fn register_rejects_mismatched_confirmation() {
        let errors = register("longenough", "different1").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirm"));
    }

    #[test]
    fn register_rejects_short_password_and_bad_email() {
        let mut req = register("short", "short");
        req.email = "not-an-email".into();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn register_rejects_bad_username() {
        let mut req = register("longenough", "longenough");
        req.username = "white space".into();
        assert!(req.validate().unwrap_err().field_errors().contains_key("username"));
    }

    #[test]
    fn change_password_requires_matching_new_passwords() {
        let req = ChangePasswordRequest {
            old_password: "old-password".into(),
            new_password: "new-password".into(),
            new_password_confirm: "new-passw0rd".into(),
        };
        assert!(req
            .validate()
            .unwrap_err()
            .field_errors()
            .contains_key("new_password_confirm"));
    }

    #[test]
    fn profile_update_fields_are_optional() {
        let req = UpdateProfileRequest {
            email: None,
            first_name: Some("Ada".into()),
            last_name: None,
        };
        assert!(req.validate().is_ok());
    }
}
