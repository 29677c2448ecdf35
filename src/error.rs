//! Application error type and its JSON rendering.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::ValidationErrors;

/// Field name -> messages, rendered as the body of a validation failure.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl AppError {
    /// Single-field validation failure.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.into(), vec![message.into()]);
        AppError::Validation(fields)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidToken | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource"),
            other => AppError::Internal(anyhow::Error::new(other).context("database")),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(field_errors(&errors))
    }
}

/// Flatten `validator` output into `field -> [message]`.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, errs) in errors.field_errors() {
        let key = if field == "__all__" {
            "non_field_errors".to_string()
        } else {
            field.to_string()
        };
        let messages = errs
            .iter()
            .map(|e| match &e.message {
                Some(m) => m.to_string(),
                None => format!("invalid value ({})", e.code),
            })
            .collect::<Vec<_>>();
        out.entry(key).or_default().extend(messages);
    }
    out
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Unauthorized => ErrorResponse {
                error: "unauthorized",
                details: None,
                fields: None,
            },
            AppError::InvalidToken => ErrorResponse {
                error: "invalid_token",
                details: None,
                fields: None,
            },
            AppError::InvalidCredentials => ErrorResponse {
                error: "invalid_credentials",
                details: None,
                fields: None,
            },
            AppError::NotFound(what) => ErrorResponse {
                error: "not_found",
                details: Some(format!("{what} not found")),
                fields: None,
            },
            AppError::BadRequest(msg) => ErrorResponse {
                error: "bad_request",
                details: Some(msg),
                fields: None,
            },
            AppError::Validation(fields) => ErrorResponse {
                error: "validation_error",
                details: None,
                fields: Some(fields),
            },
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                ErrorResponse {
                    error: "internal_error",
                    details: None,
                    fields: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(range(min = 0.0))]
        value: f64,
    }

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound("Goal").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::field("email", "taken").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn validator_errors_are_flattened_per_field() {
        let probe = Probe {
            name: "ab".into(),
            value: -1.0,
        };
        let errors = probe.validate().unwrap_err();
        let fields = field_errors(&errors);
        assert_eq!(fields["name"], vec!["too short".to_string()]);
        assert_eq!(fields["value"].len(), 1);
        assert!(fields["value"][0].contains("range"));
    }
}
