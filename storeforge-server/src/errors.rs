use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use storeforge_core::ProvisionError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Maps the core taxonomy onto HTTP statuses. Internal failures keep
    /// their detail only in dev mode; production responses stay generic and
    /// never leak schema, table, or path names.
    pub fn from_provision(err: ProvisionError, dev_mode: bool) -> Self {
        match err {
            ProvisionError::AlreadyExists(_) => {
                Self::conflict("Subdomain is already taken")
            }
            ProvisionError::NotEmpty(msg) => Self::conflict(msg),
            ProvisionError::Validation(e) => Self::bad_request(e.to_string()),
            ProvisionError::Unauthorized(msg) => Self::unauthorized(msg),
            ProvisionError::ContextRequired => {
                Self::unauthorized("Tenant context required")
            }
            other if dev_mode => Self::internal(other.to_string()),
            _ => Self::internal("Provisioning failed. Please try again later."),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<storeforge_model::ValidationError> for AppError {
    fn from(err: storeforge_model::ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_mapping() {
        let err = AppError::from_provision(
            ProvisionError::AlreadyExists("schema tenant_x".to_string()),
            false,
        );
        assert_eq!(err.status, StatusCode::CONFLICT);
        // The colliding resource name never leaks.
        assert!(!err.message.contains("tenant_x"));
    }

    #[test]
    fn test_internal_errors_sanitized_outside_dev_mode() {
        let raw = ProvisionError::Failed(
            "relation tenant_shop.users does not exist".to_string(),
        );
        let err = AppError::from_provision(raw, false);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("tenant_shop"));
    }

    #[test]
    fn test_internal_errors_verbose_in_dev_mode() {
        let raw = ProvisionError::Failed("boom".to_string());
        let err = AppError::from_provision(raw, true);
        assert!(err.message.contains("boom"));
    }
}
