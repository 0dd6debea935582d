use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Profile errors
/// - E2xxx: Blood request errors
/// - E3xxx: Notification errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    BadRequest,
    TokenExpired,
    TokenInvalid,

    // Profile (E1xxx)
    ProfileNotFound,
    ProfileAlreadyExists,

    // Blood request (E2xxx)
    BloodRequestNotFound,
    CannotAcceptOwnRequest,
    InvalidStatusTransition,

    // Notification (E3xxx)
    NotificationNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::BadRequest => "E0006",
            Self::TokenExpired => "E0007",
            Self::TokenInvalid => "E0008",

            // Profile
            Self::ProfileNotFound => "E1001",
            Self::ProfileAlreadyExists => "E1002",

            // Blood request
            Self::BloodRequestNotFound => "E2001",
            Self::CannotAcceptOwnRequest => "E2002",
            Self::InvalidStatusTransition => "E2003",

            // Notification
            Self::NotificationNotFound => "E3001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::InvalidStatusTransition => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound | Self::ProfileNotFound | Self::BloodRequestNotFound
            | Self::NotificationNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::CannotAcceptOwnRequest => StatusCode::FORBIDDEN,
            Self::ProfileAlreadyExists => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The catalogue code carried by this error, if it is a known one.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Known { code, .. } => Some(*code),
            Self::Validation(_) => Some(ErrorCode::ValidationError),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).ok();
        match details {
            Some(details) => Self::with_details(ErrorCode::ValidationError, "invalid input", details),
            None => Self::Validation(errors.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                Self::bad_request("expected a JSON body with Content-Type: application/json")
            }
            other => Self::new(ErrorCode::ValidationError, other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(ErrorCode::ValidationError, rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(ErrorCode::ValidationError, rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn known_error_envelope() {
        let value = body_json(AppError::new(
            ErrorCode::CannotAcceptOwnRequest,
            "you cannot accept your own request",
        ))
        .await;

        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "E2002");
        assert_eq!(value["error"]["message"], "you cannot accept your own request");
    }

    #[tokio::test]
    async fn self_accept_is_forbidden() {
        let response = AppError::new(ErrorCode::CannotAcceptOwnRequest, "nope").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn diesel_not_found_maps_to_404() {
        let response = AppError::Database(diesel::result::Error::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn validation_error_is_bad_request() {
        let response = AppError::Validation("units_required must be at least 1".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let value = body_json(AppError::Validation("bad".into())).await;
        assert_eq!(value["error"]["code"], "E0002");
    }

    #[test]
    fn not_found_codes_share_status() {
        for code in [
            ErrorCode::ProfileNotFound,
            ErrorCode::BloodRequestNotFound,
            ErrorCode::NotificationNotFound,
        ] {
            assert_eq!(code.status_code(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn error_code_accessor() {
        let err = AppError::new(ErrorCode::ProfileAlreadyExists, "exists");
        assert_eq!(err.error_code(), Some(ErrorCode::ProfileAlreadyExists));
        assert_eq!(AppError::Validation("x".into()).error_code(), Some(ErrorCode::ValidationError));
        assert_eq!(AppError::internal("x").error_code(), Some(ErrorCode::InternalError));
        assert_eq!(AppError::Database(diesel::result::Error::NotFound).error_code(), None);
    }
}
