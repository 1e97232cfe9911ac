/// Application Error Handling
///
/// Unified error type for the auth service. Every failure a flow handler can
/// produce maps onto one of these variants, and each variant maps onto a
/// single HTTP status and response envelope. Token and credential failures
/// are deliberately coarse: callers must not be able to tell which check
/// rejected them.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

use crate::store::StoreError;

/// A single field-level validation failure, surfaced to the client
/// inside the `errors` array of a 400 response.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Central application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed input, with per-field detail -> 400
    Validation(Vec<FieldError>),
    /// Duplicate identity -> 409
    Conflict(String),
    /// Bad credentials or invalid/expired/unrecognized token -> 401
    Unauthorized(String),
    /// Referenced account no longer exists -> 404
    NotFound(String),
    /// Store or codec failure -> 500, detail logged, generic message returned
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => {
                let detail: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                write!(f, "validation failed: {}", detail.join(", "))
            }
            AppError::Conflict(msg) => write!(f, "{}", msg),
            AppError::Unauthorized(msg) => write!(f, "{}", msg),
            AppError::NotFound(msg) => write!(f, "{}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl AppError {
    /// Shorthand for a single-field validation error
    pub fn validation(field: &str, message: &str) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    fn log(&self) {
        match self {
            AppError::Validation(errors) => {
                tracing::warn!(errors = ?errors, "Validation error");
            }
            AppError::Conflict(msg) => {
                tracing::warn!(error = %msg, "Conflict");
            }
            AppError::Unauthorized(msg) => {
                tracing::warn!(error = %msg, "Unauthorized");
            }
            AppError::NotFound(msg) => {
                tracing::warn!(error = %msg, "Not found");
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => {
                AppError::Conflict("Email already registered".to_string())
            }
            StoreError::NotFound => AppError::NotFound("User not found".to_string()),
            StoreError::Unavailable(msg) => AppError::Internal(msg),
        }
    }
}

/// Error response envelope, matching the success envelope shape
#[derive(Debug, serde::Serialize)]
struct ErrorBody {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();

        let body = match self {
            AppError::Validation(errors) => ErrorBody {
                success: false,
                message: None,
                errors: Some(errors.clone()),
            },
            // Never leak internal detail to the caller
            AppError::Internal(_) => ErrorBody {
                success: false,
                message: Some("Internal server error".to_string()),
                errors: None,
            },
            other => ErrorBody {
                success: false,
                message: Some(other.to_string()),
                errors: None,
            },
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
