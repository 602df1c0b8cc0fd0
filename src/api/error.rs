//! Request-time errors rendered as JSON responses

use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

static PRODUCTION_MODE: AtomicBool = AtomicBool::new(false);

/// Hide the messages of internal errors from response bodies
pub fn set_production_mode(production: bool) {
    PRODUCTION_MODE.store(production, Ordering::Relaxed);
}

pub fn is_production_mode() -> bool {
    PRODUCTION_MODE.load(Ordering::Relaxed)
}

/// Error a handler can return instead of a response
#[derive(Error, Debug)]
pub enum ApiError {
    /// Answered with its own status, message and details
    #[error("{message}")]
    Declared {
        status: StatusCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Answered with 500; the message is only shown outside production
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Extra context for declared errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Declared {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Attach details to a declared error; internal errors are left as they are
    pub fn with_details(self, details: serde_json::Value) -> Self {
        match self {
            ApiError::Declared { status, message, .. } => ApiError::Declared {
                status,
                message,
                details: Some(details),
            },
            internal => internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Declared { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::Declared { message, details, .. } => ErrorResponse {
                error: message,
                details,
            },
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                let error = if is_production_mode() {
                    "Internal Server Error".to_string()
                } else {
                    err.to_string()
                };
                ErrorResponse { error, details: None }
            }
        };
        (status, Json(body)).into_response()
    }
}
