//! API error type and its JSON response

use crate::middleware;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use waypost_store::StoreError;

/// Error codes returned in response bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    PayloadTooLarge,
    RangeNotSatisfiable,
    SlowDown,
    InternalError,
}

impl ErrorCode {
    /// Get the error code string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequest",
            Self::NotFound => "NotFound",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::RangeNotSatisfiable => "RangeNotSatisfiable",
            Self::SlowDown => "SlowDown",
            Self::InternalError => "InternalError",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RangeNotSatisfiable => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::SlowDown => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Api { code: ErrorCode, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create an error with an explicit code
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a 400
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Get the error code
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Api { code, .. } => *code,
            Self::Store(e) => match e {
                StoreError::NotFound(_) | StoreError::PathNotFound(_) => ErrorCode::NotFound,
                StoreError::RangeNotSatisfiable(_) => ErrorCode::RangeNotSatisfiable,
                StoreError::Encoding(_) => ErrorCode::BadRequest,
                StoreError::StorageInit { .. } | StoreError::Io(_) => ErrorCode::InternalError,
            },
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let request_id = middleware::current_request_id()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        // internal details stay in the log
        let message = if code == ErrorCode::InternalError {
            tracing::error!(error = %self, request_id = %request_id, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "error": {
                "code": code.as_str(),
                "message": message,
                "requestId": request_id,
            }
        });

        (code.status_code(), Json(body)).into_response()
    }
}
