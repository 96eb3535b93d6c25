//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and its
//! conversion into the uniform `{ success: false, error: { message } }` envelope.

use crate::config::{ConfigError, Environment};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use tutor_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required field is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The session store cannot be reached or is not configured.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A vendor call failed or timed out.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl From<PortError> for ApiError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::InvalidInput(m) => ApiError::Validation(m),
            PortError::NotFound(m) => ApiError::NotFound(m),
            PortError::Unavailable(m) => ApiError::ServiceUnavailable(m),
            PortError::Upstream(m) | PortError::Unexpected(m) => ApiError::Upstream(m),
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_)
            | ApiError::Config(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the client, without the variant prefix.
    fn client_message(&self) -> String {
        match self {
            ApiError::Validation(m)
            | ApiError::NotFound(m)
            | ApiError::ServiceUnavailable(m)
            | ApiError::Upstream(m)
            | ApiError::Internal(m) => m.clone(),
            other => other.to_string(),
        }
    }

    /// Builds the envelope body for the given deployment environment.
    pub fn to_body(&self, environment: Environment) -> ErrorEnvelope {
        let status = self.status_code();
        let message = if environment == Environment::Production
            && status == StatusCode::INTERNAL_SERVER_ERROR
        {
            "Internal Server Error".to_string()
        } else {
            self.client_message()
        };
        let stack = (environment == Environment::Development).then(|| format!("{:?}", self));

        ErrorEnvelope {
            success: false,
            error: ErrorDetail { message, stack },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = %status, "Request failed: {}", self);
        }
        (status, Json(self.to_body(Environment::current()))).into_response()
    }
}
