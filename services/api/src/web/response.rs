//! services/api/src/web/response.rs
//!
//! The success half of the `{ success, data?, message? }` envelope shared by
//! every JSON endpoint. Failures are rendered by `ApiError`.

use axum::{extract::rejection::JsonRejection, Json};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Wraps a payload in a successful envelope.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        message: None,
    })
}

/// A successful envelope carrying only a confirmation message.
pub fn ack(message: &str) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        success: true,
        data: None,
        message: Some(message.to_string()),
    })
}

/// Malformed JSON bodies are reported through the same envelope as other validation errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
