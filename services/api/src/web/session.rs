//! services/api/src/web/session.rs
//!
//! Save, load and delete learning sessions. Payloads are opaque JSON that is
//! stored and returned byte for byte.

use crate::{
    adapters::SESSION_TTL,
    error::ApiError,
    web::{
        response::{ack, ok, ApiResponse},
        state::AppState,
    },
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::value::RawValue;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveSessionRequest {
    pub session_id: Option<String>,
    /// Any JSON value except `null`.
    #[schema(value_type = Object)]
    pub data: Option<Box<RawValue>>,
}

/// POST /api/session/save - Store a session for 24 hours.
#[utoipa::path(
    post,
    path = "/api/session/save",
    request_body = SaveSessionRequest,
    responses(
        (status = 200, description = "Session saved"),
        (status = 400, description = "Session ID and data are required"),
        (status = 503, description = "Session storage not available")
    )
)]
pub async fn save_session_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveSessionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Json(req) = payload?;
    let (session_id, data) = match (req.session_id, req.data) {
        (Some(id), Some(data)) if !id.trim().is_empty() => (id, data),
        _ => {
            return Err(ApiError::Validation(
                "Session ID and data are required".to_string(),
            ))
        }
    };

    match &state.sessions {
        Some(store) => {
            store.save(&session_id, data.get(), SESSION_TTL).await?;
            info!(session_id = %session_id, "Session saved.");
        }
        None => warn!(session_id = %session_id, "No session store configured; session not persisted."),
    }
    Ok(ack("Session saved successfully"))
}

/// GET /api/session/{session_id} - Fetch a stored session.
#[utoipa::path(
    get,
    path = "/api/session/{session_id}",
    params(("session_id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "The stored session data"),
        (status = 404, description = "Session not found"),
        (status = 503, description = "Session storage not available")
    )
)]
pub async fn get_session_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Box<RawValue>>>, ApiError> {
    let store = state.sessions.as_ref().ok_or_else(|| {
        ApiError::ServiceUnavailable("Session storage not available".to_string())
    })?;

    let payload = store
        .load(&session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    let data = RawValue::from_string(payload)
        .map_err(|e| ApiError::Internal(format!("Stored session is not valid JSON: {}", e)))?;
    Ok(ok(data))
}

/// DELETE /api/session/{session_id} - Remove a stored session.
#[utoipa::path(
    delete,
    path = "/api/session/{session_id}",
    params(("session_id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session deleted"),
        (status = 503, description = "Session storage not available")
    )
)]
pub async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if let Some(store) = &state.sessions {
        store.delete(&session_id).await?;
        info!(session_id = %session_id, "Session deleted.");
    }
    Ok(ack("Session deleted successfully"))
}
