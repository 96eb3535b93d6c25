//! services/api/src/web/upload.rs
//!
//! The full-pipeline endpoint: one image in, stored image, analysis, narration
//! and a started video job out.

use crate::{
    error::ApiError,
    web::{
        response::{ok, ApiResponse},
        state::AppState,
    },
};
use axum::extract::{Multipart, State};
use axum::Json;
use std::sync::Arc;
use tracing::info;
use tutor_core::domain::{PipelineOutput, UploadRequest};

/// Upload an image and run the whole tutoring pipeline on it.
///
/// Accepts `multipart/form-data` with an `image` file part and an optional
/// `query` text part. Other parts are ignored.
#[utoipa::path(
    post,
    path = "/api/upload/analyze",
    request_body(content_type = "multipart/form-data", description = "An `image` file and an optional `query` field."),
    responses(
        (status = 200, description = "Every artifact produced for the upload"),
        (status = 400, description = "No image file provided, or the file is not an image"),
        (status = 500, description = "A pipeline stage failed")
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<PipelineOutput>>, ApiError> {
    let mut image = None;
    let mut query = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Failed to read multipart data: {}", e)))?
    {
        match field.name() {
            Some("image") => {
                let is_image = field
                    .content_type()
                    .map(|ct| ct.starts_with("image/"))
                    .unwrap_or(false);
                if !is_image {
                    return Err(ApiError::Validation(
                        "Only image files are allowed".to_string(),
                    ));
                }
                let data = field.bytes().await.map_err(|e| {
                    ApiError::Validation(format!("Failed to read file bytes: {}", e))
                })?;
                image = Some(data);
            }
            Some("query") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::Validation(format!("Failed to read query field: {}", e))
                })?;
                query = Some(text).filter(|q| !q.trim().is_empty());
            }
            _ => {}
        }
    }

    let image = image
        .filter(|data| !data.is_empty())
        .ok_or_else(|| ApiError::Validation("No image file provided".to_string()))?;
    info!(bytes = image.len(), has_query = query.is_some(), "Image upload received.");

    let output = state.pipeline.run(UploadRequest { image, query }).await?;
    Ok(ok(output))
}
