//! services/api/src/web/ai.rs
//!
//! Single-stage endpoints that expose each vendor call on its own:
//! image analysis by URL, speech synthesis, video creation and video status.

use crate::{
    error::ApiError,
    web::{
        response::{ok, ApiResponse},
        state::AppState,
    },
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use tutor_core::{
    domain::{AnalysisResult, GenerationJob, VideoRequest},
    pipeline::{VIDEO_DURATION_SECS, VIDEO_STYLE},
    ports::JobStatusSource,
};
use utoipa::ToSchema;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub image_url: Option<String>,
    pub query: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    pub text: Option<String>,
    pub voice_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoCreateRequest {
    pub prompt: Option<String>,
    pub duration: Option<u32>,
    pub style: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoCreated {
    pub generation_id: String,
    pub status: String,
}

/// Treats missing and blank strings the same way.
fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(message.to_string()))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/ai/analyze - Analyze an image that is already hosted somewhere.
#[utoipa::path(
    post,
    path = "/api/ai/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Structured analysis of the image"),
        (status = 400, description = "Image URL is required"),
        (status = 500, description = "Vision vendor failed")
    )
)]
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AnalysisResult>>, ApiError> {
    let Json(req) = payload?;
    let image_url = required(req.image_url, "Image URL is required")?;

    let analysis = state
        .analyzer()
        .analyze_image(&image_url, req.query.as_deref())
        .await?;
    Ok(ok(analysis))
}

/// POST /api/ai/speech - Synthesize speech and return the raw MPEG audio.
#[utoipa::path(
    post,
    path = "/api/ai/speech",
    request_body = SpeechRequest,
    responses(
        (status = 200, description = "MPEG audio", content_type = "audio/mpeg"),
        (status = 400, description = "Text is required"),
        (status = 500, description = "Speech vendor failed")
    )
)]
pub async fn speech_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpeechRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let text = required(req.text, "Text is required")?;

    let audio = state
        .tts()
        .generate_audio(&text, req.voice_id.as_deref())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (header::CONTENT_LENGTH, audio.len().to_string()),
        ],
        audio,
    )
        .into_response())
}

/// POST /api/ai/video - Start a video generation job.
#[utoipa::path(
    post,
    path = "/api/ai/video",
    request_body = VideoCreateRequest,
    responses(
        (status = 200, description = "Generation accepted", body = VideoCreated),
        (status = 400, description = "Prompt is required"),
        (status = 500, description = "Video vendor failed")
    )
)]
pub async fn create_video_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VideoCreateRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<VideoCreated>>, ApiError> {
    let Json(req) = payload?;
    let prompt = required(req.prompt, "Prompt is required")?;

    let request = VideoRequest {
        prompt,
        duration: Some(req.duration.unwrap_or(VIDEO_DURATION_SECS)),
        style: Some(req.style.unwrap_or_else(|| VIDEO_STYLE.to_string())),
    };
    let generation_id = state.video().generate_video(&request).await?;
    info!(generation_id = %generation_id, "Video generation started.");

    Ok(ok(VideoCreated {
        generation_id,
        status: "processing".to_string(),
    }))
}

/// GET /api/ai/video/{generation_id} - Read the vendor's current record for a job.
#[utoipa::path(
    get,
    path = "/api/ai/video/{generation_id}",
    params(("generation_id" = String, Path, description = "Vendor generation identifier")),
    responses(
        (status = 200, description = "Current job record"),
        (status = 404, description = "Unknown generation"),
        (status = 500, description = "Video vendor failed")
    )
)]
pub async fn video_status_handler(
    State(state): State<Arc<AppState>>,
    Path(generation_id): Path<String>,
) -> Result<Json<ApiResponse<GenerationJob>>, ApiError> {
    let job = state.video().fetch_status(&generation_id).await?;
    Ok(ok(job))
}
