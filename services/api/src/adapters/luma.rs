//! services/api/src/adapters/luma.rs
//!
//! Video generation through the Luma Dream Machine API. Implements both
//! `VideoGenerationService` and the `JobStatusSource` the poller reads from.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use tutor_core::{
    domain::{GenerationJob, JobStatus, VideoRequest},
    ports::{JobStatusSource, PortError, PortResult, VideoGenerationService},
};

pub const DEFAULT_BASE_URL: &str = "https://api.lumalabs.ai/dream-machine/v1";
const DEFAULT_DURATION_SECS: u32 = 5;
const DEFAULT_STYLE: &str = "realistic";
const ASPECT_RATIO: &str = "16:9";

//=========================================================================================
// Vendor Payloads
//=========================================================================================

#[derive(Serialize)]
struct CreateGenerationBody<'a> {
    prompt: &'a str,
    duration: u32,
    style: &'a str,
    aspect_ratio: &'a str,
}

impl<'a> CreateGenerationBody<'a> {
    fn from_request(request: &'a VideoRequest) -> Self {
        Self {
            prompt: &request.prompt,
            duration: request.duration.unwrap_or(DEFAULT_DURATION_SECS),
            style: request.style.as_deref().unwrap_or(DEFAULT_STYLE),
            aspect_ratio: ASPECT_RATIO,
        }
    }
}

#[derive(Deserialize)]
struct CreatedGeneration {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GenerationRecord {
    id: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    failure_reason: Option<String>,
    #[serde(default)]
    assets: Option<GenerationAssets>,
}

#[derive(Debug, Deserialize)]
struct GenerationAssets {
    #[serde(default)]
    video: Option<String>,
}

impl GenerationRecord {
    fn into_job(self) -> GenerationJob {
        GenerationJob {
            id: self.id,
            status: map_state(self.state.as_deref()),
            result_url: self.assets.and_then(|a| a.video),
            error: self.failure_reason,
        }
    }
}

/// Maps a Luma generation state onto the job status. Unknown states count as still running.
fn map_state(state: Option<&str>) -> JobStatus {
    match state {
        Some("queued") | Some("pending") => JobStatus::Pending,
        Some("completed") => JobStatus::Completed,
        Some("failed") => JobStatus::Failed,
        _ => JobStatus::Processing,
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct LumaVideoAdapter {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl LumaVideoAdapter {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn generations_url(&self) -> String {
        format!("{}/generations", self.base_url.trim_end_matches('/'))
    }

    async fn check(response: reqwest::Response, action: &str) -> PortResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        error!("Luma returned {} while trying to {}: {}", status, action, detail);
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PortError::NotFound("Video generation not found".to_string()));
        }
        Err(PortError::Upstream(format!(
            "Failed to {}: vendor returned {}",
            action, status
        )))
    }
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl JobStatusSource for LumaVideoAdapter {
    async fn fetch_status(&self, job_id: &str) -> PortResult<GenerationJob> {
        let response = self
            .http
            .get(format!("{}/{}", self.generations_url(), job_id))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| {
                error!("Luma status request failed: {}", e);
                PortError::Upstream(format!("Failed to check video status: {}", e))
            })?;
        let response = Self::check(response, "check video status").await?;

        let record: GenerationRecord = response.json().await.map_err(|e| {
            PortError::Upstream(format!("Malformed video status response: {}", e))
        })?;
        debug!(job_id = %record.id, state = ?record.state, "Fetched video status.");
        Ok(record.into_job())
    }
}

#[async_trait]
impl VideoGenerationService for LumaVideoAdapter {
    async fn generate_video(&self, request: &VideoRequest) -> PortResult<String> {
        let body = CreateGenerationBody::from_request(request);

        let response = self
            .http
            .post(self.generations_url())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Luma generation request failed: {}", e);
                PortError::Upstream(format!("Failed to generate video: {}", e))
            })?;
        let response = Self::check(response, "generate video").await?;

        let created: CreatedGeneration = response.json().await.map_err(|e| {
            PortError::Upstream(format!("Malformed video generation response: {}", e))
        })?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_states_map_onto_job_statuses() {
        assert_eq!(map_state(Some("queued")), JobStatus::Pending);
        assert_eq!(map_state(Some("dreaming")), JobStatus::Processing);
        assert_eq!(map_state(Some("completed")), JobStatus::Completed);
        assert_eq!(map_state(Some("failed")), JobStatus::Failed);
        assert_eq!(map_state(Some("something-new")), JobStatus::Processing);
        assert_eq!(map_state(None), JobStatus::Processing);
    }

    #[test]
    fn completed_record_carries_the_video_url() {
        let record: GenerationRecord = serde_json::from_str(
            r#"{
                "id": "gen-1",
                "state": "completed",
                "failure_reason": null,
                "assets": { "video": "https://storage.cdn-luma.com/gen-1.mp4", "image": null },
                "created_at": "2024-06-01T10:00:00Z"
            }"#,
        )
        .unwrap();
        let job = record.into_job();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result_url.as_deref(), Some("https://storage.cdn-luma.com/gen-1.mp4"));
        assert!(job.error.is_none());
    }

    #[test]
    fn failed_record_carries_the_reason() {
        let record: GenerationRecord =
            serde_json::from_str(r#"{ "id": "gen-2", "state": "failed", "failure_reason": "nsfw" }"#)
                .unwrap();
        let job = record.into_job();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("nsfw"));
        assert!(job.result_url.is_none());
    }

    #[test]
    fn request_defaults_apply_when_fields_are_missing() {
        let request = VideoRequest {
            prompt: "cells dividing".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(CreateGenerationBody::from_request(&request)).unwrap();
        assert_eq!(json["duration"], 5);
        assert_eq!(json["style"], "realistic");
        assert_eq!(json["aspect_ratio"], "16:9");
    }
}
