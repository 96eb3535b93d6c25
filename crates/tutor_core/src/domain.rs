//! crates/tutor_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! These structs are independent of any vendor or web framework. They derive
//! `serde` so the web layer can hand them straight to the client.

use serde::{Deserialize, Serialize};
use std::fmt;

//=========================================================================================
// Image Analysis
//=========================================================================================

/// How demanding the analysed material is for a learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured record derived from one vision model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub description: String,
    /// The vendor's full response text, unmodified.
    pub explanation: String,
    pub key_points: Vec<String>,
    pub difficulty: Difficulty,
    pub subject: String,
}

//=========================================================================================
// Video Generation
//=========================================================================================

/// Status of a vendor-side generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Returns true for states from which the vendor never moves on.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// A video generation job as reported by the vendor. The system never writes
/// a status itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A request to start a video generation job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoRequest {
    pub prompt: String,
    pub duration: Option<u32>,
    pub style: Option<String>,
}

//=========================================================================================
// Media Storage
//=========================================================================================

/// The kind of artifact being stored. Decides the storage folder and resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

/// An artifact to persist in media storage.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub kind: MediaKind,
    pub folder: String,
    pub public_id: String,
    pub data: bytes::Bytes,
}

//=========================================================================================
// Pipeline
//=========================================================================================

/// A single image upload entering the pipeline.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub image: bytes::Bytes,
    pub query: Option<String>,
}

/// Everything produced for one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub image_url: String,
    pub analysis: AnalysisResult,
    pub audio_url: String,
    pub video_generation_id: String,
    pub session_id: String,
}
