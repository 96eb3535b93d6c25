//! crates/tutor_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific vendors like OpenAI, ElevenLabs, Luma or Redis.

use crate::domain::{AnalysisResult, GenerationJob, MediaUpload, VideoRequest};
use async_trait::async_trait;
use std::time::Duration;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP, Redis).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Upstream service failed: {0}")]
    Upstream(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Vendor Ports
//=========================================================================================

#[async_trait]
pub trait ImageAnalysisService: Send + Sync {
    /// Analyses the image at `image_url`, optionally focused on a user question.
    async fn analyze_image(&self, image_url: &str, query: Option<&str>)
        -> PortResult<AnalysisResult>;
}

#[async_trait]
pub trait TextToSpeechService: Send + Sync {
    /// Generates MPEG audio from a string of text. `voice_id` overrides the configured voice.
    async fn generate_audio(&self, text: &str, voice_id: Option<&str>) -> PortResult<Vec<u8>>;
}

/// Reads the status of a generation job. Split out of [`VideoGenerationService`]
/// so the poller only depends on what it calls.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn fetch_status(&self, job_id: &str) -> PortResult<GenerationJob>;
}

#[async_trait]
pub trait VideoGenerationService: JobStatusSource {
    /// Starts a generation job and returns the vendor's job identifier.
    async fn generate_video(&self, request: &VideoRequest) -> PortResult<String>;
}

#[async_trait]
pub trait MediaStorageService: Send + Sync {
    /// Stores an artifact and returns its public URL.
    async fn upload(&self, media: MediaUpload) -> PortResult<String>;
}

#[async_trait]
pub trait ImageNormalizer: Send + Sync {
    /// Re-encodes an uploaded image into the size and format sent to the vendors.
    async fn normalize(&self, image: &[u8]) -> PortResult<Vec<u8>>;
}

//=========================================================================================
// Session Store Port
//=========================================================================================

/// Ephemeral, expiring storage of session payloads.
///
/// Payloads are raw JSON text and must come back byte-for-byte as stored.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session_id: &str, payload: &str, ttl: Duration) -> PortResult<()>;

    /// Returns `None` for unknown or expired sessions.
    async fn load(&self, session_id: &str) -> PortResult<Option<String>>;

    async fn delete(&self, session_id: &str) -> PortResult<()>;
}
