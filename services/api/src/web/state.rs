//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;
use std::time::Duration;
use tutor_core::{
    pipeline::Pipeline,
    ports::{ImageAnalysisService, SessionStore, TextToSpeechService, VideoGenerationService},
};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Owns every vendor port; the single-stage routes reuse them.
    pub pipeline: Pipeline,
    /// `None` when no session store could be reached at startup.
    pub sessions: Option<Arc<dyn SessionStore>>,
    /// Interval between status requests on a video watch socket.
    pub video_poll_interval: Duration,
}

impl AppState {
    pub fn analyzer(&self) -> &Arc<dyn ImageAnalysisService> {
        &self.pipeline.analyzer
    }

    pub fn tts(&self) -> &Arc<dyn TextToSpeechService> {
        &self.pipeline.tts
    }

    pub fn video(&self) -> &Arc<dyn VideoGenerationService> {
        &self.pipeline.video
    }
}
