//! crates/tutor_core/src/pipeline.rs
//!
//! The content generation pipeline for a single upload.
//!
//! Stages run strictly in sequence and the first failure aborts the rest.
//! Artifacts stored by earlier stages are left in place.

use crate::domain::{
    AnalysisResult, MediaKind, MediaUpload, PipelineOutput, UploadRequest, VideoRequest,
};
use crate::ports::{
    ImageAnalysisService, ImageNormalizer, MediaStorageService, PortResult, TextToSpeechService,
    VideoGenerationService,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

pub const IMAGE_FOLDER: &str = "tutor-bot";
pub const AUDIO_FOLDER: &str = "tutor-bot/audio";
pub const VIDEO_DURATION_SECS: u32 = 30;
pub const VIDEO_STYLE: &str = "educational";

/// The ports the pipeline drives, in the order it calls them.
#[derive(Clone)]
pub struct Pipeline {
    pub normalizer: Arc<dyn ImageNormalizer>,
    pub storage: Arc<dyn MediaStorageService>,
    pub analyzer: Arc<dyn ImageAnalysisService>,
    pub tts: Arc<dyn TextToSpeechService>,
    pub video: Arc<dyn VideoGenerationService>,
}

impl Pipeline {
    /// Runs every stage for one upload and returns all produced artifacts.
    pub async fn run(&self, upload: UploadRequest) -> PortResult<PipelineOutput> {
        let start_time = Instant::now();
        info!("Pipeline started for a {} byte upload.", upload.image.len());

        let result = self.run_stages(upload).await;
        match &result {
            Ok(output) => info!(
                session_id = %output.session_id,
                video_generation_id = %output.video_generation_id,
                "⏱️ Pipeline finished in {:?}",
                start_time.elapsed()
            ),
            Err(e) => error!("Pipeline aborted after {:?}: {}", start_time.elapsed(), e),
        }
        result
    }

    async fn run_stages(&self, upload: UploadRequest) -> PortResult<PipelineOutput> {
        let stage = Instant::now();
        let normalized = self.normalizer.normalize(&upload.image).await?;
        info!("⏱️ Image normalization took: {:?}", stage.elapsed());

        let stage = Instant::now();
        let image_url = self
            .storage
            .upload(MediaUpload {
                kind: MediaKind::Image,
                folder: IMAGE_FOLDER.to_string(),
                public_id: format!("analysis_{}", Utc::now().timestamp_millis()),
                data: normalized.into(),
            })
            .await?;
        info!("⏱️ Image upload took: {:?}", stage.elapsed());

        let stage = Instant::now();
        let analysis = self
            .analyzer
            .analyze_image(&image_url, upload.query.as_deref())
            .await?;
        info!("⏱️ Image analysis took: {:?}", stage.elapsed());

        let stage = Instant::now();
        let speech = self.tts.generate_audio(&analysis.explanation, None).await?;
        info!("⏱️ Speech synthesis took: {:?}", stage.elapsed());

        let stage = Instant::now();
        let audio_url = self
            .storage
            .upload(MediaUpload {
                kind: MediaKind::Audio,
                folder: AUDIO_FOLDER.to_string(),
                public_id: format!("audio_{}", Utc::now().timestamp_millis()),
                data: speech.into(),
            })
            .await?;
        info!("⏱️ Audio upload took: {:?}", stage.elapsed());

        let stage = Instant::now();
        let video_generation_id = self
            .video
            .generate_video(&VideoRequest {
                prompt: video_prompt(&analysis),
                duration: Some(VIDEO_DURATION_SECS),
                style: Some(VIDEO_STYLE.to_string()),
            })
            .await?;
        info!("⏱️ Video request took: {:?}", stage.elapsed());

        Ok(PipelineOutput {
            image_url,
            analysis,
            audio_url,
            video_generation_id,
            session_id: new_session_id(),
        })
    }
}

/// Builds the prompt sent to the video vendor from an analysis.
pub fn video_prompt(analysis: &AnalysisResult) -> String {
    format!(
        "Educational animation explaining: {}. Key points: {}. Style: {} level, {} subject.",
        analysis.description,
        analysis.key_points.join(", "),
        analysis.difficulty,
        analysis.subject
    )
}

/// Generates an opaque session identifier: `session_{unix_millis}_{9 alphanumerics}`.
pub fn new_session_id() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("session_{}_{}", Utc::now().timestamp_millis(), suffix)
}
