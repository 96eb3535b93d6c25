//! services/api/src/adapters/elevenlabs.rs
//!
//! Text-to-speech through the ElevenLabs REST API. This is the default
//! `TextToSpeechService` implementation.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use tracing::error;
use tutor_core::ports::{PortError, PortResult, TextToSpeechService};

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";
const MODEL_ID: &str = "eleven_multilingual_v2";

#[derive(Serialize)]
struct SpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
    use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.5,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

/// An adapter that implements `TextToSpeechService` against ElevenLabs.
#[derive(Clone)]
pub struct ElevenLabsTtsAdapter {
    http: reqwest::Client,
    api_key: String,
    default_voice: String,
    base_url: String,
}

impl ElevenLabsTtsAdapter {
    pub fn new(http: reqwest::Client, api_key: String, default_voice: String) -> Self {
        Self {
            http,
            api_key,
            default_voice,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn speech_url(&self, voice: &str) -> String {
        format!("{}/text-to-speech/{}", self.base_url.trim_end_matches('/'), voice)
    }
}

#[async_trait]
impl TextToSpeechService for ElevenLabsTtsAdapter {
    async fn generate_audio(&self, text: &str, voice_id: Option<&str>) -> PortResult<Vec<u8>> {
        let voice = voice_id.unwrap_or(&self.default_voice);
        let body = SpeechBody {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings::default(),
        };

        let response = self
            .http
            .post(self.speech_url(voice))
            .header(ACCEPT, "audio/mpeg")
            .header(CONTENT_TYPE, "application/json")
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("ElevenLabs request failed: {}", e);
                PortError::Upstream(format!("Failed to generate speech: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!("ElevenLabs returned {}: {}", status, detail);
            return Err(PortError::Upstream(format!(
                "Failed to generate speech: vendor returned {}",
                status
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| PortError::Upstream(format!("Failed to read speech audio: {}", e)))?;
        Ok(audio.to_vec())
    }
}
