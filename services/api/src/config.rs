//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which deployment the server runs in. Decides how much error detail reaches clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Unspecified,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "production" | "prod" => Environment::Production,
            _ => Environment::Unspecified,
        }
    }

    /// Reads `APP_ENV` from the process environment.
    pub fn current() -> Self {
        std::env::var("APP_ENV")
            .map(|v| Self::parse(&v))
            .unwrap_or(Environment::Unspecified)
    }
}

/// Which vendor turns explanations into speech.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TtsProvider {
    ElevenLabs,
    OpenAi,
}

/// Where session payloads live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionBackend {
    Redis,
    Memory,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub environment: Environment,
    pub cors_origin: String,
    pub openai_api_key: String,
    pub vision_model: String,
    pub tts_provider: TtsProvider,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_voice_id: String,
    pub openai_tts_voice: String,
    pub luma_api_key: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    pub session_backend: SessionBackend,
    pub redis_url: String,
    pub video_poll_interval: Duration,
    pub vendor_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let environment = Environment::current();
        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // --- Vision ---
        let openai_api_key = required("OPENAI_API_KEY")?;
        let vision_model = std::env::var("VISION_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        // --- Speech ---
        let tts_provider = match std::env::var("TTS_PROVIDER")
            .unwrap_or_else(|_| "elevenlabs".to_string())
            .to_lowercase()
            .as_str()
        {
            "elevenlabs" => TtsProvider::ElevenLabs,
            "openai" => TtsProvider::OpenAi,
            other => {
                return Err(ConfigError::InvalidValue(
                    "TTS_PROVIDER".to_string(),
                    format!("'{}' is not one of elevenlabs, openai", other),
                ))
            }
        };
        let elevenlabs_api_key = std::env::var("ELEVENLABS_API_KEY").ok();
        if tts_provider == TtsProvider::ElevenLabs && elevenlabs_api_key.is_none() {
            return Err(ConfigError::MissingVar("ELEVENLABS_API_KEY".to_string()));
        }
        let elevenlabs_voice_id =
            std::env::var("ELEVENLABS_VOICE_ID").unwrap_or_else(|_| "default".to_string());
        let openai_tts_voice =
            std::env::var("OPENAI_TTS_VOICE").unwrap_or_else(|_| "alloy".to_string());

        // --- Video and Media Storage ---
        let luma_api_key = required("LUMA_API_KEY")?;
        let cloudinary_cloud_name = required("CLOUDINARY_CLOUD_NAME")?;
        let cloudinary_api_key = required("CLOUDINARY_API_KEY")?;
        let cloudinary_api_secret = required("CLOUDINARY_API_SECRET")?;

        // --- Session Store ---
        let session_backend = match std::env::var("SESSION_STORE")
            .unwrap_or_else(|_| "redis".to_string())
            .to_lowercase()
            .as_str()
        {
            "redis" => SessionBackend::Redis,
            "memory" => SessionBackend::Memory,
            other => {
                return Err(ConfigError::InvalidValue(
                    "SESSION_STORE".to_string(),
                    format!("'{}' is not one of redis, memory", other),
                ))
            }
        };
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        // --- Timing ---
        let video_poll_interval = Duration::from_secs(seconds("VIDEO_POLL_INTERVAL_SECS", 10)?);
        let vendor_timeout = Duration::from_secs(seconds("VENDOR_TIMEOUT_SECS", 300)?);

        Ok(Self {
            bind_address,
            log_level,
            environment,
            cors_origin,
            openai_api_key,
            vision_model,
            tts_provider,
            elevenlabs_api_key,
            elevenlabs_voice_id,
            openai_tts_voice,
            luma_api_key,
            cloudinary_cloud_name,
            cloudinary_api_key,
            cloudinary_api_secret,
            session_backend,
            redis_url,
            video_poll_interval,
            vendor_timeout,
        })
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn seconds(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(0) | Err(_) => Err(ConfigError::InvalidValue(
                name.to_string(),
                format!("'{}' is not a positive number of seconds", raw),
            )),
            Ok(secs) => Ok(secs),
        },
        Err(_) => Ok(default),
    }
}
