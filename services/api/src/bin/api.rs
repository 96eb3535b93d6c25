//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        tts::parse_voice, CloudinaryStorage, ElevenLabsTtsAdapter, InMemorySessionStore,
        JpegNormalizer, LumaVideoAdapter, OpenAiTtsAdapter, OpenAiVisionAdapter,
        RedisSessionStore,
    },
    config::{Config, SessionBackend, TtsProvider},
    error::ApiError,
    web::{self, ApiDoc, AppState},
};
use async_openai::{config::OpenAIConfig, types::audio::SpeechModel, Client};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tutor_core::{
    pipeline::Pipeline,
    ports::{SessionStore, TextToSpeechService},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(environment = ?config.environment, "Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let http = reqwest::Client::builder()
        .timeout(config.vendor_timeout)
        .build()
        .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;

    let openai_client =
        Client::with_config(OpenAIConfig::new().with_api_key(config.openai_api_key.clone()));

    let analyzer = Arc::new(OpenAiVisionAdapter::new(
        openai_client.clone(),
        config.vision_model.clone(),
    ));

    let tts: Arc<dyn TextToSpeechService> = match config.tts_provider {
        TtsProvider::ElevenLabs => {
            let api_key = config
                .elevenlabs_api_key
                .clone()
                .ok_or_else(|| ApiError::Internal("ELEVENLABS_API_KEY is required".to_string()))?;
            Arc::new(ElevenLabsTtsAdapter::new(
                http.clone(),
                api_key,
                config.elevenlabs_voice_id.clone(),
            ))
        }
        TtsProvider::OpenAi => {
            let voice = parse_voice(&config.openai_tts_voice).ok_or_else(|| {
                ApiError::Internal(format!(
                    "Invalid TTS voice specified in config: '{}'",
                    config.openai_tts_voice
                ))
            })?;
            Arc::new(OpenAiTtsAdapter::new(
                openai_client.clone(),
                SpeechModel::Tts1Hd,
                voice,
            ))
        }
    };
    info!(provider = ?config.tts_provider, "Speech adapter ready.");

    let storage = Arc::new(CloudinaryStorage::new(
        http.clone(),
        config.cloudinary_cloud_name.clone(),
        config.cloudinary_api_key.clone(),
        config.cloudinary_api_secret.clone(),
    ));
    let video = Arc::new(LumaVideoAdapter::new(http, config.luma_api_key.clone()));

    // --- 3. Connect the Session Store ---
    let sessions: Option<Arc<dyn SessionStore>> = match config.session_backend {
        SessionBackend::Redis => match RedisSessionStore::connect(&config.redis_url).await {
            Ok(store) => {
                info!("Connected to Redis session store.");
                Some(Arc::new(store))
            }
            Err(e) => {
                warn!("Redis unavailable, continuing without session storage: {}", e);
                None
            }
        },
        SessionBackend::Memory => {
            info!("Using in-memory session store.");
            Some(Arc::new(InMemorySessionStore::new()))
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        pipeline: Pipeline {
            normalizer: Arc::new(JpegNormalizer::default()),
            storage,
            analyzer,
            tts,
            video,
        },
        sessions,
        video_poll_interval: config.video_poll_interval,
    });

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS_ORIGIN '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let app = Router::new()
        .merge(web::router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
