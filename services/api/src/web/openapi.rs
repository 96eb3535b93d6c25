//! services/api/src/web/openapi.rs
//!
//! The master definition for the OpenAPI document served next to Swagger UI
//! and written to disk by the `openapi` binary.

use crate::web::{ai, health, session, upload};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        upload::upload_handler,
        ai::analyze_handler,
        ai::speech_handler,
        ai::create_video_handler,
        ai::video_status_handler,
        session::save_session_handler,
        session::get_session_handler,
        session::delete_session_handler,
        health::health_handler,
    ),
    components(
        schemas(
            ai::AnalyzeRequest,
            ai::SpeechRequest,
            ai::VideoCreateRequest,
            ai::VideoCreated,
            session::SaveSessionRequest,
            health::HealthResponse,
        )
    ),
    tags(
        (name = "Tutor Bot API", description = "Image analysis, narration and video generation for study material.")
    )
)]
pub struct ApiDoc;
