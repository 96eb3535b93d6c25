pub mod ai;
pub mod health;
pub mod middleware;
pub mod openapi;
pub mod protocol;
pub mod response;
pub mod session;
pub mod state;
pub mod upload;
pub mod video_ws;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Uploads larger than this are rejected before reaching a handler.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Builds every application route. CORS and Swagger UI are layered on by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/upload/analyze", post(upload::upload_handler))
        .route("/ai/analyze", post(ai::analyze_handler))
        .route("/ai/speech", post(ai::speech_handler))
        .route("/ai/video", post(ai::create_video_handler))
        .route("/ai/video/{generation_id}", get(ai::video_status_handler))
        .route(
            "/ai/video/{generation_id}/watch",
            get(video_ws::watch_video_handler),
        )
        .route("/session/save", post(session::save_session_handler))
        .route(
            "/session/{session_id}",
            get(session::get_session_handler).delete(session::delete_session_handler),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(axum_middleware::from_fn(middleware::log_requests))
        .with_state(state)
}
