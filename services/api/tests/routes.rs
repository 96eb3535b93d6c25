//! HTTP tests for the router, driven with `oneshot` against fake vendor ports.

use api_lib::adapters::InMemorySessionStore;
use api_lib::web::{router, AppState};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use tutor_core::domain::{
    AnalysisResult, Difficulty, GenerationJob, JobStatus, MediaUpload, VideoRequest,
};
use tutor_core::pipeline::Pipeline;
use tutor_core::ports::{
    ImageAnalysisService, ImageNormalizer, JobStatusSource, MediaStorageService, PortError,
    PortResult, SessionStore, TextToSpeechService, VideoGenerationService,
};

//=========================================================================================
// Fake Vendors
//=========================================================================================

#[derive(Default)]
struct FakeVendors {
    uploads: Mutex<Vec<String>>,
    video_requests: Mutex<Vec<VideoRequest>>,
}

#[async_trait]
impl ImageNormalizer for FakeVendors {
    async fn normalize(&self, image: &[u8]) -> PortResult<Vec<u8>> {
        Ok(image.to_vec())
    }
}

#[async_trait]
impl MediaStorageService for FakeVendors {
    async fn upload(&self, media: MediaUpload) -> PortResult<String> {
        let url = format!("https://cdn.test/{}/{}", media.folder, media.public_id);
        self.uploads.lock().unwrap().push(url.clone());
        Ok(url)
    }
}

#[async_trait]
impl ImageAnalysisService for FakeVendors {
    async fn analyze_image(&self, image_url: &str, _query: Option<&str>) -> PortResult<AnalysisResult> {
        if image_url.contains("broken") {
            return Err(PortError::Upstream("vision vendor returned 502".to_string()));
        }
        Ok(AnalysisResult {
            description: "A labelled diagram of a cell".to_string(),
            explanation: "Cells are the basic unit of life.".to_string(),
            key_points: vec!["Nucleus".to_string(), "Membrane".to_string()],
            difficulty: Difficulty::Beginner,
            subject: "General".to_string(),
        })
    }
}

#[async_trait]
impl TextToSpeechService for FakeVendors {
    async fn generate_audio(&self, text: &str, _voice_id: Option<&str>) -> PortResult<Vec<u8>> {
        Ok(format!("mp3:{}", text).into_bytes())
    }
}

#[async_trait]
impl JobStatusSource for FakeVendors {
    async fn fetch_status(&self, job_id: &str) -> PortResult<GenerationJob> {
        if job_id == "missing" {
            return Err(PortError::NotFound(format!("Generation {} not found", job_id)));
        }
        Ok(GenerationJob {
            id: job_id.to_string(),
            status: JobStatus::Completed,
            result_url: Some(format!("https://cdn.test/{}.mp4", job_id)),
            error: None,
        })
    }
}

#[async_trait]
impl VideoGenerationService for FakeVendors {
    async fn generate_video(&self, request: &VideoRequest) -> PortResult<String> {
        self.video_requests.lock().unwrap().push(request.clone());
        Ok("gen-42".to_string())
    }
}

fn app_with(vendors: Arc<FakeVendors>, sessions: Option<Arc<dyn SessionStore>>) -> Router {
    let state = AppState {
        pipeline: Pipeline {
            normalizer: vendors.clone(),
            storage: vendors.clone(),
            analyzer: vendors.clone(),
            tts: vendors.clone(),
            video: vendors,
        },
        sessions,
        video_poll_interval: Duration::from_millis(10),
    };
    router(Arc::new(state))
}

fn app() -> Router {
    app_with(
        Arc::new(FakeVendors::default()),
        Some(Arc::new(InMemorySessionStore::new())),
    )
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

const BOUNDARY: &str = "tutor-test-boundary";

/// Builds a multipart body from `(name, content_type, bytes)` parts.
fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, content_type, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match content_type {
            Some(ct) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"upload\"\r\nContent-Type: {}\r\n\r\n",
                        name, ct
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

//=========================================================================================
// Health
//=========================================================================================

#[tokio::test]
async fn health_reports_ok() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "OK");
    assert!(json["timestamp"].is_string());
}

//=========================================================================================
// Sessions
//=========================================================================================

#[tokio::test]
async fn saved_session_comes_back_byte_identical() {
    let app = app();
    let data = r#"{"notes":["b","a"],"score":1.50,"nested":{"z":null,"a":true}}"#;
    let body = format!(r#"{{"sessionId":"session_1","data":{}}}"#, data);

    let response = app.clone().oneshot(post_json("/api/session/save", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Session saved successfully");

    let response = app.oneshot(get("/api/session/session_1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let raw = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(raw, format!(r#"{{"success":true,"data":{}}}"#, data));
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let response = app().oneshot(get("/api/session/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["message"], "Session not found");
}

#[tokio::test]
async fn deleted_session_is_gone() {
    let app = app();
    app.clone()
        .oneshot(post_json(
            "/api/session/save",
            r#"{"sessionId":"s2","data":{"step":3}}"#,
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/session/s2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Session deleted successfully");

    let response = app.oneshot(get("/api/session/s2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn save_requires_id_and_non_null_data() {
    for body in [
        r#"{"data":{"a":1}}"#,
        r#"{"sessionId":"s3"}"#,
        r#"{"sessionId":"s3","data":null}"#,
        r#"{"sessionId":"","data":{"a":1}}"#,
    ] {
        let response = app().oneshot(post_json("/api/session/save", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "Session ID and data are required");
    }
}

#[tokio::test]
async fn without_a_store_get_is_unavailable_but_writes_ack() {
    let app = app_with(Arc::new(FakeVendors::default()), None);

    let response = app
        .clone()
        .oneshot(post_json("/api/session/save", r#"{"sessionId":"s4","data":[1]}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/session/s4")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

//=========================================================================================
// Single-Stage AI Routes
//=========================================================================================

#[tokio::test]
async fn analyze_requires_an_image_url() {
    let response = app().oneshot(post_json("/api/ai/analyze", "{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["message"], "Image URL is required");
}

#[tokio::test]
async fn analyze_returns_the_structured_result() {
    let response = app()
        .oneshot(post_json("/api/ai/analyze", r#"{"imageUrl":"https://cdn.test/a.jpg"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["difficulty"], "beginner");
    assert_eq!(json["data"]["keyPoints"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn vendor_failures_surface_as_500() {
    let response = app()
        .oneshot(post_json("/api/ai/analyze", r#"{"imageUrl":"https://broken.test/a.jpg"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let response = app().oneshot(post_json("/api/ai/speech", "{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn speech_returns_raw_mpeg_audio() {
    let response = app()
        .oneshot(post_json("/api/ai/speech", r#"{"text":"hello"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "9");
    assert_eq!(body_bytes(response).await, b"mp3:hello");
}

#[tokio::test]
async fn speech_requires_text() {
    let response = app()
        .oneshot(post_json("/api/ai/speech", r#"{"text":"   "}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["message"], "Text is required");
}

#[tokio::test]
async fn video_creation_fills_in_defaults() {
    let vendors = Arc::new(FakeVendors::default());
    let app = app_with(vendors.clone(), None);

    let response = app
        .oneshot(post_json("/api/ai/video", r#"{"prompt":"photosynthesis"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["generationId"], "gen-42");
    assert_eq!(json["data"]["status"], "processing");

    let requests = vendors.video_requests.lock().unwrap();
    assert_eq!(requests[0].duration, Some(30));
    assert_eq!(requests[0].style.as_deref(), Some("educational"));
}

#[tokio::test]
async fn video_status_passes_the_vendor_record_through() {
    let response = app().oneshot(get("/api/ai/video/gen-7")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], "gen-7");
    assert_eq!(json["data"]["status"], "completed");
    assert_eq!(json["data"]["resultUrl"], "https://cdn.test/gen-7.mp4");
}

#[tokio::test]
async fn unknown_video_is_not_found() {
    let response = app().oneshot(get("/api/ai/video/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

//=========================================================================================
// Full Pipeline Upload
//=========================================================================================

#[tokio::test]
async fn upload_runs_the_whole_pipeline() {
    let vendors = Arc::new(FakeVendors::default());
    let app = app_with(vendors.clone(), None);

    let request = multipart(&[
        ("image", Some("image/png"), b"\x89PNG fake bytes"),
        ("query", None, b"What organelles are shown?"),
    ]);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert!(data["imageUrl"].as_str().unwrap().starts_with("https://cdn.test/tutor-bot/analysis_"));
    assert!(data["audioUrl"].as_str().unwrap().starts_with("https://cdn.test/tutor-bot/audio/audio_"));
    assert_eq!(data["videoGenerationId"], "gen-42");
    assert!(data["sessionId"].as_str().unwrap().starts_with("session_"));
    assert_eq!(data["analysis"]["subject"], "General");

    assert_eq!(vendors.uploads.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn upload_without_an_image_is_rejected() {
    let request = multipart(&[("query", None, b"anything")]);
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["message"], "No image file provided");
}

#[tokio::test]
async fn upload_of_a_non_image_is_rejected() {
    let request = multipart(&[("image", Some("application/pdf"), b"%PDF-1.4")]);
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["message"], "Only image files are allowed");
}
