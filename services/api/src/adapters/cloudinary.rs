//! services/api/src/adapters/cloudinary.rs
//!
//! Media storage backed by Cloudinary signed uploads. Implements the
//! `MediaStorageService` port.
//!
//! Requests are signed with SHA-256, so the Cloudinary account must be set to
//! accept SHA-256 signatures.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{error, info};
use tutor_core::{
    domain::{MediaKind, MediaUpload},
    ports::{MediaStorageService, PortError, PortResult},
};

pub const DEFAULT_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Credentials and endpoint for one Cloudinary account.
#[derive(Clone)]
pub struct CloudinaryStorage {
    http: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    base_url: String,
}

impl CloudinaryStorage {
    pub fn new(
        http: reqwest::Client,
        cloud_name: String,
        api_key: String,
        api_secret: String,
    ) -> Self {
        Self {
            http,
            cloud_name,
            api_key,
            api_secret,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn upload_url(&self, kind: MediaKind) -> String {
        format!(
            "{}/{}/{}/upload",
            self.base_url.trim_end_matches('/'),
            self.cloud_name,
            resource_type(kind)
        )
    }
}

/// Cloudinary files audio under the `video` resource type.
fn resource_type(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image",
        MediaKind::Audio => "video",
    }
}

fn file_name(media: &MediaUpload) -> String {
    match media.kind {
        MediaKind::Image => format!("{}.jpg", media.public_id),
        MediaKind::Audio => format!("{}.mp3", media.public_id),
    }
}

/// Signs the upload parameters: sorted `key=value` pairs joined by `&`, followed
/// by the API secret, hashed and hex encoded.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl MediaStorageService for CloudinaryStorage {
    async fn upload(&self, media: MediaUpload) -> PortResult<String> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[
                ("folder", media.folder.as_str()),
                ("public_id", media.public_id.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            &self.api_secret,
        );

        let size = media.data.len();
        let file = Part::bytes(media.data.to_vec()).file_name(file_name(&media));
        let form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", media.folder.clone())
            .text("public_id", media.public_id.clone())
            .text("signature", signature);

        let response = self
            .http
            .post(self.upload_url(media.kind))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("Cloudinary upload request failed: {}", e);
                PortError::Upstream(format!("Failed to store media: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!("Cloudinary returned {}: {}", status, detail);
            return Err(PortError::Upstream(format!(
                "Failed to store media: vendor returned {}",
                status
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| PortError::Upstream(format!("Malformed upload response: {}", e)))?;
        info!(
            "Stored {} bytes as {}/{}",
            size, media.folder, media.public_id
        );
        Ok(uploaded.secure_url)
    }
}
