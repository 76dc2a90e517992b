//! Ingestion policy and the hosted media store behind the relay.
//!
//! The relay itself persists nothing. Every accepted file is normalized by
//! [`IngestPolicy`] (allowed formats, bounding-box resize) and handed to a
//! [`MediaStore`], which returns the file's resulting remote location.

use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::ImageFormat;
use reqwest::multipart;
use sha2::{Digest, Sha256};

use crate::config::{CloudinaryConfig, MAX_IMAGE_HEIGHT, MAX_IMAGE_WIDTH, UPLOAD_FOLDER};
use crate::errors::{AppError, AppResult};

const STORED_JPEG_QUALITY: u8 = 85;

/// A file that passed ingestion and is ready for the media host.
#[derive(Debug, Clone)]
pub struct IngestedImage {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// The storage layer's ingestion policy: JPEG and PNG only, limited to a
/// 1200x800 bounding box (larger images are scaled down preserving aspect
/// ratio, smaller ones pass through byte-identical).
pub struct IngestPolicy;

impl IngestPolicy {
    pub fn apply(name: &str, bytes: &[u8]) -> AppResult<IngestedImage> {
        let format = image::guess_format(bytes).map_err(|_| AppError::invalid_file_type(name))?;

        let media_type = match format {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            _ => return Err(AppError::invalid_file_type(name)),
        };

        let img = image::load_from_memory_with_format(bytes, format)?;

        if img.width() <= MAX_IMAGE_WIDTH && img.height() <= MAX_IMAGE_HEIGHT {
            return Ok(IngestedImage {
                name: name.to_string(),
                media_type: media_type.to_string(),
                bytes: bytes.to_vec(),
            });
        }

        let resized = img.resize(
            MAX_IMAGE_WIDTH,
            MAX_IMAGE_HEIGHT,
            image::imageops::FilterType::Lanczos3,
        );
        log::info!(
            "Resized {} from {}x{} to {}x{}",
            name,
            img.width(),
            img.height(),
            resized.width(),
            resized.height()
        );

        let mut output = Vec::new();
        match format {
            ImageFormat::Jpeg => {
                let encoder =
                    JpegEncoder::new_with_quality(Cursor::new(&mut output), STORED_JPEG_QUALITY);
                resized.to_rgb8().write_with_encoder(encoder)?;
            }
            ImageFormat::Png => {
                resized.write_with_encoder(PngEncoder::new(Cursor::new(&mut output)))?;
            }
            _ => unreachable!("format checked above"),
        }

        Ok(IngestedImage {
            name: name.to_string(),
            media_type: media_type.to_string(),
            bytes: output,
        })
    }
}

/// Hosted storage for ingested images. Implementations return the remote
/// location of each stored file.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn store(&self, image: &IngestedImage) -> AppResult<String>;
}

/// Cloudinary's upload API, with SHA-256 signed requests.
pub struct CloudinaryStore {
    client: reqwest::Client,
    base_url: String,
    config: CloudinaryConfig,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self::with_base_url(config, "https://api.cloudinary.com")
    }

    pub fn with_base_url(config: CloudinaryConfig, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            config,
        }
    }

    /// Signature over the alphabetically sorted upload parameters plus the
    /// API secret, per Cloudinary's signing scheme.
    fn sign(&self, folder: &str, timestamp: i64) -> String {
        let to_sign = format!(
            "folder={}&timestamp={}{}",
            folder, timestamp, self.config.api_secret
        );
        hex::encode(Sha256::digest(to_sign.as_bytes()))
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn store(&self, image: &IngestedImage) -> AppResult<String> {
        let timestamp = Utc::now().timestamp();
        let signature = self.sign(UPLOAD_FOLDER, timestamp);

        let part = multipart::Part::bytes(image.bytes.clone())
            .file_name(image.name.clone())
            .mime_str(&image.media_type)?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", UPLOAD_FOLDER.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256".to_string());

        let url = format!(
            "{}/v1_1/{}/image/upload",
            self.base_url, self.config.cloud_name
        );

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| {
                    v.pointer("/error/message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| format!("Media host returned {}", status));
            return Err(AppError::storage(&message));
        }

        let body: serde_json::Value = response.json().await?;
        body.get("secure_url")
            .and_then(|u| u.as_str())
            .map(str::to_string)
            .ok_or_else(|| AppError::storage("Media host response had no secure_url"))
    }
}

/// In-process store used by tests: records what was stored and hands back
/// deterministic URLs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    stored: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored_names(&self) -> Vec<String> {
        self.stored
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn count(&self) -> usize {
        self.stored.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn store(&self, image: &IngestedImage) -> AppResult<String> {
        let mut stored = self.stored.lock().unwrap_or_else(|e| e.into_inner());
        stored.push(image.name.clone());
        Ok(format!(
            "https://media.test/{}/{}-{}",
            UPLOAD_FOLDER,
            stored.len() - 1,
            image.name
        ))
    }
}
