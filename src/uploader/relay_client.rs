use reqwest::{multipart, Client};
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::config::UPLOAD_FIELD;
use crate::errors::{AppError, AppResult, ErrorBody};
use crate::staging::StagedFile;

/// Fallback surfaced when the server rejects an upload without a usable
/// error body.
pub const GENERIC_UPLOAD_ERROR: &str = "Upload failed.";

/// Success body of the relay's upload route, shared between the panel client
/// and the server: one URL per accepted file, in the order received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub urls: Vec<String>,
}

/// HTTP client for the upload relay.
pub struct RelayClient {
    client: Client,
    base_url: String,
    token: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()?,
            base_url: base_url.into(),
            token: token.into(),
        })
    }

    /// Send every staged file in one multipart request. All-or-nothing: any
    /// failure fails the whole upload, and nothing is retried.
    pub async fn upload(&self, files: &[StagedFile]) -> AppResult<Vec<String>> {
        let mut form = multipart::Form::new();
        for file in files {
            let part = multipart::Part::bytes(file.bytes.to_vec())
                .file_name(file.name.clone())
                .mime_str(&file.media_type)?;
            form = form.part(UPLOAD_FIELD, part);
        }

        let url = format!("{}/upload", self.base_url);
        log::info!("Uploading {} staged files to {}", files.len(), url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let reason = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| GENERIC_UPLOAD_ERROR.to_string());
            log::warn!("Upload rejected with {}: {}", status, reason);
            return Err(AppError::UploadFailed { reason });
        }

        let body: UploadResponse = response.json().await?;
        log::info!("Upload accepted, {} URLs returned", body.urls.len());
        Ok(body.urls)
    }
}
