//! The upload relay server: one route, stateless across requests.
//!
//! `POST /upload` checks the admin bearer token before touching the body,
//! parses up to `max_files` files from the `images` multipart field, runs
//! each through the ingestion policy, forwards them to the media store in
//! the order received, and answers with the resulting URLs in that order.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::config::{ServerConfig, UPLOAD_FIELD};
use crate::errors::{AppError, AppResult};
use crate::storage::{IngestPolicy, MediaStore};
use crate::uploader::relay_client::UploadResponse;

/// Request bodies above this are refused outright; the per-image bounding
/// box makes anything larger pointless.
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<dyn MediaStore>,
}

impl AppState {
    pub fn new(config: ServerConfig, store: Arc<dyn MediaStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

pub fn router(state: AppState) -> Router {
    // The site is served from a different origin than the relay.
    Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Exact-match bearer check, run before any of the body is parsed.
fn authorize(headers: &HeaderMap, admin_token: &str) -> AppResult<()> {
    let expected = format!("Bearer {}", admin_token);
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    authorize(&headers, &state.config.admin_token)?;

    // Deferred extractor: auth must answer before anything about the body,
    // including a missing multipart content type.
    let mut multipart = multipart.map_err(|e| AppError::Multipart(e.body_text()))?;

    let max_files = state.config.max_files;
    let mut urls = Vec::new();
    let mut accepted = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            log::debug!("Ignoring unexpected multipart field {:?}", field.name());
            continue;
        }

        accepted += 1;
        if accepted > max_files {
            return Err(AppError::TooManyFiles {
                count: accepted,
                max: max_files,
            });
        }

        let name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload-{}", accepted));
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Multipart(e.to_string()))?;

        log::info!("Ingesting {} ({} bytes)", name, data.len());

        let ingested = {
            let name = name.clone();
            tokio::task::spawn_blocking(move || IngestPolicy::apply(&name, &data))
                .await
                .map_err(|e| AppError::Internal(format!("Ingestion task failed: {}", e)))??
        };

        let url = state.store.store(&ingested).await?;
        urls.push(url);
    }

    log::info!("Stored {} files", urls.len());
    Ok(Json(UploadResponse { urls }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_requires_exact_bearer_match() {
        let mut headers = HeaderMap::new();
        assert!(authorize(&headers, "secret").is_err());

        headers.insert(AUTHORIZATION, "Bearer wrong".parse().unwrap());
        assert!(authorize(&headers, "secret").is_err());

        headers.insert(AUTHORIZATION, "bearer secret".parse().unwrap());
        assert!(authorize(&headers, "secret").is_err());

        headers.insert(AUTHORIZATION, "Bearer secret".parse().unwrap());
        assert!(authorize(&headers, "secret").is_ok());
    }
}
