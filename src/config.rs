use std::env;
use std::net::SocketAddr;

use crate::errors::{AppError, AppResult};

/// Folder on the media host that receives every upload.
pub const UPLOAD_FOLDER: &str = "grino-uploads";

/// Bounding box applied to every ingested image (Cloudinary `crop: limit`).
pub const MAX_IMAGE_WIDTH: u32 = 1200;
pub const MAX_IMAGE_HEIGHT: u32 = 800;

/// Multipart field name the site submits files under.
pub const UPLOAD_FIELD: &str = "images";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub admin_token: String,
    pub max_files: usize,
    pub cloudinary: CloudinaryConfig,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl ServerConfig {
    /// Read configuration from the environment (`.env` is loaded by `main`).
    pub fn from_env() -> AppResult<Self> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:4000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid BIND_ADDR: {}", e)))?;

        let max_files = match env::var("MAX_FILES") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid MAX_FILES: {}", e)))?,
            Err(_) => 10,
        };

        let config = Self {
            bind_addr,
            admin_token: require_env("ADMIN_TOKEN")?,
            max_files,
            cloudinary: CloudinaryConfig {
                cloud_name: require_env("CLOUDINARY_CLOUD_NAME")?,
                api_key: require_env("CLOUDINARY_API_KEY")?,
                api_secret: require_env("CLOUDINARY_API_SECRET")?,
            },
        };

        validate_config(&config)?;
        Ok(config)
    }
}

fn require_env(name: &str) -> AppResult<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{} must be set", name))),
    }
}

pub fn validate_config(config: &ServerConfig) -> AppResult<()> {
    if config.admin_token.trim().is_empty() {
        return Err(AppError::validation("admin_token", "Must not be empty"));
    }

    if config.max_files == 0 || config.max_files > 10 {
        return Err(AppError::validation("max_files", "Must be between 1 and 10"));
    }

    Ok(())
}
