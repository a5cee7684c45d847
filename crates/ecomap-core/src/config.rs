//! Configuration module
//!
//! Settings for the image host and the issue tracker, read from the
//! environment (a `.env` file is loaded first when present).

use std::env;
use std::time::Duration;

use crate::error::UploadError;

const MAX_FILE_SIZE_MB: usize = 10;
const COMPRESS_THRESHOLD_BYTES: usize = 1024 * 1024;
const MAX_WIDTH: u32 = 1920;
const JPEG_QUALITY: f32 = 0.8;
const HTTP_TIMEOUT_SECS: u64 = 60;
const DEFAULT_UPLOAD_API_BASE: &str = "https://api.cloudinary.com";
const DEFAULT_SITE_URL: &str = "http://localhost:8080";
const DEFAULT_DELETE_PATH: &str = "/api/delete-image";
const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

pub const DEFAULT_ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Image host configuration consumed by the upload pipeline
#[derive(Clone, Debug, PartialEq)]
pub struct UploaderConfig {
    /// Tenant identifier templated into the upload endpoint
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: String,
    pub api_base_url: String,
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    /// Images at or below this size are uploaded as-is
    pub compress_threshold_bytes: usize,
    pub max_width: u32,
    /// Lossy encoder quality in `0.0..=1.0`
    pub jpeg_quality: f32,
    pub http_timeout: Duration,
    /// Collaborator endpoint that deletes uploaded images server-side
    pub delete_endpoint: String,
}

impl UploaderConfig {
    /// Minimal config with defaults for everything but the three required values.
    pub fn new(
        cloud_name: impl Into<String>,
        upload_preset: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
            folder: folder.into(),
            api_base_url: DEFAULT_UPLOAD_API_BASE.to_string(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            compress_threshold_bytes: COMPRESS_THRESHOLD_BYTES,
            max_width: MAX_WIDTH,
            jpeg_quality: JPEG_QUALITY,
            http_timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            delete_endpoint: format!("{}{}", DEFAULT_SITE_URL, DEFAULT_DELETE_PATH),
        }
    }

    pub fn from_env() -> Result<Self, UploadError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, UploadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, UploadError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| UploadError::configuration(format!("{} must be set", key)))
        };

        let mut config = Self::new(
            required("ECOMAP_CLOUD_NAME")?,
            required("ECOMAP_UPLOAD_PRESET")?,
            required("ECOMAP_UPLOAD_FOLDER")?,
        );

        if let Some(base) = lookup("ECOMAP_UPLOAD_API_BASE") {
            config.api_base_url = base.trim().trim_end_matches('/').to_string();
        }

        config.max_file_size_bytes = lookup("ECOMAP_MAX_FILE_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_FILE_SIZE_MB)
            .checked_mul(1024 * 1024)
            .ok_or_else(|| UploadError::configuration("ECOMAP_MAX_FILE_SIZE_MB is too large"))?;

        if let Some(types) = lookup("ECOMAP_ALLOWED_CONTENT_TYPES") {
            config.allowed_content_types = types
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        config.compress_threshold_bytes = lookup("ECOMAP_COMPRESS_THRESHOLD_BYTES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(COMPRESS_THRESHOLD_BYTES);

        config.max_width = lookup("ECOMAP_MAX_WIDTH")
            .and_then(|s| s.parse().ok())
            .unwrap_or(MAX_WIDTH);

        config.jpeg_quality = lookup("ECOMAP_JPEG_QUALITY")
            .and_then(|s| s.parse().ok())
            .unwrap_or(JPEG_QUALITY);

        config.http_timeout = Duration::from_secs(
            lookup("ECOMAP_HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(HTTP_TIMEOUT_SECS),
        );

        let site_url = lookup("ECOMAP_SITE_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());
        config.delete_endpoint = lookup("ECOMAP_DELETE_ENDPOINT")
            .unwrap_or_else(|| format!("{}{}", site_url, DEFAULT_DELETE_PATH));

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), UploadError> {
        if self.cloud_name.trim().is_empty() {
            return Err(UploadError::configuration("cloud name must not be empty"));
        }
        if self.upload_preset.trim().is_empty() {
            return Err(UploadError::configuration("upload preset must not be empty"));
        }
        if self.folder.trim().is_empty() {
            return Err(UploadError::configuration("upload folder must not be empty"));
        }
        if self.max_file_size_bytes == 0 {
            return Err(UploadError::configuration(
                "ECOMAP_MAX_FILE_SIZE_MB must be greater than 0",
            ));
        }
        if self.allowed_content_types.is_empty() {
            return Err(UploadError::configuration(
                "ECOMAP_ALLOWED_CONTENT_TYPES must list at least one type",
            ));
        }
        if self.max_width == 0 {
            return Err(UploadError::configuration(
                "ECOMAP_MAX_WIDTH must be greater than 0",
            ));
        }
        if !(self.jpeg_quality > 0.0 && self.jpeg_quality <= 1.0) {
            return Err(UploadError::configuration(
                "ECOMAP_JPEG_QUALITY must be in (0, 1]",
            ));
        }
        Ok(())
    }

    /// `{api_base_url}/v1_1/{cloud_name}/image/upload`
    pub fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.api_base_url.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

/// Issue tracker settings for the marker submission sink
#[derive(Clone)]
pub struct GitHubConfig {
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub api_base_url: String,
}

// Hand-written so the token never reaches logs.
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"[redacted]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl GitHubConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            owner: lookup("ECOMAP_GITHUB_OWNER")
                .ok_or_else(|| anyhow::anyhow!("ECOMAP_GITHUB_OWNER must be set"))?,
            repo: lookup("ECOMAP_GITHUB_REPO")
                .ok_or_else(|| anyhow::anyhow!("ECOMAP_GITHUB_REPO must be set"))?,
            token: lookup("ECOMAP_GITHUB_TOKEN")
                .ok_or_else(|| anyhow::anyhow!("ECOMAP_GITHUB_TOKEN must be set"))?,
            api_base_url: lookup("ECOMAP_GITHUB_API_BASE")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GITHUB_API_BASE.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.owner.trim().is_empty() || self.repo.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "ECOMAP_GITHUB_OWNER and ECOMAP_GITHUB_REPO must not be empty"
            ));
        }
        if self.token.trim().is_empty() {
            return Err(anyhow::anyhow!("ECOMAP_GITHUB_TOKEN must not be empty"));
        }
        Ok(())
    }

    pub fn issues_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            self.api_base_url, self.owner, self.repo
        )
    }
}
