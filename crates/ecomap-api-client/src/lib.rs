//! HTTP client for the hosted image service.
//!
//! Provides the upload pipeline (validate, downsample, multipart upload), a
//! progress-reporting upload, batch uploads and the delete collaborator call.
//! The CLI and the marker form use this client directly.

pub mod batch;
pub mod delete;
pub mod upload;

use async_trait::async_trait;
use ecomap_core::models::{UploadCandidate, UploadOptions, UploadOutcome};
use ecomap_core::{ErrorMetadata, UploadError, UploaderConfig};
use ecomap_processing::{Downsampler, FileValidator};
use reqwest::Client;

pub use batch::BatchPolicy;
pub use delete::{DeleteAcknowledgement, DeleteClient};
pub use upload::ProviderUploadResponse;

/// Anything that can turn a candidate into an upload outcome.
///
/// The marker form depends on this rather than on [`UploadClient`] so tests
/// can substitute a double.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload_image(
        &self,
        candidate: &UploadCandidate,
        options: &UploadOptions,
    ) -> UploadOutcome;
}

/// HTTP client for the image host.
#[derive(Clone, Debug)]
pub struct UploadClient {
    client: Client,
    config: UploaderConfig,
    validator: FileValidator,
    downsampler: Downsampler,
    batch_policy: BatchPolicy,
}

impl UploadClient {
    /// Fails fast with [`UploadError::Configuration`] on an incomplete config.
    pub fn new(config: UploaderConfig) -> Result<Self, UploadError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| UploadError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            validator: FileValidator::from_config(&config),
            downsampler: Downsampler::from_config(&config),
            config,
            batch_policy: BatchPolicy::default(),
        })
    }

    /// Create client from environment: ECOMAP_CLOUD_NAME, ECOMAP_UPLOAD_PRESET, ECOMAP_UPLOAD_FOLDER.
    pub fn from_env() -> Result<Self, UploadError> {
        Self::new(UploaderConfig::from_env()?)
    }

    pub fn with_batch_policy(mut self, policy: BatchPolicy) -> Self {
        self.batch_policy = policy;
        self
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    pub fn batch_policy(&self) -> BatchPolicy {
        self.batch_policy
    }

    /// Validate, then downsample when compression is requested and the
    /// candidate is over the threshold. No network I/O.
    pub async fn prepare(
        &self,
        candidate: &UploadCandidate,
        options: &UploadOptions,
    ) -> Result<UploadCandidate, UploadError> {
        self.validator.validate_strict(candidate)?;

        if options.compress && candidate.byte_size() > self.config.compress_threshold_bytes {
            return self.downsampler.downsample(candidate).await;
        }

        Ok(candidate.clone())
    }

    /// Full pipeline for one candidate. Never returns an error: validation,
    /// decode and transport problems all become [`UploadOutcome::Failure`].
    pub async fn upload_image(
        &self,
        candidate: &UploadCandidate,
        options: &UploadOptions,
    ) -> UploadOutcome {
        match self.prepare(candidate, options).await {
            Ok(prepared) => self.upload(&prepared, options).await,
            Err(e) => {
                tracing::debug!(
                    filename = %candidate.filename,
                    error_code = e.error_code(),
                    error = %e,
                    "Candidate not uploaded"
                );
                // Validation messages are already user-facing.
                let message = match &e {
                    UploadError::Validation(_) => e.client_message(),
                    _ => e.to_string(),
                };
                UploadOutcome::failure(message)
            }
        }
    }
}

#[async_trait]
impl ImageUploader for UploadClient {
    async fn upload_image(
        &self,
        candidate: &UploadCandidate,
        options: &UploadOptions,
    ) -> UploadOutcome {
        UploadClient::upload_image(self, candidate, options).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use ecomap_core::UploaderConfig;

    pub fn config_for(base_url: &str) -> UploaderConfig {
        let mut config = UploaderConfig::new("demo", "unsigned_markers", "sustainable-campus");
        config.api_base_url = base_url.to_string();
        config.delete_endpoint = format!("{}/api/delete-image", base_url);
        config
    }

    pub fn success_body(public_id: &str) -> String {
        serde_json::json!({
            "public_id": public_id,
            "secure_url": format!("https://res.example.com/demo/image/upload/v1712/{}.png", public_id),
            "format": "png",
            "width": 640,
            "height": 480,
            "bytes": 12345,
            "created_at": "2025-03-01T08:30:00Z",
            "resource_type": "image"
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::config_for;
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    fn test_new_rejects_incomplete_config() {
        let config = UploaderConfig::new("", "preset", "folder");
        assert!(matches!(
            UploadClient::new(config),
            Err(UploadError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_prepare_rejects_invalid_candidate_without_network() {
        // Nothing listens on this address; a request would fail differently.
        let client = UploadClient::new(config_for("http://127.0.0.1:9")).unwrap();
        let candidate = UploadCandidate::new(b"%PDF-1.7".to_vec(), "application/pdf", "doc.pdf");

        let outcome = client
            .upload_image(&candidate, &UploadOptions::default())
            .await;
        assert_eq!(
            outcome.error_message(),
            Some("Only image files are allowed (JPEG, PNG, WebP, GIF)")
        );
    }

    #[tokio::test]
    async fn test_prepare_skips_small_files() {
        let client = UploadClient::new(config_for("http://127.0.0.1:9")).unwrap();
        let candidate = UploadCandidate::new(b"tiny".to_vec(), "image/png", "tiny.png");
        let prepared = client
            .prepare(&candidate, &UploadOptions::default())
            .await
            .unwrap();
        assert_eq!(prepared, candidate);
    }

    #[tokio::test]
    async fn test_prepare_downsamples_large_files() {
        let mut config = config_for("http://127.0.0.1:9");
        config.compress_threshold_bytes = 16;
        config.max_width = 50;
        let client = UploadClient::new(config).unwrap();

        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 40, Rgb([1, 2, 3])))
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        let candidate = UploadCandidate::new(buffer, "image/png", "wide.png");

        let prepared = client
            .prepare(&candidate, &UploadOptions::default())
            .await
            .unwrap();
        assert_eq!(prepared.content_type, "image/jpeg");
        assert_eq!(
            ecomap_processing::image_dimensions(&prepared.data),
            Some((50, 20))
        );

        // Opting out leaves the payload untouched.
        let untouched = client
            .prepare(&candidate, &UploadOptions::default().without_compression())
            .await
            .unwrap();
        assert_eq!(untouched, candidate);
    }

    #[tokio::test]
    async fn test_prepare_reports_decode_error() {
        let mut config = config_for("http://127.0.0.1:9");
        config.compress_threshold_bytes = 4;
        let client = UploadClient::new(config).unwrap();
        let candidate = UploadCandidate::new(b"not really a png".to_vec(), "image/png", "bad.png");

        let err = client
            .prepare(&candidate, &UploadOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Decode(_)));
    }
}
