//! Multipart upload transport.

use crate::UploadClient;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use ecomap_core::models::{UploadCandidate, UploadOptions, UploadOutcome, UploadedImage};
use ecomap_core::{ErrorMetadata, UploadError};
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Response, StatusCode};
use serde::Deserialize;
use std::sync::{Arc, Mutex};

const PROGRESS_CHUNK_SIZE: usize = 64 * 1024;

/// Fields we rely on from the image host's upload response. Unknown fields
/// are ignored; missing ones are an error.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUploadResponse {
    pub public_id: String,
    pub secure_url: String,
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub bytes: u64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProviderUploadResponse> for UploadedImage {
    type Error = UploadError;

    fn try_from(response: ProviderUploadResponse) -> Result<Self, Self::Error> {
        if response.public_id.is_empty() {
            return Err(UploadError::UnexpectedResponse(
                "empty public_id".to_string(),
            ));
        }
        if !response.secure_url.starts_with("https://")
            && !response.secure_url.starts_with("http://")
        {
            return Err(UploadError::UnexpectedResponse(format!(
                "secure_url is not a URL: {}",
                response.secure_url
            )));
        }

        Ok(UploadedImage {
            public_id: response.public_id,
            url: response.secure_url,
            format: response.format,
            width: response.width,
            height: response.height,
            byte_size: response.bytes,
            created_at: response.created_at,
        })
    }
}

fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} ({})", reason, status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

fn percent(sent: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        (sent as f64 / total as f64) * 100.0
    }
}

impl UploadClient {
    fn base_form(&self, file: Part, filename: &str) -> Form {
        Form::new()
            .part("file", file)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("folder", self.config.folder.clone())
            .text("public_id", ecomap_processing::generate_name(filename))
    }

    fn file_part(candidate: &UploadCandidate, body: Part) -> Result<Part, UploadError> {
        body.file_name(candidate.filename.clone())
            .mime_str(&candidate.content_type)
            .map_err(|e| UploadError::transport(format!("invalid content type: {}", e)))
    }

    async fn send(&self, form: Form) -> Result<Response, UploadError> {
        self.client
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::transport(e.to_string()))
    }

    async fn try_upload(
        &self,
        candidate: &UploadCandidate,
        options: &UploadOptions,
    ) -> Result<UploadedImage, UploadError> {
        let file = Self::file_part(candidate, Part::bytes(candidate.data.to_vec()))?;
        let mut form = self.base_form(file, &candidate.filename);

        if !options.tags.is_empty() {
            form = form.text("tags", options.tags.join(","));
        }
        for (key, value) in &options.context {
            form = form.text(format!("context[{}]", key), value.clone());
        }

        let response = self.send(form).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::transport(status_text(status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| UploadError::transport(e.to_string()))?;
        let parsed: ProviderUploadResponse = serde_json::from_str(&body)?;
        UploadedImage::try_from(parsed)
    }

    /// Send one already-prepared candidate to the image host.
    ///
    /// Never returns an error: transport failures, non-2xx statuses and
    /// malformed responses all become [`UploadOutcome::Failure`].
    pub async fn upload(
        &self,
        candidate: &UploadCandidate,
        options: &UploadOptions,
    ) -> UploadOutcome {
        match self.try_upload(candidate, options).await {
            Ok(image) => {
                tracing::info!(
                    public_id = %image.public_id,
                    format = %image.format,
                    width = image.width,
                    height = image.height,
                    size = image.byte_size,
                    "Image uploaded"
                );
                UploadOutcome::Success(image)
            }
            Err(e) => {
                tracing::warn!(
                    filename = %candidate.filename,
                    error_code = e.error_code(),
                    error = %e,
                    "Image upload failed"
                );
                UploadOutcome::failure(e.to_string())
            }
        }
    }

    /// Upload while reporting progress as a percentage of file bytes sent.
    ///
    /// Reported values never decrease and the last one is 100. No
    /// validation or downsampling happens here. Only an HTTP 200 counts as
    /// success, and the raw provider JSON is returned untouched.
    pub async fn upload_with_progress<F>(
        &self,
        candidate: &UploadCandidate,
        on_progress: F,
    ) -> Result<serde_json::Value, UploadError>
    where
        F: FnMut(f64) + Send + 'static,
    {
        let total = candidate.byte_size();
        let reporter = Arc::new(Mutex::new(on_progress));
        let report = {
            let reporter = Arc::clone(&reporter);
            move |value: f64| {
                if let Ok(mut callback) = reporter.lock() {
                    callback(value);
                }
            }
        };

        let chunks: Vec<Bytes> = (0..total)
            .step_by(PROGRESS_CHUNK_SIZE)
            .map(|start| {
                candidate
                    .data
                    .slice(start..(start + PROGRESS_CHUNK_SIZE).min(total))
            })
            .collect();

        let chunk_report = report.clone();
        let mut sent = 0usize;
        let stream = futures::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len();
            chunk_report(percent(sent, total));
            Ok::<Bytes, std::io::Error>(chunk)
        });

        let body = Part::stream_with_length(Body::wrap_stream(stream), total as u64);
        let file = Self::file_part(candidate, body)?;
        let form = self.base_form(file, &candidate.filename);

        if total == 0 {
            report(100.0);
        }

        let response = self.send(form).await?;
        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(
                filename = %candidate.filename,
                status = status.as_u16(),
                "Progress upload rejected"
            );
            return Err(UploadError::transport(status_text(status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| UploadError::transport(e.to_string()))?;
        let json: serde_json::Value = serde_json::from_str(&body)?;

        tracing::info!(filename = %candidate.filename, size = total, "Image uploaded with progress");
        Ok(json)
    }
}
