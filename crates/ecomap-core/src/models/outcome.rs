use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical description of an image stored on the image host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub public_id: String,
    pub url: String,
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub byte_size: u64,
    pub created_at: DateTime<Utc>,
}

/// Terminal result of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadOutcome {
    Success(UploadedImage),
    Failure { message: String },
}

impl UploadOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        UploadOutcome::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success(_))
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        match self {
            UploadOutcome::Success(image) => Some(image),
            UploadOutcome::Failure { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            UploadOutcome::Success(_) => None,
            UploadOutcome::Failure { message } => Some(message),
        }
    }
}

/// Per-call knobs for an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Downsample large images before sending them
    pub compress: bool,
    pub tags: Vec<String>,
    /// Sent as `context[<key>]` fields, in order
    pub context: Vec<(String, String)>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            compress: true,
            tags: Vec::new(),
            context: Vec::new(),
        }
    }
}

impl UploadOptions {
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    pub fn without_compression(mut self) -> Self {
        self.compress = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let failure = UploadOutcome::failure("Upload failed: Bad Request");
        assert!(!failure.is_success());
        assert!(failure.image().is_none());
        assert_eq!(failure.error_message(), Some("Upload failed: Bad Request"));
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let json = serde_json::to_value(UploadOutcome::failure("nope")).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["message"], "nope");
    }

    #[test]
    fn test_upload_options_builder() {
        let options = UploadOptions::default()
            .with_tags(["sustainable-campus", "user-upload"])
            .with_context("source", "user_upload");
        assert!(options.compress);
        assert_eq!(options.tags.len(), 2);
        assert_eq!(options.context[0], ("source".to_string(), "user_upload".to_string()));
        assert!(!options.without_compression().compress);
    }
}
