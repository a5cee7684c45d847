//! Error types module
//!
//! All failures of the image submission pipeline are unified under
//! [`UploadError`]. Each variant self-describes how it should be presented
//! to the person filling in the form through [`ErrorMetadata`].

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a failed request
    Warn,
    /// Error level - for failures that need an operator
    Error,
}

/// Metadata describing how an error should be surfaced
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether the user can fix this by retrying or changing input
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UploadError {
    /// Policy violations, in the order the rules were evaluated
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Upload failed: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unexpected response from image host: {0}")]
    UnexpectedResponse(String),
}

impl UploadError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        UploadError::Configuration(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        UploadError::Transport(msg.into())
    }
}

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::UnexpectedResponse(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn upload_error_static_metadata(
    err: &UploadError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        UploadError::Validation(_) => (
            "VALIDATION_ERROR",
            true,
            Some("Choose a JPEG, PNG, WebP or GIF image under the size limit"),
            LogLevel::Debug,
        ),
        UploadError::Decode(_) => (
            "DECODE_ERROR",
            true,
            Some("The file could not be read as an image, select another file"),
            LogLevel::Debug,
        ),
        UploadError::Transport(_) => (
            "TRANSPORT_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Warn,
        ),
        UploadError::Configuration(_) => (
            "CONFIGURATION_ERROR",
            false,
            Some("Set ECOMAP_CLOUD_NAME, ECOMAP_UPLOAD_PRESET and ECOMAP_UPLOAD_FOLDER"),
            LogLevel::Error,
        ),
        UploadError::UnexpectedResponse(_) => (
            "UNEXPECTED_RESPONSE",
            true,
            Some("Retry later; contact the site maintainers if this persists"),
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        upload_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        upload_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::Validation(messages) => messages.join(", "),
            UploadError::Decode(_) => "The selected file is not a readable image".to_string(),
            UploadError::Transport(msg) => format!("Upload failed: {}", msg),
            UploadError::Configuration(_) => "Image uploads are not configured".to_string(),
            UploadError::UnexpectedResponse(_) => {
                "The image host returned an unexpected response".to_string()
            }
        }
    }
}
