use ecomap_core::{ErrorMetadata, LogLevel};

/// Why raw form input could not become a [`MarkerDraft`](crate::MarkerDraft).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    /// One message per failed rule, in form field order
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    Invalid(Vec<String>),

    #[error("Unknown project category: {0}")]
    UnknownCategory(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Submission sink is not configured: {0}")]
    Configuration(String),

    #[error("Could not reach the issue tracker: {0}")]
    Transport(String),

    #[error("Issue tracker rejected the submission ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response from the issue tracker: {0}")]
    UnexpectedResponse(String),
}

impl ErrorMetadata for SubmissionError {
    fn error_code(&self) -> &'static str {
        match self {
            SubmissionError::Configuration(_) => "SUBMISSION_CONFIGURATION_ERROR",
            SubmissionError::Transport(_) => "SUBMISSION_TRANSPORT_ERROR",
            SubmissionError::Rejected { .. } => "SUBMISSION_REJECTED",
            SubmissionError::UnexpectedResponse(_) => "SUBMISSION_UNEXPECTED_RESPONSE",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            SubmissionError::Configuration(_) => false,
            SubmissionError::Rejected { status, .. } => *status >= 500 || *status == 429,
            _ => true,
        }
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            SubmissionError::Configuration(_) => {
                Some("Set ECOMAP_GITHUB_OWNER, ECOMAP_GITHUB_REPO and ECOMAP_GITHUB_TOKEN")
            }
            SubmissionError::Rejected { status: 401 | 403, .. } => {
                Some("Check that the token can create issues in the repository")
            }
            _ if self.is_recoverable() => Some("Please try again later"),
            _ => None,
        }
    }

    fn client_message(&self) -> String {
        "Submission failed, please try again later. If the problem persists, contact the site administrator.".to_string()
    }

    fn log_level(&self) -> LogLevel {
        match self {
            SubmissionError::Configuration(_) => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}

/// Errors surfaced by [`MarkerForm`](crate::MarkerForm) operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    /// An image upload or submission is already in flight
    #[error("The image is still uploading, please wait")]
    Busy,

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("Image upload failed: {0}")]
    Upload(String),

    #[error("Image uploads are not configured")]
    UploadsDisabled,

    /// The image was removed or the form cancelled before the upload finished
    #[error("The image was removed before its upload finished")]
    Discarded,

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
