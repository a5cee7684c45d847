use ecomap_core::config::DEFAULT_ALLOWED_CONTENT_TYPES;
use ecomap_core::models::{UploadCandidate, ValidationResult};
use ecomap_core::{UploadError, UploaderConfig};

pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

pub const UNSUPPORTED_FORMAT_MESSAGE: &str = "Only image files are allowed (JPEG, PNG, WebP, GIF)";

/// Image file validator
///
/// Checks the declared size and media type of a candidate against an upload
/// policy. Every rule is evaluated so the user sees all problems at once.
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_FILE_SIZE,
            DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

impl FileValidator {
    pub fn new(max_file_size: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &UploaderConfig) -> Self {
        Self::new(
            config.max_file_size_bytes,
            config.allowed_content_types.clone(),
        )
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Size limit message, quoting the limit in whole or fractional MB
    fn size_message(&self) -> String {
        let mb = self.max_file_size as f64 / (1024.0 * 1024.0);
        if mb.fract() == 0.0 {
            format!("File size must not exceed {}MB", mb as u64)
        } else {
            format!("File size must not exceed {:.1}MB", mb)
        }
    }

    fn is_allowed_content_type(&self, content_type: &str) -> bool {
        let normalized = content_type.trim().to_lowercase();
        self.allowed_content_types.iter().any(|ct| ct == &normalized)
    }

    /// Validate size and content type
    pub fn validate(&self, candidate: &UploadCandidate) -> ValidationResult {
        let mut messages = Vec::new();

        if candidate.byte_size() > self.max_file_size {
            messages.push(self.size_message());
        }

        if !self.is_allowed_content_type(&candidate.content_type) {
            messages.push(UNSUPPORTED_FORMAT_MESSAGE.to_string());
        }

        if !messages.is_empty() {
            tracing::debug!(
                filename = %candidate.filename,
                content_type = %candidate.content_type,
                size = candidate.byte_size(),
                violations = messages.len(),
                "Upload candidate rejected"
            );
        }

        ValidationResult::from_messages(messages)
    }

    /// Same as [`validate`](Self::validate), as a `Result`
    pub fn validate_strict(&self, candidate: &UploadCandidate) -> Result<(), UploadError> {
        let result = self.validate(candidate);
        if result.is_valid() {
            Ok(())
        } else {
            Err(UploadError::Validation(result.into_messages()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(size: usize, content_type: &str) -> UploadCandidate {
        UploadCandidate::new(vec![0u8; size], content_type, "photo.jpg")
    }

    fn test_validator() -> FileValidator {
        FileValidator::new(
            1024 * 1024, // 1MB
            vec!["image/jpeg".to_string(), "image/png".to_string()],
        )
    }

    #[test]
    fn test_validate_ok() {
        let result = test_validator().validate(&candidate(512 * 1024, "image/jpeg"));
        assert!(result.is_valid());
        assert!(result.messages().is_empty());
    }

    #[test]
    fn test_validate_too_large() {
        let result = test_validator().validate(&candidate(2 * 1024 * 1024, "image/png"));
        assert!(!result.is_valid());
        assert_eq!(result.messages(), ["File size must not exceed 1MB".to_string()]);
    }

    #[test]
    fn test_validate_size_at_limit_is_ok() {
        let result = test_validator().validate(&candidate(1024 * 1024, "image/png"));
        assert!(result.is_valid());
    }

    #[test]
    fn test_validate_unsupported_type_regardless_of_size() {
        for size in [0, 10, 512 * 1024] {
            let result = test_validator().validate(&candidate(size, "application/pdf"));
            assert!(!result.is_valid());
            assert_eq!(result.messages(), [UNSUPPORTED_FORMAT_MESSAGE.to_string()]);
        }
    }

    #[test]
    fn test_validate_reports_both_in_order() {
        let result = test_validator().validate(&candidate(3 * 1024 * 1024, "image/gif"));
        assert_eq!(result.messages().len(), 2);
        assert!(result.messages()[0].contains("1MB"));
        assert_eq!(result.messages()[1], UNSUPPORTED_FORMAT_MESSAGE);
    }

    #[test]
    fn test_validate_content_type_case_insensitive() {
        let result = test_validator().validate(&candidate(10, "IMAGE/PNG"));
        assert!(result.is_valid());
    }

    #[test]
    fn test_default_policy() {
        let validator = FileValidator::default();
        assert_eq!(validator.max_file_size(), 10_485_760);
        for ct in ["image/jpeg", "image/png", "image/webp", "image/gif"] {
            assert!(validator.validate(&candidate(100, ct)).is_valid());
        }
        let result = validator.validate(&candidate(10_485_761, "image/jpeg"));
        assert_eq!(result.messages(), ["File size must not exceed 10MB".to_string()]);
    }

    #[test]
    fn test_fractional_limit_message() {
        let validator = FileValidator::new(1536 * 1024, vec!["image/png".to_string()]);
        let result = validator.validate(&candidate(2 * 1024 * 1024, "image/png"));
        assert_eq!(result.messages(), ["File size must not exceed 1.5MB".to_string()]);
    }

    #[test]
    fn test_validate_strict() {
        let validator = test_validator();
        assert!(validator.validate_strict(&candidate(1, "image/png")).is_ok());
        assert!(matches!(
            validator.validate_strict(&candidate(1, "text/plain")),
            Err(UploadError::Validation(messages)) if messages.len() == 1
        ));
    }
}
