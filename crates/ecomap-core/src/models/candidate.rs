use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An in-memory image payload awaiting validation and upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadCandidate {
    pub data: Bytes,
    /// Declared media type, e.g. `image/png`
    pub content_type: String,
    pub filename: String,
}

impl UploadCandidate {
    pub fn new(
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }

    pub fn byte_size(&self) -> usize {
        self.data.len()
    }
}

/// Verdict of the file validator.
///
/// `is_valid()` is true exactly when there are no messages; the fields are
/// private so the two can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    messages: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<String>) -> Self {
        Self { messages }
    }

    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_result_invariant() {
        assert!(ValidationResult::valid().is_valid());
        assert!(ValidationResult::from_messages(vec![]).is_valid());

        let result = ValidationResult::from_messages(vec!["too big".to_string()]);
        assert!(!result.is_valid());
        assert_eq!(result.messages(), ["too big".to_string()]);
    }

    #[test]
    fn test_candidate_byte_size() {
        let candidate = UploadCandidate::new(vec![0u8; 42], "image/png", "a.png");
        assert_eq!(candidate.byte_size(), 42);
    }
}
