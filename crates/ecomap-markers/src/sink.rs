//! Destinations for marker submissions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Mutex;

use crate::error::SubmissionError;
use crate::issue::IssueRecord;

/// Acknowledgement from a submission sink.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Receipt {
    /// Tracker issue number, when one was created
    pub issue_number: Option<u64>,
    pub url: Option<String>,
}

/// Where reviewed-later marker proposals go.
#[async_trait]
pub trait SubmissionSink: Send + Sync + Debug {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    async fn submit(&self, issue: &IssueRecord) -> Result<Receipt, SubmissionError>;
}

/// Keeps the issue instead of filing it.
#[derive(Debug, Default)]
pub struct DryRunSink {
    last: Mutex<Option<IssueRecord>>,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently "submitted" issue.
    pub fn last_issue(&self) -> Option<IssueRecord> {
        self.last.lock().ok().and_then(|last| last.clone())
    }
}

#[async_trait]
impl SubmissionSink for DryRunSink {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn submit(&self, issue: &IssueRecord) -> Result<Receipt, SubmissionError> {
        tracing::info!(
            title = %issue.title,
            labels = ?issue.labels,
            body_len = issue.body.len(),
            "Dry run: issue not filed"
        );
        if let Ok(mut last) = self.last.lock() {
            *last = Some(issue.clone());
        }
        Ok(Receipt::default())
    }
}
