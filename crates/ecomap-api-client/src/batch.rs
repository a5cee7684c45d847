//! Uploading several candidates at once.

use crate::UploadClient;
use ecomap_core::models::{UploadCandidate, UploadOptions, UploadOutcome};
use futures::StreamExt;

/// How a batch is scheduled. Results keep input order under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// One upload at a time
    #[default]
    Sequential,
    /// At most `n` uploads in flight
    BoundedConcurrency(usize),
}

impl BatchPolicy {
    /// `0` and `1` both mean sequential.
    pub fn with_concurrency(n: usize) -> Self {
        if n <= 1 {
            BatchPolicy::Sequential
        } else {
            BatchPolicy::BoundedConcurrency(n)
        }
    }
}

impl UploadClient {
    /// Run the full pipeline for every candidate.
    ///
    /// Individual failures do not abort the batch. The returned vector has
    /// one outcome per candidate at the same index.
    pub async fn upload_all(
        &self,
        candidates: &[UploadCandidate],
        options: &UploadOptions,
    ) -> Vec<UploadOutcome> {
        let outcomes = match self.batch_policy {
            BatchPolicy::Sequential => {
                let mut outcomes = Vec::with_capacity(candidates.len());
                for candidate in candidates {
                    outcomes.push(self.upload_image(candidate, options).await);
                }
                outcomes
            }
            BatchPolicy::BoundedConcurrency(limit) => {
                futures::stream::iter(candidates)
                    .map(|candidate| self.upload_image(candidate, options))
                    .buffered(limit.max(1))
                    .collect::<Vec<_>>()
                    .await
            }
        };

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        tracing::info!(
            total = outcomes.len(),
            succeeded,
            failed = outcomes.len() - succeeded,
            policy = ?self.batch_policy,
            "Batch upload finished"
        );

        outcomes
    }
}
