//! Files marker proposals as GitHub issues.

use async_trait::async_trait;
use ecomap_core::GitHubConfig;
use serde::Deserialize;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::error::SubmissionError;
use crate::issue::IssueRecord;
use crate::sink::{Receipt, SubmissionSink};

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("ecomap-markers/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    number: u64,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

pub struct GitHubIssueSink {
    http_client: reqwest::Client,
    config: GitHubConfig,
}

impl Debug for GitHubIssueSink {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GitHubIssueSink")
            .field("owner", &self.config.owner)
            .field("repo", &self.config.repo)
            .finish()
    }
}

impl GitHubIssueSink {
    pub fn new(config: GitHubConfig) -> Result<Self, SubmissionError> {
        config
            .validate()
            .map_err(|e| SubmissionError::Configuration(e.to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                SubmissionError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn from_env() -> Result<Self, SubmissionError> {
        let config =
            GitHubConfig::from_env().map_err(|e| SubmissionError::Configuration(e.to_string()))?;
        Self::new(config)
    }
}

#[async_trait]
impl SubmissionSink for GitHubIssueSink {
    fn name(&self) -> &str {
        "github"
    }

    async fn submit(&self, issue: &IssueRecord) -> Result<Receipt, SubmissionError> {
        let response = self
            .http_client
            .post(self.config.issues_url())
            .bearer_auth(&self.config.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(issue)
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GitHubErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or(text);
            tracing::warn!(
                status = status.as_u16(),
                repo = %self.config.repo,
                "GitHub rejected marker issue"
            );
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let created: CreatedIssue = response
            .json()
            .await
            .map_err(|e| SubmissionError::UnexpectedResponse(e.to_string()))?;

        tracing::info!(
            issue_number = created.number,
            url = %created.html_url,
            "Marker issue filed"
        );

        Ok(Receipt {
            issue_number: Some(created.number),
            url: Some(created.html_url),
        })
    }
}
