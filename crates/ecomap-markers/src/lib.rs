//! Marker proposals
//!
//! Site visitors can click the map to propose a new sustainability project.
//! This crate validates the proposal, renders it as a review issue and hands
//! it to a [`SubmissionSink`].

pub mod draft;
pub mod error;
pub mod form;
pub mod github;
pub mod issue;
pub mod sink;

pub use draft::{MarkerDraft, MarkerFields};
pub use error::{DraftError, FormError, SubmissionError};
pub use form::MarkerForm;
pub use github::GitHubIssueSink;
pub use issue::IssueRecord;
pub use sink::{DryRunSink, Receipt, SubmissionSink};
