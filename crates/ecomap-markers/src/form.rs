//! State behind the "propose a new marker" dialog.
//!
//! One [`MarkerForm`] exists per opened dialog. It owns the clicked map
//! location and at most one uploaded image, and serializes the two slow
//! operations (image upload and submission) behind a single busy flag.

use chrono::{DateTime, Utc};
use ecomap_api_client::ImageUploader;
use ecomap_core::models::{Coordinate, UploadCandidate, UploadOptions, UploadOutcome, UploadedImage};
use ecomap_core::{Catalog, ErrorMetadata};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::draft::{MarkerDraft, MarkerFields};
use crate::error::FormError;
use crate::issue::IssueRecord;
use crate::sink::{Receipt, SubmissionSink};

pub const UPLOAD_TAGS: [&str; 2] = ["sustainable-campus", "user-upload"];

/// Clears the busy flag when dropped, whatever path the operation took.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, FormError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self { flag })
            .map_err(|_| FormError::Busy)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// The attached image URL and a counter bumped on every removal.
///
/// An upload only commits its URL when the counter still matches the value
/// seen before it started.
#[derive(Debug, Default)]
struct ImageSlot {
    url: Option<String>,
    generation: u64,
}

pub struct MarkerForm {
    coordinate: Coordinate,
    uploader: Option<Arc<dyn ImageUploader>>,
    sink: Arc<dyn SubmissionSink>,
    catalog: Arc<Catalog>,
    busy: AtomicBool,
    image: Mutex<ImageSlot>,
}

impl MarkerForm {
    /// `uploader` is `None` when image uploads are not configured; the form
    /// then accepts submissions without an image only.
    pub fn new(
        coordinate: Coordinate,
        uploader: Option<Arc<dyn ImageUploader>>,
        sink: Arc<dyn SubmissionSink>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            coordinate,
            uploader,
            sink,
            catalog,
            busy: AtomicBool::new(false),
            image: Mutex::new(ImageSlot::default()),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn image_url(&self) -> Option<String> {
        self.image.lock().ok().and_then(|slot| slot.url.clone())
    }

    fn image_generation(&self) -> u64 {
        self.image.lock().map(|slot| slot.generation).unwrap_or(0)
    }

    /// Store `url` unless the image was removed since `generation` was read.
    fn commit_image_url(&self, generation: u64, url: &str) -> bool {
        match self.image.lock() {
            Ok(mut slot) if slot.generation == generation => {
                slot.url = Some(url.to_string());
                true
            }
            _ => false,
        }
    }

    fn upload_options(now: DateTime<Utc>) -> UploadOptions {
        UploadOptions::default()
            .with_tags(UPLOAD_TAGS)
            .with_context("source", "user_upload")
            .with_context("timestamp", now.to_rfc3339())
    }

    /// Upload `candidate` and remember its URL for the submission.
    ///
    /// A failed upload clears any previously attached image. If the image is
    /// removed or the form cancelled while the upload is in flight, the
    /// result is dropped and [`FormError::Discarded`] returned.
    pub async fn attach_image(&self, candidate: &UploadCandidate) -> Result<UploadedImage, FormError> {
        let uploader = self.uploader.as_ref().ok_or(FormError::UploadsDisabled)?;
        let _guard = BusyGuard::acquire(&self.busy)?;

        let generation = self.image_generation();
        let options = Self::upload_options(Utc::now());
        match uploader.upload_image(candidate, &options).await {
            UploadOutcome::Success(image) => {
                if !self.commit_image_url(generation, &image.url) {
                    tracing::info!(url = %image.url, "Image removed during upload, discarding");
                    return Err(FormError::Discarded);
                }
                Ok(image)
            }
            UploadOutcome::Failure { message } => {
                tracing::warn!(filename = %candidate.filename, error = %message, "Marker image upload failed");
                self.remove_image();
                Err(FormError::Upload(message))
            }
        }
    }

    pub fn remove_image(&self) {
        if let Ok(mut slot) = self.image.lock() {
            slot.url = None;
            slot.generation = slot.generation.wrapping_add(1);
        }
    }

    pub async fn submit(&self, fields: &MarkerFields) -> Result<Receipt, FormError> {
        self.submit_at(fields, Utc::now()).await
    }

    /// Submit with an explicit submission time.
    ///
    /// The form is cleared only when the sink accepts the issue, so a failed
    /// submission can be retried as is.
    pub async fn submit_at(
        &self,
        fields: &MarkerFields,
        now: DateTime<Utc>,
    ) -> Result<Receipt, FormError> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        let draft = MarkerDraft::from_fields(fields, self.coordinate, &self.catalog, now)?
            .with_image(self.image_url());
        let issue = IssueRecord::from_draft(&draft, &self.catalog);

        let receipt = self.sink.submit(&issue).await.map_err(|e| {
            tracing::warn!(
                sink = self.sink.name(),
                error_code = e.error_code(),
                error = %e,
                "Marker submission failed"
            );
            FormError::from(e)
        })?;

        tracing::info!(
            sink = self.sink.name(),
            category = %draft.category_id,
            issue_number = ?receipt.issue_number,
            "Marker submitted"
        );
        self.remove_image();
        Ok(receipt)
    }

    /// Discard the dialog's state.
    pub fn cancel(&self) {
        self.remove_image();
    }
}
