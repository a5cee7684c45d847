//! Turning raw form input into a checked marker draft.

use chrono::{DateTime, Utc};
use ecomap_core::models::{CompletionDate, Coordinate};
use ecomap_core::Catalog;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::error::DraftError;

/// Field order used when reporting validation messages.
const FIELD_ORDER: [&str; 4] = ["title", "description", "category", "participants"];

/// Raw values as typed into the marker form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MarkerFields {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    /// Category id from the catalog
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(
        required(message = "Participant count is required"),
        range(min = 1, message = "Participant count must be at least 1")
    )]
    pub participants: Option<u32>,
    /// Free text; blank means not decided yet
    #[serde(default)]
    pub completion_date: String,
}

impl MarkerFields {
    fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            participants: self.participants,
            completion_date: self.completion_date.clone(),
        }
    }
}

fn ordered_messages(errors: &ValidationErrors) -> Vec<String> {
    let field_errors = errors.field_errors();
    FIELD_ORDER
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .flat_map(|errs| errs.iter())
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string())
        })
        .collect()
}

/// A marker proposal that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDraft {
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub participants: u32,
    pub completion_date: CompletionDate,
    pub coordinate: Coordinate,
    pub image_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl MarkerDraft {
    pub fn from_fields(
        fields: &MarkerFields,
        coordinate: Coordinate,
        catalog: &Catalog,
        now: DateTime<Utc>,
    ) -> Result<Self, DraftError> {
        let fields = fields.trimmed();
        if let Err(errors) = fields.validate() {
            return Err(DraftError::Invalid(ordered_messages(&errors)));
        }

        if !catalog.has_category(&fields.category) {
            return Err(DraftError::UnknownCategory(fields.category));
        }

        let participants = match fields.participants {
            Some(n) => n,
            None => {
                return Err(DraftError::Invalid(vec![
                    "Participant count is required".to_string(),
                ]))
            }
        };

        Ok(Self {
            completion_date: CompletionDate::parse(&fields.completion_date),
            title: fields.title,
            description: fields.description,
            category_id: fields.category,
            participants,
            coordinate,
            image_url: None,
            submitted_at: now,
        })
    }

    pub fn with_image(mut self, url: Option<String>) -> Self {
        self.image_url = url;
        self
    }
}
