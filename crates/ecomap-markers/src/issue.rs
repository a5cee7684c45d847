use ecomap_core::Catalog;
use serde::{Deserialize, Serialize};

use crate::draft::MarkerDraft;

pub const NEW_MARKER_LABEL: &str = "new-marker";

/// An issue ready to be filed for maintainers to review.
///
/// Serializes to the body of a GitHub "create an issue" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

impl IssueRecord {
    pub fn from_draft(draft: &MarkerDraft, catalog: &Catalog) -> Self {
        let category_name = catalog
            .category(&draft.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or(draft.category_id.as_str());

        Self {
            title: format!("New project marker: {}", draft.title),
            body: render_body(draft, category_name),
            labels: vec![NEW_MARKER_LABEL.to_string(), draft.category_id.clone()],
        }
    }
}

fn render_body(draft: &MarkerDraft, category_name: &str) -> String {
    let image = match &draft.image_url {
        Some(url) => format!("![Project image]({})", url),
        None => "none".to_string(),
    };
    format!(
        "## New sustainable campus project marker\n\n\
         **Project name**: {title}\n\n\
         **Category**: {category}\n\n\
         **Description**:\n{description}\n\n\
         **Participants**: {participants}\n\n\
         **Completion date**: {completion}\n\n\
         **Location**: {lat}, {lng}\n\n\
         **Submitted at**: {submitted}\n\n\
         **Project image**: {image}\n\n\
         ---\n\
         *This marker was submitted through the website form*\n",
        title = draft.title,
        category = category_name,
        description = draft.description,
        participants = draft.participants,
        completion = draft.completion_date,
        lat = draft.coordinate.lat,
        lng = draft.coordinate.lng,
        submitted = draft.submitted_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}
