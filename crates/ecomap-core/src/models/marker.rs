use serde::{Deserialize, Serialize};
use std::fmt;

/// Longitude/latitude pair, in that order (map SDK convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

/// Completion date of a project: free text, or not yet decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionDate {
    Unset,
    Text(String),
}

impl CompletionDate {
    /// Empty or whitespace-only input means the date is not decided yet.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            CompletionDate::Unset
        } else {
            CompletionDate::Text(trimmed.to_string())
        }
    }
}

impl fmt::Display for CompletionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionDate::Unset => write!(f, "TBD"),
            CompletionDate::Text(text) => write!(f, "{}", text),
        }
    }
}
