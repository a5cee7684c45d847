//! Static site catalog: site text, category taxonomy, project records and
//! headline statistics.
//!
//! The built-in catalog is compiled into the binary from `data/catalog.json`;
//! [`Catalog::from_path`] loads an alternative file with the same shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::models::Coordinate;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub author: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    /// `[lng, lat]` of the initial map center
    pub center: [f64; 2],
    pub zoom: u8,
}

impl MapSettings {
    pub fn center(&self) -> Coordinate {
        Coordinate::from(self.center)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    /// CSS hex color used for markers and chart slices
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub category: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub article_url: Option<String>,
    /// `[lng, lat]`
    pub location: [f64; 2],
    pub completion_date: String,
    pub participants: u32,
    pub impact: String,
}

impl Project {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::from(self.location)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_projects: u32,
    pub total_participants: u32,
    pub completed_projects: u32,
    pub ongoing_projects: u32,
    pub co2_reduced: String,
    pub waste_reduced: String,
    pub energy_saved: String,
    pub biodiversity_index: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub site: SiteInfo,
    pub map: MapSettings,
    pub categories: Vec<Category>,
    pub projects: Vec<Project>,
    pub statistics: Statistics,
}

impl Catalog {
    /// Catalog shipped with the crate.
    pub fn builtin() -> Result<Self, anyhow::Error> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, anyhow::Error> {
        let catalog: Catalog = serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("Invalid catalog JSON: {}", e))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read catalog {}: {}", path.display(), e))?;
        Self::from_json(&json)
    }

    /// Every project must reference a known category, and ids must be unique.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let mut seen = std::collections::HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.id.as_str()) {
                return Err(anyhow::anyhow!("Duplicate category id: {}", category.id));
            }
        }

        for project in &self.projects {
            if self.category(&project.category).is_none() {
                return Err(anyhow::anyhow!(
                    "Project {} references unknown category {}",
                    project.id,
                    project.category
                ));
            }
        }

        Ok(())
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn has_category(&self, id: &str) -> bool {
        self.category(id).is_some()
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn projects_in<'a>(&'a self, category_id: &'a str) -> impl Iterator<Item = &'a Project> {
        self.projects
            .iter()
            .filter(move |p| p.category == category_id)
    }

    /// Number of projects per category id (feeds the category chart).
    pub fn category_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts: BTreeMap<&str, usize> = self
            .categories
            .iter()
            .map(|c| (c.id.as_str(), 0))
            .collect();
        for project in &self.projects {
            if let Some(count) = counts.get_mut(project.category.as_str()) {
                *count += 1;
            }
        }
        counts
    }

    pub fn total_participants(&self) -> u32 {
        self.projects.iter().map(|p| p.participants).sum()
    }
}
