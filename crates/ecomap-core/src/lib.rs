//! ecomap core library
//!
//! Domain models, the error taxonomy, configuration, the static site catalog
//! and the delivery URL transformer shared by all ecomap crates.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod transform_url;

// Re-export commonly used types
pub use catalog::{Catalog, Category, Project, Statistics};
pub use config::{GitHubConfig, UploaderConfig};
pub use error::{ErrorMetadata, LogLevel, UploadError};
pub use transform_url::{transform_url, TransformOptions};
