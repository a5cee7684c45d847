//! ecomap CLI: upload campus project photos and propose new map markers.
//!
//! Upload commands need ECOMAP_CLOUD_NAME, ECOMAP_UPLOAD_PRESET and
//! ECOMAP_UPLOAD_FOLDER. Filing marker issues needs ECOMAP_GITHUB_OWNER,
//! ECOMAP_GITHUB_REPO and ECOMAP_GITHUB_TOKEN unless `--dry-run` is given.

use anyhow::Context;
use clap::{Parser, Subcommand};
use ecomap_api_client::{BatchPolicy, ImageUploader, UploadClient};
use ecomap_cli::{
    init_tracing, parse_key_value, proposal_report, read_candidate, truncate_string,
    validator_or_default,
};
use ecomap_core::models::{Coordinate, UploadOptions};
use ecomap_core::{transform_url, Catalog, TransformOptions};
use ecomap_markers::{DryRunSink, GitHubIssueSink, MarkerFields, MarkerForm, SubmissionSink};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ecomap", about = "Sustainable campus map CLI")]
struct Cli {
    /// Catalog JSON to use instead of the built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check files against the upload policy without uploading
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Upload one or more images
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Send images as they are, even when large
        #[arg(long)]
        no_compress: bool,
        /// Comma separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Context metadata as key=value, repeatable
        #[arg(long, value_parser = parse_key_value)]
        context: Vec<(String, String)>,
        /// Uploads in flight at once (1 = sequential)
        #[arg(long, default_value = "1")]
        concurrency: usize,
    },
    /// Upload a single image, printing progress to stderr
    UploadProgress { file: PathBuf },
    /// Rewrite a delivery URL with transformation directives
    Transform {
        url: String,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        #[arg(long, default_value = "scale")]
        crop: String,
        #[arg(long, default_value = "auto")]
        quality: String,
        #[arg(long, default_value = "auto")]
        format: String,
        #[arg(long)]
        effect: Option<String>,
    },
    /// Delete an uploaded image through the site's delete endpoint
    Delete { public_id: String },
    /// List project categories
    Categories,
    /// List projects, optionally within one category
    Projects {
        #[arg(long)]
        category: Option<String>,
        /// Compact one-line-per-project output
        #[arg(long)]
        table: bool,
    },
    /// Show site statistics
    Stats,
    /// Propose a new project marker for review
    ProposeMarker {
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        participants: u32,
        #[arg(long, default_value = "")]
        completion_date: String,
        /// Photo to upload and embed in the issue
        #[arg(long)]
        image: Option<PathBuf>,
        /// Print the issue instead of filing it
        #[arg(long)]
        dry_run: bool,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn load_catalog(path: Option<&PathBuf>) -> anyhow::Result<Catalog> {
    match path {
        Some(path) => Catalog::from_path(path),
        None => Catalog::builtin(),
    }
}

fn upload_client() -> anyhow::Result<UploadClient> {
    UploadClient::from_env().context(
        "Failed to create upload client. Set ECOMAP_CLOUD_NAME, ECOMAP_UPLOAD_PRESET and ECOMAP_UPLOAD_FOLDER",
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { files } => {
            let validator = validator_or_default(ecomap_core::UploaderConfig::from_env());
            let mut results = Vec::with_capacity(files.len());
            for file in &files {
                let candidate = read_candidate(file)?;
                let result = validator.validate(&candidate);
                results.push(serde_json::json!({
                    "file": file.display().to_string(),
                    "valid": result.is_valid(),
                    "errors": result.messages(),
                }));
            }
            print_json(&results)?;
        }
        Commands::Upload {
            files,
            no_compress,
            tags,
            context,
            concurrency,
        } => {
            let client = upload_client()?.with_batch_policy(BatchPolicy::with_concurrency(concurrency));
            let candidates = files
                .iter()
                .map(|f| read_candidate(f))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let mut options = UploadOptions::default().with_tags(tags);
            for (key, value) in context {
                options = options.with_context(key, value);
            }
            if no_compress {
                options = options.without_compression();
            }

            let outcomes = client.upload_all(&candidates, &options).await;
            print_json(&outcomes)?;
        }
        Commands::UploadProgress { file } => {
            let client = upload_client()?;
            let candidate = read_candidate(&file)?;
            let response = client
                .upload_with_progress(&candidate, |percent| eprint!("\r{:5.1}%", percent))
                .await?;
            eprintln!();
            print_json(&response)?;
        }
        Commands::Transform {
            url,
            width,
            height,
            crop,
            quality,
            format,
            effect,
        } => {
            let mut options = TransformOptions::new()
                .crop(&crop)
                .quality(&quality)
                .format(&format);
            if let Some(width) = width {
                options = options.width(width);
            }
            if let Some(height) = height {
                options = options.height(height);
            }
            if let Some(effect) = effect {
                options = options.effect(&effect);
            }
            print_json(&serde_json::json!({ "transformed_url": transform_url(&url, &options) }))?;
        }
        Commands::Delete { public_id } => {
            let client = upload_client()?;
            let ack = client.delete_client().delete_image(&public_id).await?;
            print_json(&ack)?;
        }
        Commands::Categories => {
            let catalog = load_catalog(cli.catalog.as_ref())?;
            let counts = catalog.category_counts();
            let rows: Vec<_> = catalog
                .categories
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "id": c.id,
                        "name": c.name,
                        "color": c.color,
                        "projects": counts.get(c.id.as_str()).copied().unwrap_or(0),
                    })
                })
                .collect();
            print_json(&rows)?;
        }
        Commands::Projects { category, table } => {
            let catalog = load_catalog(cli.catalog.as_ref())?;
            let projects: Vec<_> = match category.as_deref() {
                Some(id) => {
                    if !catalog.has_category(id) {
                        anyhow::bail!("Unknown category: {}", id);
                    }
                    catalog.projects_in(id).collect()
                }
                None => catalog.projects.iter().collect(),
            };
            if table {
                for p in projects {
                    println!(
                        "{:<16} {:<10} {:>4}  {}",
                        p.id,
                        p.category,
                        p.participants,
                        truncate_string(&p.title, 40)
                    );
                }
            } else {
                print_json(&projects)?;
            }
        }
        Commands::Stats => {
            let catalog = load_catalog(cli.catalog.as_ref())?;
            print_json(&serde_json::json!({
                "statistics": catalog.statistics,
                "participants_in_catalog": catalog.total_participants(),
                "projects_per_category": catalog.category_counts(),
            }))?;
        }
        Commands::ProposeMarker {
            lng,
            lat,
            title,
            description,
            category,
            participants,
            completion_date,
            image,
            dry_run,
        } => {
            let catalog = Arc::new(load_catalog(cli.catalog.as_ref())?);
            let dry_run_sink = dry_run.then(|| Arc::new(DryRunSink::new()));
            let sink: Arc<dyn SubmissionSink> = match &dry_run_sink {
                Some(sink) => sink.clone(),
                None => Arc::new(GitHubIssueSink::from_env()?),
            };
            // Only an attached image needs upload settings.
            let uploader: Option<Arc<dyn ImageUploader>> = match &image {
                Some(_) => Some(Arc::new(upload_client()?)),
                None => None,
            };
            let form = MarkerForm::new(Coordinate::new(lng, lat), uploader, sink, catalog);

            if let Some(path) = image {
                let candidate = read_candidate(&path)?;
                let uploaded = form.attach_image(&candidate).await?;
                tracing::info!(url = %uploaded.url, "Marker image attached");
            }

            let fields = MarkerFields {
                title,
                description,
                category,
                participants: Some(participants),
                completion_date,
            };
            let receipt = form.submit(&fields).await?;
            let issue = dry_run_sink.and_then(|sink| sink.last_issue());
            print_json(&proposal_report(&receipt, issue.as_ref()))?;
        }
    }

    Ok(())
}
