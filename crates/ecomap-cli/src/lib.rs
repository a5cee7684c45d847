use anyhow::Context;
use ecomap_core::models::UploadCandidate;
use ecomap_core::{UploadError, UploaderConfig};
use ecomap_markers::{IssueRecord, Receipt};
use ecomap_processing::FileValidator;
use std::path::Path;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Media type implied by a file extension, for the formats the site accepts
/// plus a few it must reject.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Read a local file into an upload candidate.
pub fn read_candidate(path: &Path) -> anyhow::Result<UploadCandidate> {
    if path
        .components()
        .any(|c| c == std::path::Component::ParentDir)
    {
        anyhow::bail!("Invalid input: {}", path.display());
    }
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image.jpg")
        .to_string();
    Ok(UploadCandidate::new(data, content_type_for(path), filename))
}

/// Parse `key=value` for repeated `--context` arguments.
pub fn parse_key_value(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", input)),
    }
}

/// Validator for the `validate` command. Checking files does not need upload
/// credentials, so a config error falls back to the default limits.
pub fn validator_or_default(config: Result<UploaderConfig, UploadError>) -> FileValidator {
    match config {
        Ok(config) => FileValidator::from_config(&config),
        Err(e) => {
            tracing::warn!(error = %e, "Upload settings unavailable, using default limits");
            FileValidator::default()
        }
    }
}

/// Output of `propose-marker`: the receipt, plus the rendered issue on a dry run.
pub fn proposal_report(receipt: &Receipt, dry_run_issue: Option<&IssueRecord>) -> serde_json::Value {
    match dry_run_issue {
        Some(issue) => serde_json::json!({ "receipt": receipt, "issue": issue }),
        None => serde_json::json!({ "receipt": receipt }),
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn truncate_string_multibyte() {
        assert_eq!(truncate_string("生态校园地图项目", 5), "生态...");
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("dir/b.webp")), "image/webp");
        assert_eq!(content_type_for(Path::new("c.pdf")), "application/pdf");
        assert_eq!(content_type_for(Path::new("README")), "application/octet-stream");
    }

    #[test]
    fn read_candidate_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"png-bytes")
            .unwrap();

        let candidate = read_candidate(&path).unwrap();
        assert_eq!(candidate.filename, "leaf.png");
        assert_eq!(candidate.content_type, "image/png");
        assert_eq!(candidate.byte_size(), 9);
    }

    #[test]
    fn read_candidate_rejects_parent_dir() {
        assert!(read_candidate(Path::new("../secret.png")).is_err());
    }

    #[test]
    fn read_candidate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_candidate(&dir.path().join("nope.png")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn validator_falls_back_on_config_error() {
        let fallback = validator_or_default(Err(UploadError::configuration(
            "ECOMAP_MAX_FILE_SIZE_MB is too large",
        )));
        assert_eq!(fallback.max_file_size(), FileValidator::default().max_file_size());

        let mut config = UploaderConfig::new("demo", "preset", "folder");
        config.max_file_size_bytes = 2 * 1024 * 1024;
        assert_eq!(validator_or_default(Ok(config)).max_file_size(), 2 * 1024 * 1024);
    }

    #[test]
    fn proposal_report_includes_dry_run_issue() {
        let issue = IssueRecord {
            title: "New project marker: Rain garden".to_string(),
            body: "## New sustainable campus project marker\n\n**Project name**: Rain garden\n".to_string(),
            labels: vec!["new-marker".to_string(), "water".to_string()],
        };
        let report = proposal_report(&Receipt::default(), Some(&issue));
        assert_eq!(report["issue"]["title"], "New project marker: Rain garden");
        assert!(report["issue"]["body"]
            .as_str()
            .unwrap()
            .contains("**Project name**: Rain garden"));
        assert_eq!(report["issue"]["labels"][1], "water");
        assert!(report["receipt"]["issue_number"].is_null());

        let filed = Receipt {
            issue_number: Some(42),
            url: Some("https://github.com/campus/map/issues/42".to_string()),
        };
        let report = proposal_report(&filed, None);
        assert_eq!(report["receipt"]["issue_number"], 42);
        assert!(report.get("issue").is_none());
    }

    #[test]
    fn key_value_parsing() {
        assert_eq!(
            parse_key_value("source=cli"),
            Ok(("source".to_string(), "cli".to_string()))
        );
        assert_eq!(
            parse_key_value("note=a=b"),
            Ok(("note".to_string(), "a=b".to_string()))
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }
}
