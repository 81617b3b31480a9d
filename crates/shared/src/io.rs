use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::DigestData;
use crate::output::OutputFormat;

/// Create the output directory if needed and return its path.
pub fn ensure_output_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    Ok(dir)
}

pub fn digest_filename(format: OutputFormat, date: DateTime<Utc>) -> String {
    format!("digest-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Write the rendered digest next to its JSON sidecar.
pub fn save_digest(
    dir: &Path,
    format: OutputFormat,
    date: DateTime<Utc>,
    content: &str,
) -> Result<PathBuf> {
    let filepath = dir.join(digest_filename(format, date));
    fs::write(&filepath, content)
        .with_context(|| format!("Failed to write digest: {}", filepath.display()))?;
    Ok(filepath)
}

/// Save the machine-readable record of a digest run.
pub fn save_digest_data(dir: &Path, date: DateTime<Utc>, data: &DigestData) -> Result<PathBuf> {
    let filepath = dir.join(format!("digest-{}.json", date.format("%Y-%m-%d")));

    let json = serde_json::to_string_pretty(data).context("Failed to serialize digest data")?;
    fs::write(&filepath, json)
        .with_context(|| format!("Failed to write digest data: {}", filepath.display()))?;

    Ok(filepath)
}

pub fn load_digest_data(filepath: &Path) -> Result<DigestData> {
    if !filepath.exists() {
        anyhow::bail!("Digest data file not found: {}", filepath.display());
    }

    let content = fs::read_to_string(filepath)
        .with_context(|| format!("Failed to read digest data: {}", filepath.display()))?;

    let data: DigestData = serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse digest JSON from {}. The file may be corrupted.",
            filepath.display()
        )
    })?;

    if data.version != "1.0" {
        anyhow::bail!(
            "Unsupported digest data version: {}. Expected 1.0.",
            data.version
        );
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, Summary};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("eng-digest-test-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_digest_filename_is_dated() {
        let date = "2026-08-07T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(
            digest_filename(OutputFormat::Markdown, date),
            "digest-2026-08-07.md"
        );
        assert_eq!(
            digest_filename(OutputFormat::Rss, date),
            "digest-2026-08-07.xml"
        );
    }

    #[test]
    fn test_digest_data_round_trip() {
        let dir = temp_dir("round-trip");
        let article = Article::new(
            "A Post",
            "https://example.com/a-post",
            Utc::now(),
            "Body",
            "Example Blog",
        );
        let data = DigestData::new(vec![Summary::for_article(&article, "Summary.", vec![])]);

        let path = save_digest_data(&dir, Utc::now(), &data).unwrap();
        let loaded = load_digest_data(&path).unwrap();

        assert_eq!(loaded.version, "1.0");
        assert_eq!(loaded.summaries.len(), 1);
        assert_eq!(loaded.summaries[0].title, "A Post");

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_load_missing_file_errors() {
        let missing = std::env::temp_dir().join("eng-digest-definitely-missing.json");
        assert!(load_digest_data(&missing).is_err());
    }
}
