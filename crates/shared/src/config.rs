use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::BlogSource;
use crate::output::OutputFormat;
use crate::summarizer::SummaryMethod;

/// Limits applied when fetching and filtering articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub lookback_hours: i64,
    pub max_posts_per_blog: usize,
    pub max_total_posts: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            lookback_hours: 24,
            max_posts_per_blog: 3,
            max_total_posts: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub method: SummaryMethod,
    /// Number of sentences in an extractive summary.
    pub sentences: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            method: SummaryMethod::FirstParagraph,
            sentences: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Markdown,
            path: "./digests".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub blogs: Vec<BlogSource>,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from an explicit path, or search the default
    /// locations: $ENG_DIGEST_CONFIG, ./config.yaml,
    /// ~/.config/eng-digest/config.yaml.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::find_config()?,
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content).context("Invalid YAML")?;
        config.validate()?;
        Ok(config)
    }

    fn find_config() -> Result<PathBuf> {
        // A .env file may supply ENG_DIGEST_CONFIG
        let _ = dotenvy::dotenv();

        if let Ok(path) = env::var("ENG_DIGEST_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
        }

        let local = PathBuf::from("config.yaml");
        if local.exists() {
            return Ok(local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("eng-digest").join("config.yaml");
            if path.exists() {
                return Ok(path);
            }
        }

        anyhow::bail!(
            "No configuration file found.\n\n\
            Create ./config.yaml, or ~/.config/eng-digest/config.yaml, or set\n\
            ENG_DIGEST_CONFIG to point at one. Minimal example:\n\n\
            blogs:\n  \
              - name: Example Engineering\n    \
                url: https://example.com/blog/feed.xml\n    \
                type: rss"
        )
    }

    fn validate(&self) -> Result<()> {
        if self.blogs.is_empty() {
            anyhow::bail!("At least one blog source must be configured");
        }

        for blog in &self.blogs {
            if blog.name.trim().is_empty() {
                anyhow::bail!("Blog source has an empty name");
            }
            url::Url::parse(&blog.url)
                .with_context(|| format!("Invalid URL for blog {}: {}", blog.name, blog.url))?;
        }

        if self.summary.sentences == 0 {
            anyhow::bail!("summary.sentences must be at least 1");
        }

        Ok(())
    }
}
