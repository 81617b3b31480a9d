use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed post from an engineering blog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub published: DateTime<Utc>,
    pub content: String,
    pub source: String,
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        published: DateTime<Utc>,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            published,
            content: content.into(),
            source: source.into(),
            author: None,
            tags: Vec::new(),
        }
    }
}

/// A summarized article. Title, URL, source and publication date are
/// carried through from the Article untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub source: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub published: Option<DateTime<Utc>>,
}

impl Summary {
    /// Build a summary record for an article, keeping its metadata.
    pub fn for_article(
        article: &Article,
        summary: impl Into<String>,
        keywords: Vec<String>,
    ) -> Self {
        Self {
            title: article.title.clone(),
            summary: summary.into(),
            url: article.url.clone(),
            source: article.source.clone(),
            keywords,
            published: Some(article.published),
        }
    }
}

/// How a blog's posts are retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Rss,
    Atom,
    Html,
}

impl Default for SourceKind {
    fn default() -> Self {
        SourceKind::Rss
    }
}

/// A configured blog source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogSource {
    pub name: String,
    pub url: String,
    #[serde(default, rename = "type")]
    pub kind: SourceKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl BlogSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind,
            enabled: true,
        }
    }
}

/// Complete digest data for serialization alongside the rendered output.
#[derive(Debug, Serialize, Deserialize)]
pub struct DigestData {
    pub version: String,
    pub generated_at: String,
    pub summaries: Vec<Summary>,
}

impl DigestData {
    pub fn new(summaries: Vec<Summary>) -> Self {
        Self {
            version: "1.0".to_string(),
            generated_at: Utc::now().to_rfc3339(),
            summaries,
        }
    }
}
