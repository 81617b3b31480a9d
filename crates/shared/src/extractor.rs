use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::models::Article;

/// Feed entries shorter than this are treated as stubs worth re-fetching
/// from the article page itself.
const STUB_THRESHOLD: usize = 500;

/// Pages whose converted text is this short are considered extraction
/// failures (paywalls, consent walls, empty shells).
const MIN_EXTRACTED_CHARS: usize = 100;

const EXTRACT_CONCURRENCY: usize = 10;

/// Fetches full article bodies for feed entries that only carried a
/// short excerpt.
pub struct ContentExtractor {
    client: Client,
    semaphore: Arc<Semaphore>,
}

impl ContentExtractor {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; EngDigest/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        let semaphore = Arc::new(Semaphore::new(EXTRACT_CONCURRENCY));

        Ok(Self { client, semaphore })
    }

    /// Replace stub contents in place where a fuller body can be fetched.
    /// Articles that already carry substantial content are untouched.
    pub async fn enrich_articles(&self, articles: Vec<Article>) -> Vec<Article> {
        stream::iter(articles)
            .map(|mut article| async move {
                if article.content.len() < STUB_THRESHOLD {
                    if let Ok(Some(content)) = self.fetch_article_content(&article.url).await {
                        article.content = content;
                    }
                }
                article
            })
            .buffered(EXTRACT_CONCURRENCY)
            .collect()
            .await
    }

    pub async fn fetch_article_content(&self, url: &str) -> Result<Option<String>> {
        let _permit = self.semaphore.acquire().await?;

        for attempt in 0..3 {
            match self.try_fetch_article(url).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    if attempt == 2 {
                        eprintln!("Warning: failed to fetch {}: {}", url, e);
                        return Ok(None);
                    }
                    let backoff = std::time::Duration::from_millis(500 * (2_u64.pow(attempt)));
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        Ok(None)
    }

    async fn try_fetch_article(&self, url: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send HTTP request")?;

        let status = response.status();
        if status == 401 || status == 403 || status == 404 {
            // Not retryable; keep whatever the feed gave us.
            return Ok(None);
        }

        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        let html = response.text().await.context("Failed to read response body")?;

        let text = html2text::from_read(html.as_bytes(), 100);
        let text = text.trim();

        if text.len() < MIN_EXTRACTED_CHARS {
            return Ok(None);
        }

        Ok(Some(text.to_string()))
    }
}
