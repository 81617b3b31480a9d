//! Article fetching: RSS/Atom feeds with an HTML-scraping fallback.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::models::{Article, BlogSource, SourceKind};

const FETCH_CONCURRENCY: usize = 10;

/// How many candidate elements the HTML fallback will consider per page.
const MAX_HTML_CANDIDATES: usize = 10;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static TIME_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("time[datetime]").unwrap());
static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (compatible; EngDigest/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch every enabled source concurrently. A source that fails only
    /// costs a warning; the digest continues with whatever arrived.
    pub async fn fetch_all(&self, sources: &[BlogSource]) -> Vec<Article> {
        let results: Vec<Vec<Article>> = stream::iter(sources.iter().filter(|s| s.enabled))
            .map(|source| async move {
                match self.fetch_source(source).await {
                    Ok(articles) => articles,
                    Err(e) => {
                        eprintln!("Warning: failed to fetch {}: {}", source.name, e);
                        Vec::new()
                    }
                }
            })
            .buffer_unordered(FETCH_CONCURRENCY)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }

    /// Feed first, then HTML scraping when the feed fails or is empty.
    pub async fn fetch_source(&self, source: &BlogSource) -> Result<Vec<Article>> {
        match source.kind {
            SourceKind::Rss | SourceKind::Atom => {
                match self.fetch_feed(source).await {
                    Ok(articles) if !articles.is_empty() => return Ok(articles),
                    Ok(_) => {
                        eprintln!(
                            "Warning: feed for {} had no usable entries, trying HTML",
                            source.name
                        );
                    }
                    Err(e) => {
                        eprintln!(
                            "Warning: feed fetch failed for {} ({}), trying HTML",
                            source.name, e
                        );
                    }
                }
                self.fetch_html(source).await
            }
            SourceKind::Html => self.fetch_html(source).await,
        }
    }

    async fn fetch_feed(&self, source: &BlogSource) -> Result<Vec<Article>> {
        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .with_context(|| format!("Failed to request feed {}", source.url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read feed body")?;

        if let Ok(channel) = rss::Channel::read_from(&bytes[..]) {
            return Ok(parse_rss_channel(&channel, &source.name));
        }

        if let Ok(feed) = atom_syndication::Feed::read_from(&bytes[..]) {
            return Ok(parse_atom_feed(&feed, &source.name));
        }

        anyhow::bail!("Not a parseable RSS or Atom feed")
    }

    async fn fetch_html(&self, source: &BlogSource) -> Result<Vec<Article>> {
        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .with_context(|| format!("Failed to request page {}", source.url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        let html = response
            .text()
            .await
            .context("Failed to read page body")?;

        Ok(extract_articles_from_html(&html, source))
    }
}

fn parse_rss_channel(channel: &rss::Channel, source_name: &str) -> Vec<Article> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = clean_title(item.title()?);
            if title.is_empty() {
                return None;
            }
            let url = item.link()?.trim().to_string();
            if url.is_empty() {
                return None;
            }

            let published = item.pub_date().and_then(parse_feed_date).unwrap_or_else(|| {
                eprintln!("Warning: no usable date on entry: {}", title);
                Utc::now()
            });

            // Description (the feed-level summary) is preferred over full
            // embedded content, matching how most engineering blogs fill
            // these fields.
            let content_html = item.description().or_else(|| item.content()).unwrap_or("");

            let mut article = Article::new(
                title,
                url,
                published,
                strip_html(content_html),
                source_name,
            );
            article.author = item.author().map(str::to_string);
            article.tags = channel_categories(item);
            Some(article)
        })
        .collect()
}

fn channel_categories(item: &rss::Item) -> Vec<String> {
    item.categories()
        .iter()
        .map(|c| c.name().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn parse_atom_feed(feed: &atom_syndication::Feed, source_name: &str) -> Vec<Article> {
    feed.entries()
        .iter()
        .filter_map(|entry| {
            let title = clean_title(&entry.title().to_string());
            if title.is_empty() {
                return None;
            }
            let url = entry.links().first()?.href().to_string();

            let published = entry
                .published()
                .copied()
                .unwrap_or_else(|| *entry.updated())
                .with_timezone(&Utc);

            let content_html = entry
                .summary()
                .map(|s| s.to_string())
                .or_else(|| entry.content().and_then(|c| c.value().map(str::to_string)))
                .unwrap_or_default();

            let mut article = Article::new(
                title,
                url,
                published,
                strip_html(&content_html),
                source_name,
            );
            article.author = entry.authors().first().map(|p| p.name().to_string());
            article.tags = entry
                .categories()
                .iter()
                .map(|c| c.term().to_string())
                .collect();
            Some(article)
        })
        .collect()
}

/// RFC 2822 is the common RSS date shape; Atom and some feeds use
/// RFC 3339.
fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn clean_title(raw: &str) -> String {
    html_escape::decode_html_entities(raw.trim()).to_string()
}

fn strip_html(content: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }
    html2text::from_read(content.as_bytes(), 100).trim().to_string()
}

/// Scrape a blog index page. Strategy 1 looks for `<article>` elements;
/// strategy 2 falls back to the usual post-container class names.
fn extract_articles_from_html(html: &str, source: &BlogSource) -> Vec<Article> {
    let document = Html::parse_document(html);

    let mut articles = extract_with_selector(&document, "article", source);

    if articles.is_empty() {
        for pattern in ["post", "entry", "blog-post", "article"] {
            let selector = format!(r#"div[class*="{pattern}"], section[class*="{pattern}"]"#);
            articles = extract_with_selector(&document, &selector, source);
            if !articles.is_empty() {
                break;
            }
        }
    }

    articles
}

fn extract_with_selector(document: &Html, selector: &str, source: &BlogSource) -> Vec<Article> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .take(MAX_HTML_CANDIDATES)
        .filter_map(|element| parse_article_element(element, source))
        .collect()
}

fn parse_article_element(element: ElementRef<'_>, source: &BlogSource) -> Option<Article> {
    let title = find_title(element)?;
    let href = find_link(element)?;
    let url = absolutize(&href, &source.url)?;

    let published = find_time(element).unwrap_or_else(Utc::now);
    let content = find_snippet(element);

    Some(Article::new(title, url, published, content, &source.name))
}

fn find_title(element: ElementRef<'_>) -> Option<String> {
    for heading in ["h1", "h2", "h3"] {
        let selector = Selector::parse(heading).ok()?;
        if let Some(node) = element.select(&selector).next() {
            let text = element_text(node);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    element
        .select(&ANCHOR_SELECTOR)
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn find_link(element: ElementRef<'_>) -> Option<String> {
    element
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty() && !href.starts_with('#'))
        .map(str::to_string)
}

fn find_time(element: ElementRef<'_>) -> Option<DateTime<Utc>> {
    let node = element.select(&TIME_SELECTOR).next()?;
    let datetime = node.value().attr("datetime")?;
    DateTime::parse_from_rfc3339(datetime)
        .ok()
        .or_else(|| DateTime::parse_from_rfc2822(datetime).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn find_snippet(element: ElementRef<'_>) -> String {
    element
        .select(&PARAGRAPH_SELECTOR)
        .take(3)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn absolutize(href: &str, base: &str) -> Option<String> {
    let base = url::Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;

    fn html_source() -> BlogSource {
        BlogSource::new("Example Blog", "https://example.com/blog", SourceKind::Html)
    }

    #[test]
    fn test_parse_feed_date_formats() {
        assert!(parse_feed_date("Tue, 05 Aug 2025 12:00:00 GMT").is_some());
        assert!(parse_feed_date("2025-08-05T12:00:00Z").is_some());
        assert!(parse_feed_date("yesterday-ish").is_none());
    }

    #[test]
    fn test_clean_title_decodes_entities() {
        assert_eq!(clean_title("  Scaling &amp; Sharding  "), "Scaling & Sharding");
    }

    #[test]
    fn test_parse_rss_channel() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Example Engineering</title>
    <link>https://example.com</link>
    <description>Posts</description>
    <item>
      <title>How We Sharded the Database</title>
      <link>https://example.com/posts/sharding</link>
      <pubDate>Tue, 05 Aug 2025 12:00:00 GMT</pubDate>
      <description>&lt;p&gt;We split the primary into sixteen shards.&lt;/p&gt;</description>
    </item>
    <item>
      <title>Untitled but no link</title>
    </item>
  </channel>
</rss>"#;

        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        let articles = parse_rss_channel(&channel, "Example Engineering");

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "How We Sharded the Database");
        assert_eq!(articles[0].url, "https://example.com/posts/sharding");
        assert_eq!(articles[0].source, "Example Engineering");
        assert!(articles[0].content.contains("sixteen shards"));
    }

    #[test]
    fn test_parse_atom_feed() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Engineering</title>
  <id>urn:uuid:1</id>
  <updated>2025-08-05T12:00:00Z</updated>
  <entry>
    <title>Profiling Allocations</title>
    <id>urn:uuid:2</id>
    <updated>2025-08-05T09:30:00Z</updated>
    <link href="https://example.com/posts/profiling"/>
    <summary>We traced every allocation in the hot path.</summary>
  </entry>
</feed>"#;

        let feed = atom_syndication::Feed::read_from(xml.as_bytes()).unwrap();
        let articles = parse_atom_feed(&feed, "Example Engineering");

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Profiling Allocations");
        assert_eq!(articles[0].url, "https://example.com/posts/profiling");
        assert!(articles[0].content.contains("hot path"));
    }

    #[test]
    fn test_html_fallback_finds_article_elements() {
        let html = r#"<html><body>
<article>
  <h2>Reducing Tail Latency</h2>
  <a href="/posts/tail-latency">Read more</a>
  <time datetime="2025-08-05T10:00:00Z">Aug 5</time>
  <p>We cut p99 latency in half with request hedging.</p>
</article>
<article>
  <h2>Second Post</h2>
  <a href="https://other.example.com/second">link</a>
  <p>Another body.</p>
</article>
</body></html>"#;

        let articles = extract_articles_from_html(html, &html_source());

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Reducing Tail Latency");
        // Relative links are resolved against the page URL.
        assert_eq!(articles[0].url, "https://example.com/posts/tail-latency");
        assert_eq!(articles[1].url, "https://other.example.com/second");
        assert!(articles[0].content.contains("request hedging"));
    }

    #[test]
    fn test_html_fallback_class_patterns() {
        let html = r#"<html><body>
<div class="blog-post">
  <h3>Queue Backpressure</h3>
  <a href="/posts/backpressure">Read</a>
  <p>Shedding load beats buffering it.</p>
</div>
</body></html>"#;

        let articles = extract_articles_from_html(html, &html_source());

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Queue Backpressure");
    }

    #[test]
    fn test_html_fallback_skips_incomplete_candidates() {
        let html = "<html><body><article><p>No title or link here.</p></article></body></html>";
        let articles = extract_articles_from_html(html, &html_source());
        assert!(articles.is_empty());
    }
}
