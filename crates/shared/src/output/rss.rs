use chrono::Utc;
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};

use super::Renderer;
use crate::models::Summary;

/// Renders the digest as an RSS 2.0 feed that can be subscribed to in
/// any feed reader.
pub struct RssRenderer {
    link: String,
    description: String,
}

impl Default for RssRenderer {
    fn default() -> Self {
        Self {
            link: "https://github.com/eng-digest/eng-digest".to_string(),
            description: "Daily digest of engineering blog posts".to_string(),
        }
    }
}

impl RssRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }
}

impl Renderer for RssRenderer {
    fn render(&self, summaries: &[Summary], title: &str) -> String {
        let items: Vec<rss::Item> = summaries
            .iter()
            .map(|summary| {
                let mut description = summary.summary.clone();
                if !summary.keywords.is_empty() {
                    description.push_str(&format!(
                        "\n\nKeywords: {}",
                        summary.keywords.join(", ")
                    ));
                }

                ItemBuilder::default()
                    .title(Some(summary.title.clone()))
                    .link(Some(summary.url.clone()))
                    .description(Some(description))
                    .pub_date(summary.published.map(|d| d.to_rfc2822()))
                    .guid(Some(
                        GuidBuilder::default()
                            .value(summary.url.clone())
                            .permalink(true)
                            .build(),
                    ))
                    .build()
            })
            .collect();

        let channel = ChannelBuilder::default()
            .title(title.to_string())
            .link(self.link.clone())
            .description(self.description.clone())
            .language(Some("en-us".to_string()))
            .last_build_date(Some(Utc::now().to_rfc2822()))
            .items(items)
            .build();

        channel.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;
    use chrono::Utc;

    fn summaries() -> Vec<Summary> {
        let article = Article::new(
            "Zero-Copy Parsing",
            "https://example.com/zero-copy",
            Utc::now(),
            "Body",
            "Example Blog",
        );
        vec![Summary::for_article(
            &article,
            "Borrowing beats allocating.",
            vec!["parsing".into(), "performance".into()],
        )]
    }

    #[test]
    fn test_feed_round_trips_through_parser() {
        let rendered = RssRenderer::new().render(&summaries(), "Engineering Daily Digest");
        let channel = rss::Channel::read_from(rendered.as_bytes()).unwrap();

        assert_eq!(channel.title(), "Engineering Daily Digest");
        assert_eq!(channel.items().len(), 1);

        let item = &channel.items()[0];
        assert_eq!(item.title(), Some("Zero-Copy Parsing"));
        assert_eq!(item.link(), Some("https://example.com/zero-copy"));
        assert!(item.description().unwrap().contains("Borrowing beats allocating."));
        assert!(item.description().unwrap().contains("Keywords: parsing, performance"));
        assert!(item.pub_date().is_some());
    }

    #[test]
    fn test_empty_digest_is_valid_feed() {
        let rendered = RssRenderer::new().render(&[], "Engineering Daily Digest");
        let channel = rss::Channel::read_from(rendered.as_bytes()).unwrap();
        assert!(channel.items().is_empty());
    }
}
