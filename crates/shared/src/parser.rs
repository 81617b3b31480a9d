use chrono::{Duration, Utc};
use std::collections::HashMap;

use crate::models::Article;

/// Applies the configured recency and volume limits to fetched articles.
#[derive(Debug, Clone)]
pub struct ArticleFilter {
    lookback_hours: i64,
    max_posts_per_blog: usize,
    max_total_posts: usize,
}

impl ArticleFilter {
    pub fn new(lookback_hours: i64, max_posts_per_blog: usize, max_total_posts: usize) -> Self {
        Self {
            lookback_hours,
            max_posts_per_blog,
            max_total_posts,
        }
    }

    /// Recency window, then per-source cap, then global cap. Caps keep
    /// the newest articles.
    pub fn filter(&self, articles: Vec<Article>) -> Vec<Article> {
        let recent = self.filter_by_time(articles);
        let per_blog = self.filter_by_blog_limit(recent);
        self.filter_by_total_limit(per_blog)
    }

    fn filter_by_time(&self, articles: Vec<Article>) -> Vec<Article> {
        let cutoff = Utc::now() - Duration::hours(self.lookback_hours);
        articles
            .into_iter()
            .filter(|a| a.published >= cutoff)
            .collect()
    }

    fn filter_by_blog_limit(&self, articles: Vec<Article>) -> Vec<Article> {
        let mut by_source: HashMap<String, Vec<Article>> = HashMap::new();
        for article in articles {
            by_source
                .entry(article.source.clone())
                .or_default()
                .push(article);
        }

        let mut sources: Vec<String> = by_source.keys().cloned().collect();
        sources.sort();

        let mut filtered = Vec::new();
        for source in sources {
            let mut source_articles = by_source.remove(&source).unwrap_or_default();
            source_articles.sort_by(|a, b| b.published.cmp(&a.published));
            source_articles.truncate(self.max_posts_per_blog);
            filtered.extend(source_articles);
        }

        filtered
    }

    fn filter_by_total_limit(&self, mut articles: Vec<Article>) -> Vec<Article> {
        articles.sort_by(|a, b| b.published.cmp(&a.published));
        articles.truncate(self.max_total_posts);
        articles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn article(source: &str, title: &str, published: DateTime<Utc>) -> Article {
        Article::new(
            title,
            format!("https://example.com/{title}"),
            published,
            "Body text long enough to matter for this test case.",
            source,
        )
    }

    fn hours_ago(hours: i64) -> DateTime<Utc> {
        Utc::now() - Duration::hours(hours)
    }

    #[test]
    fn test_old_articles_dropped() {
        let filter = ArticleFilter::new(24, 10, 10);
        let articles = vec![
            article("Blog A", "fresh", hours_ago(1)),
            article("Blog A", "stale", hours_ago(48)),
        ];

        let filtered = filter.filter(articles);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "fresh");
    }

    #[test]
    fn test_per_blog_cap_keeps_newest() {
        let filter = ArticleFilter::new(24, 2, 10);
        let articles = vec![
            article("Blog A", "oldest", hours_ago(10)),
            article("Blog A", "newest", hours_ago(1)),
            article("Blog A", "middle", hours_ago(5)),
            article("Blog B", "other", hours_ago(2)),
        ];

        let filtered = filter.filter(articles);

        let blog_a: Vec<&str> = filtered
            .iter()
            .filter(|a| a.source == "Blog A")
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(blog_a, vec!["newest", "middle"]);
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_total_cap_keeps_newest_overall() {
        let filter = ArticleFilter::new(24, 10, 2);
        let articles = vec![
            article("Blog A", "a", hours_ago(6)),
            article("Blog B", "b", hours_ago(1)),
            article("Blog C", "c", hours_ago(3)),
        ];

        let filtered = filter.filter(articles);
        let titles: Vec<&str> = filtered.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c"]);
    }

    #[test]
    fn test_empty_input_passes_through() {
        let filter = ArticleFilter::new(24, 3, 10);
        assert!(filter.filter(Vec::new()).is_empty());
    }
}
