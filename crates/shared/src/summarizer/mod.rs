//! Article summarization strategies.

use serde::{Deserialize, Serialize};

use crate::models::{Article, Summary};

mod first_paragraph;
mod keywords;
mod textrank;

pub use first_paragraph::FirstParagraphSummarizer;
pub use keywords::KeywordExtractor;
pub use textrank::TextRankSummarizer;

/// A summarization strategy: one article in, one summary record out.
///
/// Implementations are pure and keep no state across calls, so a single
/// summarizer may be shared freely across threads.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, article: &Article) -> Summary;

    fn summarize_batch(&self, articles: &[Article]) -> Vec<Summary> {
        articles.iter().map(|a| self.summarize(a)).collect()
    }
}

/// Which summarization strategy to use, selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMethod {
    FirstParagraph,
    #[serde(rename = "textrank")]
    TextRank,
}

impl SummaryMethod {
    /// Build the summarizer for this method with the requested summary
    /// sentence count.
    pub fn create(self, sentences: usize) -> Box<dyn Summarizer> {
        match self {
            SummaryMethod::FirstParagraph => {
                Box::new(FirstParagraphSummarizer::new().with_max_sentences(sentences))
            }
            SummaryMethod::TextRank => {
                Box::new(TextRankSummarizer::new().with_sentences(sentences))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article(content: &str) -> Article {
        Article::new(
            "Test Article",
            "https://example.com/post",
            Utc::now(),
            content,
            "Example Blog",
        )
    }

    #[test]
    fn test_method_selects_strategy() {
        let text = "First sentence is right here. Second sentence is right here. \
                    Third sentence is right here. Fourth sentence is right here.";

        for method in [SummaryMethod::FirstParagraph, SummaryMethod::TextRank] {
            let summarizer = method.create(2);
            let summary = summarizer.summarize(&article(text));
            assert!(!summary.summary.is_empty());
            assert_eq!(summary.title, "Test Article");
        }
    }

    #[test]
    fn test_batch_preserves_order_and_metadata() {
        let articles = vec![article("Alpha content goes here today. More alpha content follows now."),
                            article("Beta content goes here today. More beta content follows now.")];
        let summarizer = SummaryMethod::TextRank.create(3);
        let summaries = summarizer.summarize_batch(&articles);

        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].summary.contains("alpha") || summaries[0].summary.contains("Alpha"));
        assert_eq!(summaries[1].url, "https://example.com/post");
    }

    #[test]
    fn test_method_serde_names() {
        let method: SummaryMethod = serde_yaml::from_str("textrank").unwrap();
        assert_eq!(method, SummaryMethod::TextRank);
        let method: SummaryMethod = serde_yaml::from_str("first_paragraph").unwrap();
        assert_eq!(method, SummaryMethod::FirstParagraph);
    }
}
