//! First-paragraph summarization, the cheap default strategy.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{KeywordExtractor, Summarizer};
use crate::models::{Article, Summary};

const NO_SUMMARY_FALLBACK: &str = "No summary available.";

/// Paragraphs shorter than this many characters are skipped as likely
/// bylines or dates rather than prose.
const MIN_PARAGRAPH_CHARS: usize = 20;

static PARAGRAPH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\n+").unwrap());
static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+\s+").unwrap());

/// Summarizer that uses the first paragraph, or the first N sentences
/// when the text has no usable paragraph structure.
#[derive(Debug, Clone)]
pub struct FirstParagraphSummarizer {
    max_sentences: usize,
    max_length: usize,
    keywords: KeywordExtractor,
}

impl Default for FirstParagraphSummarizer {
    fn default() -> Self {
        Self {
            max_sentences: 3,
            max_length: 500,
            keywords: KeywordExtractor::new().with_max_keywords(5),
        }
    }
}

impl FirstParagraphSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sentence cap for the no-paragraph fallback.
    pub fn with_max_sentences(mut self, max_sentences: usize) -> Self {
        self.max_sentences = max_sentences;
        self
    }

    /// Character cap for the summary text.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    fn extract_first_paragraph(&self, content: &str) -> String {
        let paragraphs: Vec<&str> = PARAGRAPH_RE.split(content).collect();

        let mut first = paragraphs
            .iter()
            .map(|p| p.trim())
            .find(|p| p.len() > MIN_PARAGRAPH_CHARS)
            .unwrap_or("")
            .to_string();

        if first.is_empty() {
            if let Some(p) = paragraphs.first() {
                first = p.trim().to_string();
            }
        }

        if first.is_empty() {
            first = self.extract_first_sentences(content);
        }

        if first.len() > self.max_length {
            first = format!("{}...", truncate_at_word(&first, self.max_length));
        }

        if first.is_empty() {
            NO_SUMMARY_FALLBACK.to_string()
        } else {
            first
        }
    }

    fn extract_first_sentences(&self, content: &str) -> String {
        let sentences: Vec<&str> = SENTENCE_RE.split(content.trim()).collect();
        let mut result = sentences
            .into_iter()
            .take(self.max_sentences)
            .collect::<Vec<_>>()
            .join(" ");

        if !result.is_empty() && !result.ends_with(['.', '!', '?']) {
            result.push('.');
        }

        result
    }
}

/// Clip to at most `max_length` bytes, backing up to a char boundary and
/// then to the last space so no word is cut in half.
fn truncate_at_word(text: &str, max_length: usize) -> &str {
    let mut end = max_length;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    let clipped = &text[..end];
    match clipped.rfind(' ') {
        Some(cut) => &clipped[..cut],
        None => clipped,
    }
}

impl Summarizer for FirstParagraphSummarizer {
    fn summarize(&self, article: &Article) -> Summary {
        let content = article.content.trim();
        if content.is_empty() {
            return Summary::for_article(article, NO_SUMMARY_FALLBACK, Vec::new());
        }

        let summary_text = self.extract_first_paragraph(content);
        let keywords = self.keywords.extract(content);

        Summary::for_article(article, summary_text, keywords)
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
    fn test_uses_first_paragraph_only() {
        let content = "This is the first paragraph. It has multiple sentences.\n\n\
                       This is the second paragraph. It should not be included.\n\n\
                       This is the third paragraph.";
        let summary = FirstParagraphSummarizer::new().summarize(&article(content));

        assert!(summary.summary.contains("first paragraph"));
        assert!(!summary.summary.contains("second paragraph"));
    }

    #[test]
    fn test_single_paragraph_returned_whole() {
        let summarizer = FirstParagraphSummarizer::new();
        let content = "First sentence. Second sentence. Third sentence. Fourth sentence.";
        let summary = summarizer.summarize(&article(content));

        assert_eq!(summary.summary, content);
    }

    #[test]
    fn test_first_sentences_capped_and_terminated() {
        let summarizer = FirstParagraphSummarizer::new().with_max_sentences(2);
        let result = summarizer.extract_first_sentences("One here. Two here. Three here.");

        // The split consumes terminators; a final period is restored.
        assert_eq!(result, "One here Two here.");
    }

    #[test]
    fn test_respects_max_length() {
        let content = "This is a sentence. ".repeat(100);
        let summarizer = FirstParagraphSummarizer::new().with_max_length(200);
        let summary = summarizer.summarize(&article(&content));

        assert!(summary.summary.len() <= 204);
        assert!(summary.summary.ends_with("..."));
    }

    #[test]
    fn test_truncation_does_not_split_words() {
        let text = "alpha beta gamma delta";
        assert_eq!(truncate_at_word(text, 12), "alpha beta");
    }

    #[test]
    fn test_empty_content_fallback() {
        let summary = FirstParagraphSummarizer::new().summarize(&article(""));

        assert_eq!(summary.summary, NO_SUMMARY_FALLBACK);
        assert!(summary.keywords.is_empty());
        assert_eq!(summary.title, "Test Article");
    }

    #[test]
    fn test_extracts_keywords_from_full_content() {
        let content = "This article discusses machine learning and artificial intelligence.\n\n\
                       Machine learning is a subset of artificial intelligence.\n\n\
                       Deep learning is a type of machine learning.";
        let summary = FirstParagraphSummarizer::new().summarize(&article(content));

        assert!(!summary.keywords.is_empty());
        let joined = summary.keywords.join(" ");
        assert!(joined.contains("learning") || joined.contains("machine"));
    }
}
