//! TF and TF-IDF keyword extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-z]{3,}\b").unwrap());

/// Function words excluded from keyword candidates. Wider than the
/// ranking stop-word list; keywords tolerate aggressive filtering where
/// sentence similarity does not.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
        "it", "its", "of", "on", "that", "the", "to", "was", "will", "with", "we", "you", "your",
        "this", "but", "they", "have", "had", "what", "when", "where", "who", "which", "why",
        "how", "can", "could", "would", "should", "may", "might", "must", "shall", "been",
        "being", "do", "does", "did", "done", "all", "any", "both", "each", "few", "more",
        "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
        "too", "very", "also", "just", "our",
    ]
    .into_iter()
    .collect()
});

/// Extracts keywords by term frequency, or TF-IDF across a batch of
/// documents.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    max_keywords: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self { max_keywords: 10 }
    }
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_keywords(mut self, max_keywords: usize) -> Self {
        self.max_keywords = max_keywords;
        self
    }

    /// Keywords for a single text. With one document, plain term
    /// frequency is the whole signal.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let words = tokenize(text);
        let tf = term_frequency(&words);

        self.top_scored(tf)
    }

    /// Keywords for each text in a batch, weighted by TF-IDF so terms
    /// common to every document rank low.
    pub fn extract_batch(&self, texts: &[&str]) -> Vec<Vec<String>> {
        let all_words: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();
        let idf = inverse_document_frequency(&all_words);

        all_words
            .iter()
            .map(|words| {
                let tf = term_frequency(words);
                let tfidf: HashMap<String, f64> = tf
                    .into_iter()
                    .map(|(word, tf)| {
                        let idf = idf.get(&word).copied().unwrap_or(0.0);
                        (word, tf * idf)
                    })
                    .collect();
                self.top_scored(tfidf)
            })
            .collect()
    }

    /// Highest-scoring words first; ties resolve alphabetically so output
    /// is deterministic.
    fn top_scored(&self, scores: HashMap<String, f64>) -> Vec<String> {
        let mut scored: Vec<(String, f64)> = scores.into_iter().collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        scored
            .into_iter()
            .take(self.max_keywords)
            .map(|(word, _)| word)
            .collect()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .filter(|w| !STOP_WORDS.contains(w.as_str()))
        .collect()
}

fn term_frequency(words: &[String]) -> HashMap<String, f64> {
    if words.is_empty() {
        return HashMap::new();
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in words {
        *counts.entry(word.clone()).or_insert(0) += 1;
    }

    let total = words.len() as f64;
    counts
        .into_iter()
        .map(|(word, count)| (word, count as f64 / total))
        .collect()
}

fn inverse_document_frequency(all_words: &[Vec<String>]) -> HashMap<String, f64> {
    if all_words.is_empty() {
        return HashMap::new();
    }

    let mut doc_count: HashMap<&str, usize> = HashMap::new();
    for words in all_words {
        let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
        for word in unique {
            *doc_count.entry(word).or_insert(0) += 1;
        }
    }

    let total_docs = all_words.len() as f64;
    doc_count
        .into_iter()
        .map(|(word, count)| (word.to_string(), (total_docs / count as f64).ln()))
        .collect()
}
