//! Extractive summarization with TextRank.
//!
//! Sentences become graph nodes, pairwise word overlap becomes edge
//! weight, and a damped PageRank-style iteration scores each sentence.
//! The top-scoring sentences are returned in their original document
//! order.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::Summarizer;
use crate::models::{Article, Summary};

const EMPTY_CONTENT_FALLBACK: &str = "No content available for summarization.";
const NO_SENTENCES_FALLBACK: &str = "Unable to extract sentences from content.";

/// Sentences with fewer whitespace-delimited words than this are dropped
/// before ranking and can never appear in a summary.
const MIN_SENTENCE_WORDS: usize = 5;

/// Per-component absolute tolerance for the convergence check.
const CONVERGENCE_TOLERANCE: f64 = 1e-6;

const PERIOD_MASK: &str = "<PERIOD>";

static ABBREVIATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(Mr|Mrs|Ms|Dr|Prof|Sr|Jr)\.").unwrap());
static INITIAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([A-Z])\.").unwrap());
static TERMINATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+\s+").unwrap());
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").unwrap());

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
        "it", "its", "of", "on", "that", "the", "to", "was", "will", "with", "this", "but",
        "they", "have", "had", "what", "when", "where", "who", "which", "why", "how",
    ]
    .into_iter()
    .collect()
});

/// TextRank sentence summarizer.
///
/// Parameters are fixed at construction; each `summarize` call is an
/// independent, deterministic computation with no state carried between
/// articles.
#[derive(Debug, Clone)]
pub struct TextRankSummarizer {
    sentences: usize,
    damping: f64,
    max_iterations: usize,
}

impl Default for TextRankSummarizer {
    fn default() -> Self {
        Self {
            sentences: 3,
            damping: 0.85,
            max_iterations: 100,
        }
    }
}

impl TextRankSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sentences in the summary.
    pub fn with_sentences(mut self, sentences: usize) -> Self {
        self.sentences = sentences;
        self
    }

    /// Damping factor for the ranking iteration (0.85 is standard).
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Iteration cap for the ranking step.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Split text into sentences, in document order.
    ///
    /// Periods belonging to common abbreviations and single-letter
    /// initials are masked before splitting so "Dr. Smith" stays whole.
    /// The split point is a run of `.`/`!`/`?` followed by whitespace and
    /// a capital letter; the terminator run itself is consumed.
    fn split_sentences(&self, text: &str) -> Vec<String> {
        let masked = ABBREVIATION_RE.replace_all(text, "${1}<PERIOD>");
        let masked = INITIAL_RE.replace_all(&masked, "${1}<PERIOD>");
        let masked = masked.as_ref();

        let mut pieces: Vec<&str> = Vec::new();
        let mut start = 0;
        for m in TERMINATOR_RE.find_iter(masked) {
            // The regex crate has no lookahead; check the capital letter
            // by hand.
            let followed_by_capital = masked[m.end()..]
                .chars()
                .next()
                .map(|c| c.is_ascii_uppercase())
                .unwrap_or(false);
            if followed_by_capital {
                pieces.push(&masked[start..m.start()]);
                start = m.end();
            }
        }
        pieces.push(&masked[start..]);

        pieces
            .into_iter()
            .map(|piece| piece.replace(PERIOD_MASK, ".").trim().to_string())
            .filter(|s| !s.is_empty())
            .filter(|s| s.split_whitespace().count() >= MIN_SENTENCE_WORDS)
            .collect()
    }

    /// Lowercase, extract `[a-z0-9]+` runs, drop stop words. No stemming
    /// and no deduplication here; the similarity step handles sets.
    fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN_RE
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .filter(|w| !STOP_WORDS.contains(w.as_str()))
            .collect()
    }

    /// Word-overlap similarity between two tokenized sentences.
    ///
    /// The intersection is taken over token *sets*, but the denominator
    /// is the geometric mean of the token *list* lengths, duplicates
    /// included. This is intentionally not textbook Jaccard and must stay
    /// as is for output stability.
    fn sentence_similarity(a: &[String], b: &[String]) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let set_a: HashSet<&str> = a.iter().map(String::as_str).collect();
        let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();
        let intersection = set_a.intersection(&set_b).count();

        let denominator = ((a.len() * b.len()) as f64).sqrt();
        if denominator == 0.0 {
            return 0.0;
        }

        intersection as f64 / denominator
    }

    /// Build the N x N sentence similarity matrix. The diagonal stays 0;
    /// the matrix is symmetric because the similarity function is.
    fn build_similarity_matrix(token_lists: &[Vec<String>]) -> Vec<Vec<f64>> {
        let n = token_lists.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    matrix[i][j] = Self::sentence_similarity(&token_lists[i], &token_lists[j]);
                }
            }
        }

        matrix
    }

    /// Damped power iteration over the row-normalized similarity matrix.
    ///
    /// Scores start uniform at 1/N and update as
    /// `new = (1-d)/N + d * M^T . score`. Iteration stops early once every
    /// component moves by at most 1e-6, or silently returns the last
    /// iterate at the cap.
    fn rank(&self, matrix: &[Vec<f64>]) -> Vec<f64> {
        let n = matrix.len();

        // Row-normalize into an outgoing-influence distribution. A row
        // summing to 0 keeps its zeros: that sentence neither boosts nor
        // starves anyone.
        let normalized: Vec<Vec<f64>> = matrix
            .iter()
            .map(|row| {
                let sum: f64 = row.iter().sum();
                let divisor = if sum == 0.0 { 1.0 } else { sum };
                row.iter().map(|v| v / divisor).collect()
            })
            .collect();

        let teleport = (1.0 - self.damping) / n as f64;
        let mut scores = vec![1.0 / n as f64; n];

        for _ in 0..self.max_iterations {
            let mut new_scores = vec![teleport; n];
            for (i, row) in normalized.iter().enumerate() {
                for (j, weight) in row.iter().enumerate() {
                    new_scores[j] += self.damping * weight * scores[i];
                }
            }

            let converged = scores
                .iter()
                .zip(new_scores.iter())
                .all(|(old, new)| (old - new).abs() <= CONVERGENCE_TOLERANCE);

            scores = new_scores;
            if converged {
                break;
            }
        }

        scores
    }

    /// Pick the K highest-scoring sentence indices, ties broken toward
    /// the earlier sentence, then reorder ascending so the summary reads
    /// in document order.
    fn select_top_sentences(&self, scores: &[f64]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..scores.len()).collect();
        indices.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut selected: Vec<usize> = indices.into_iter().take(self.sentences).collect();
        selected.sort_unstable();
        selected
    }
}

impl Summarizer for TextRankSummarizer {
    fn summarize(&self, article: &Article) -> Summary {
        let content = article.content.trim();
        if content.is_empty() {
            return Summary::for_article(article, EMPTY_CONTENT_FALLBACK, Vec::new());
        }

        let sentences = self.split_sentences(content);
        if sentences.is_empty() {
            return Summary::for_article(article, NO_SENTENCES_FALLBACK, Vec::new());
        }

        // With no more sentences than requested there is nothing to rank.
        if sentences.len() <= self.sentences {
            return Summary::for_article(article, sentences.join(" "), Vec::new());
        }

        let token_lists: Vec<Vec<String>> = sentences.iter().map(|s| self.tokenize(s)).collect();
        let matrix = Self::build_similarity_matrix(&token_lists);
        let scores = self.rank(&matrix);

        let selected = self.select_top_sentences(&scores);
        let summary_text = selected
            .iter()
            .map(|&i| sentences[i].as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Summary::for_article(article, summary_text, Vec::new())
    }
}
