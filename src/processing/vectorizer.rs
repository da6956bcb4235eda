//! TF-IDF vectorization and cosine similarity
//!
//! The vocabulary is fitted on the query plus every candidate. Features are
//! word n-grams; when the vocabulary exceeds `max_features` only the most
//! frequent terms (by total count across the corpus, ties broken
//! alphabetically) are kept. Weights use smoothed inverse document frequency,
//! `ln((1 + n) / (1 + df)) + 1`, and every row is L2-normalized, so cosine
//! similarity reduces to a dot product.

use crate::config::VectorizerConfig;
use crate::error::{Result, ScreenerError};
use log::{debug, warn};
use ndarray::{s, Array1, Array2, ArrayView1};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Splits text into lowercase word n-grams. Single-character tokens are ignored.
#[derive(Debug, Clone)]
pub struct Analyzer {
    token_pattern: Regex,
    ngram_min: usize,
    ngram_max: usize,
}

impl Analyzer {
    pub fn new(ngram_min: usize, ngram_max: usize) -> Self {
        let token_pattern = Regex::new(r"\b\w\w+\b").expect("Invalid token regex");
        Self {
            token_pattern,
            ngram_min,
            ngram_max,
        }
    }

    pub fn analyze(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .collect();

        let mut terms = Vec::new();
        for n in self.ngram_min..=self.ngram_max {
            if n > tokens.len() {
                break;
            }
            terms.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
        terms
    }

    fn term_counts(&self, text: &str) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for term in self.analyze(text) {
            *counts.entry(term).or_insert(0) += 1;
        }
        counts
    }
}

/// Score of one candidate against the query, by corpus position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub index: usize,
    pub score: f64,
}

/// Scores sorted best-first, plus the fitted model for further projections.
/// `model` is `None` when the corpus produced no vocabulary.
#[derive(Debug, Clone)]
pub struct SimilarityOutcome {
    pub scores: Vec<CandidateScore>,
    pub model: Option<TfidfModel>,
}

impl SimilarityOutcome {
    fn empty() -> Self {
        Self {
            scores: Vec::new(),
            model: None,
        }
    }
}

pub struct TfidfVectorizer {
    config: VectorizerConfig,
    analyzer: Analyzer,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        let config = VectorizerConfig::default();
        Self {
            analyzer: Analyzer::new(config.ngram_min, config.ngram_max),
            config,
        }
    }
}

impl TfidfVectorizer {
    pub fn new(config: VectorizerConfig) -> Result<Self> {
        config.validate()?;
        if !config.is_calibrated() {
            warn!(
                "Vectorizer settings differ from the defaults (max_features={}, ngram_range={}..={}); match tiers may not be meaningful",
                config.max_features, config.ngram_min, config.ngram_max
            );
        }

        Ok(Self {
            analyzer: Analyzer::new(config.ngram_min, config.ngram_max),
            config,
        })
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Fit on the query and candidates together and score every candidate
    /// against the query. Scores are in `[0, 1]`, sorted descending; equal
    /// scores keep corpus order.
    pub fn fit_score(&self, query: &str, candidates: &[&str]) -> Result<SimilarityOutcome> {
        if query.trim().is_empty() || candidates.is_empty() {
            return Ok(SimilarityOutcome::empty());
        }

        let counts: Vec<HashMap<String, usize>> = std::iter::once(query)
            .chain(candidates.iter().copied())
            .map(|text| self.analyzer.term_counts(text))
            .collect();

        let vocabulary = self.select_vocabulary(&counts);
        if vocabulary.is_empty() {
            debug!("No terms survived analysis; nothing to score");
            return Ok(SimilarityOutcome::empty());
        }

        let index: HashMap<String, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();

        let n_docs = counts.len();
        let mut matrix = Array2::<f64>::zeros((n_docs, vocabulary.len()));
        for (row, doc_counts) in counts.iter().enumerate() {
            for (term, &count) in doc_counts {
                if let Some(&col) = index.get(term) {
                    matrix[[row, col]] = count as f64;
                }
            }
        }

        let idf = Array1::from_iter(matrix.columns().into_iter().map(|column| {
            let df = column.iter().filter(|&&count| count > 0.0).count() as f64;
            ((1.0 + n_docs as f64) / (1.0 + df)).ln() + 1.0
        }));

        matrix *= &idf;
        for mut row in matrix.rows_mut() {
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|weight| weight / norm);
            }
        }

        let query_row = matrix.row(0);
        let raw_scores = matrix.slice(s![1.., ..]).dot(&query_row);
        if raw_scores.iter().any(|score| !score.is_finite()) {
            return Err(ScreenerError::Vectorization(
                "similarity produced a non-finite score".to_string(),
            ));
        }

        let mut scores: Vec<CandidateScore> = raw_scores
            .iter()
            .enumerate()
            .map(|(index, &score)| CandidateScore {
                index,
                score: score.clamp(0.0, 1.0),
            })
            .collect();
        scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        debug!(
            "Scored {} candidates over a vocabulary of {} terms",
            scores.len(),
            vocabulary.len()
        );

        Ok(SimilarityOutcome {
            scores,
            model: Some(TfidfModel {
                analyzer: self.analyzer.clone(),
                index,
                vocabulary,
                idf,
            }),
        })
    }

    /// Alphabetical vocabulary, capped to the most frequent terms.
    fn select_vocabulary(&self, counts: &[HashMap<String, usize>]) -> Vec<String> {
        let mut totals: HashMap<&str, usize> = HashMap::new();
        for doc_counts in counts {
            for (term, &count) in doc_counts {
                *totals.entry(term.as_str()).or_insert(0) += count;
            }
        }

        let mut terms: Vec<(&str, usize)> = totals.into_iter().collect();
        terms.sort_by(|a, b| a.0.cmp(b.0));

        if terms.len() > self.config.max_features {
            terms.sort_by(|a, b| b.1.cmp(&a.1));
            terms.truncate(self.config.max_features);
            terms.sort_by(|a, b| a.0.cmp(b.0));
        }

        terms.into_iter().map(|(term, _)| term.to_string()).collect()
    }
}

/// A fitted vocabulary with its IDF weights.
#[derive(Debug, Clone)]
pub struct TfidfModel {
    analyzer: Analyzer,
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    idf: Array1<f64>,
}

impl TfidfModel {
    /// Project text onto the fitted vocabulary. Unknown terms are ignored;
    /// text with no known terms gives the zero vector.
    pub fn transform(&self, text: &str) -> Array1<f64> {
        let mut vector = Array1::<f64>::zeros(self.vocabulary.len());
        for (term, count) in self.analyzer.term_counts(text) {
            if let Some(&col) = self.index.get(&term) {
                vector[col] = count as f64 * self.idf[col];
            }
        }

        let norm = vector.dot(&vector).sqrt();
        if norm > 0.0 {
            vector.mapv_inplace(|weight| weight / norm);
        }
        vector
    }

    /// Cosine similarity in `[0, 1]`; zero when either vector is zero.
    pub fn similarity(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        let norms = a.dot(&a).sqrt() * b.dot(&b).sqrt();
        if norms == 0.0 {
            return 0.0;
        }
        (a.dot(&b) / norms).clamp(0.0, 1.0)
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.index.get(term).map(|&col| self.idf[col])
    }

    /// Highest-weighted terms of a projected vector, ties alphabetical.
    pub fn top_terms(&self, vector: ArrayView1<f64>, n: usize) -> Vec<(String, f64)> {
        let mut weighted: Vec<(String, f64)> = vector
            .iter()
            .enumerate()
            .filter(|&(_, &weight)| weight > 0.0)
            .map(|(col, &weight)| (self.vocabulary[col].clone(), weight))
            .collect();

        weighted.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        weighted.truncate(n);
        weighted
    }
}
