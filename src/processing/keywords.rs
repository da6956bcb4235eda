//! Keyword overlap between a job description and a resume

use crate::processing::normalizer::Normalizer;
use std::collections::HashSet;

/// Reports normalized terms shared by the query and a candidate.
///
/// Terms are returned in the order they first occur in the query and only
/// terms longer than `min_length` characters count.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    min_length: usize,
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(2)
    }
}

impl KeywordMatcher {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Normalize both raw texts, then match.
    pub fn matched_keywords(
        &self,
        normalizer: &Normalizer,
        query: &str,
        candidate: &str,
        top_n: usize,
    ) -> Vec<String> {
        let query = normalizer.normalize(query);
        let candidate = normalizer.normalize(candidate);
        self.match_normalized(&query, &candidate, top_n)
    }

    /// Match texts that are already normalized.
    pub fn match_normalized(&self, query: &str, candidate: &str, top_n: usize) -> Vec<String> {
        let candidate_terms: HashSet<&str> = candidate.split_whitespace().collect();
        let mut seen = HashSet::new();

        query
            .split_whitespace()
            .filter(|term| term.chars().count() > self.min_length)
            .filter(|term| candidate_terms.contains(term))
            .filter(|term| seen.insert(*term))
            .take(top_n)
            .map(str::to_string)
            .collect()
    }
}
