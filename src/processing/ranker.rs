//! Ranking and match tiers

use serde::{Deserialize, Serialize};

pub const EXCELLENT_THRESHOLD: f64 = 0.30;
pub const GOOD_THRESHOLD: f64 = 0.15;
pub const FAIR_THRESHOLD: f64 = 0.05;

/// Qualitative bucket for a similarity score. Thresholds are strict lower
/// bounds: a score of exactly 0.30 is `Good`, not `Excellent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl MatchTier {
    pub fn from_score(score: f64) -> Self {
        if score > EXCELLENT_THRESHOLD {
            MatchTier::Excellent
        } else if score > GOOD_THRESHOLD {
            MatchTier::Good
        } else if score > FAIR_THRESHOLD {
            MatchTier::Fair
        } else {
            MatchTier::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::Excellent => "Excellent",
            MatchTier::Good => "Good",
            MatchTier::Fair => "Fair",
            MatchTier::Poor => "Poor",
        }
    }

    pub fn all() -> [MatchTier; 4] {
        [
            MatchTier::Excellent,
            MatchTier::Good,
            MatchTier::Fair,
            MatchTier::Poor,
        ]
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Similarity of one candidate to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    /// Position of the candidate in the corpus
    pub index: usize,
    pub document_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// 1-based position
    pub rank: usize,
    pub document_id: String,
    pub score: f64,
    /// Score times 100 with two decimals, e.g. `"23.45%"`
    pub score_percent: String,
    pub match_tier: MatchTier,
    #[serde(skip)]
    pub corpus_index: usize,
}

pub fn format_percent(score: f64) -> String {
    format!("{:.2}%", score * 100.0)
}

/// Turn similarity results, already sorted best-first, into ranked entries.
/// Order is preserved as given.
pub fn rank(results: &[SimilarityResult]) -> Vec<RankedEntry> {
    results
        .iter()
        .enumerate()
        .map(|(position, result)| RankedEntry {
            rank: position + 1,
            document_id: result.document_id.clone(),
            score: result.score,
            score_percent: format_percent(result.score),
            match_tier: MatchTier::from_score(result.score),
            corpus_index: result.index,
        })
        .collect()
}
