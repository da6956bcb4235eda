//! Screening report structures

use crate::error::DocumentFailure;
use crate::processing::normalizer::NormalizationMode;
use crate::processing::ranker::{format_percent, MatchTier, RankedEntry};
use crate::processing::screener::{CandidateDetail, ScreeningOutcome, WeightedTerm};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Complete result of screening a batch of resumes against one job description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningReport {
    /// Where the job description came from and what it contained
    pub job: JobSummary,

    /// Candidates ordered best-first
    pub rankings: Vec<RankedEntry>,

    /// Per-candidate keyword and skills details, in ranking order
    pub details: Vec<CandidateDetail>,

    /// The best candidate, if any were ranked
    pub top_match: Option<TopMatch>,

    /// Tier counts and average score
    pub summary: RankingSummary,

    /// Documents left out of the ranking and why
    pub failures: Vec<DocumentFailure>,

    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub source: String,
    pub word_count: usize,
    pub term_count: usize,
    pub skills_section: String,
    pub top_terms: Vec<WeightedTerm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMatch {
    pub document_id: String,
    pub score: f64,
    pub score_percent: String,
    pub match_tier: MatchTier,
    pub matched_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSummary {
    pub total_candidates: usize,
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
    /// Mean score over ranked candidates, 0.0 when there are none
    pub average_score: f64,
    pub average_score_percent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// When the report was generated
    pub generated_at: SystemTime,

    /// Version of the screener used
    pub screener_version: String,

    /// Total processing time
    pub processing_time_ms: u64,

    pub vocabulary_size: usize,
    pub max_features: usize,
    pub ngram_range: (usize, usize),
    pub normalization_mode: NormalizationMode,
}

impl RankingSummary {
    pub fn from_rankings(rankings: &[RankedEntry]) -> Self {
        let count = |tier: MatchTier| rankings.iter().filter(|e| e.match_tier == tier).count();

        let average_score = if rankings.is_empty() {
            0.0
        } else {
            rankings.iter().map(|e| e.score).sum::<f64>() / rankings.len() as f64
        };

        Self {
            total_candidates: rankings.len(),
            excellent: count(MatchTier::Excellent),
            good: count(MatchTier::Good),
            fair: count(MatchTier::Fair),
            poor: count(MatchTier::Poor),
            average_score,
            average_score_percent: format_percent(average_score),
        }
    }

    pub fn count_for(&self, tier: MatchTier) -> usize {
        match tier {
            MatchTier::Excellent => self.excellent,
            MatchTier::Good => self.good,
            MatchTier::Fair => self.fair,
            MatchTier::Poor => self.poor,
        }
    }
}

impl ScreeningReport {
    /// Assemble a report from a screening run. `job_source` names where the
    /// job description came from (a file path or "inline").
    pub fn from_outcome(outcome: ScreeningOutcome, job_source: &str) -> Self {
        let summary = RankingSummary::from_rankings(&outcome.rankings);

        let top_match = outcome.rankings.first().map(|entry| TopMatch {
            document_id: entry.document_id.clone(),
            score: entry.score,
            score_percent: entry.score_percent.clone(),
            match_tier: entry.match_tier,
            matched_keywords: outcome
                .details
                .iter()
                .find(|detail| detail.rank == entry.rank)
                .map(|detail| detail.matched_keywords.clone())
                .unwrap_or_default(),
        });

        let metadata = ReportMetadata {
            generated_at: SystemTime::now(),
            screener_version: env!("CARGO_PKG_VERSION").to_string(),
            processing_time_ms: outcome.processing_time_ms,
            vocabulary_size: outcome.vocabulary_size,
            max_features: outcome.vectorizer.max_features,
            ngram_range: (outcome.vectorizer.ngram_min, outcome.vectorizer.ngram_max),
            normalization_mode: outcome.normalization_mode,
        };

        Self {
            job: JobSummary {
                source: job_source.to_string(),
                word_count: outcome.job.word_count,
                term_count: outcome.job.term_count,
                skills_section: outcome.job.skills_section,
                top_terms: outcome.top_query_terms,
            },
            rankings: outcome.rankings,
            details: outcome.details,
            top_match,
            summary,
            failures: outcome.failures,
            metadata,
        }
    }

    /// Details of the candidate at a ranking position. Document ids are
    /// file names and may repeat across directories, so lookups go by rank.
    pub fn detail_for(&self, rank: usize) -> Option<&CandidateDetail> {
        self.details.iter().find(|detail| detail.rank == rank)
    }
}
