//! Screening engine tying extraction, normalization, scoring and ranking together

use crate::config::{ProcessingConfig, VectorizerConfig};
use crate::error::{DocumentFailure, FailureKind, Result, ScreenerError};
use crate::input::text_extractor::{extract_text, PageSource, PdfPageSource};
use crate::processing::document::{Corpus, Document, DocumentContent, DocumentRole, RawDocument};
use crate::processing::keywords::KeywordMatcher;
use crate::processing::normalizer::{NormalizationMode, Normalizer};
use crate::processing::ranker::{rank, RankedEntry, SimilarityResult};
use crate::processing::section::SectionExtractor;
use crate::processing::vectorizer::{TfidfModel, TfidfVectorizer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

const QUERY_ID: &str = "job_description";
const TOP_QUERY_TERMS: usize = 10;

/// Main screening engine that coordinates all processing components
pub struct ScreeningEngine {
    normalizer: Normalizer,
    sections: SectionExtractor,
    vectorizer: TfidfVectorizer,
    keywords: KeywordMatcher,
    page_source: Box<dyn PageSource + Send + Sync>,
    keyword_top_n: usize,
}

/// Everything one screening run produced, before report assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningOutcome {
    pub job: JobProfile,
    pub rankings: Vec<RankedEntry>,
    /// Per-candidate details, in ranking order
    pub details: Vec<CandidateDetail>,
    pub failures: Vec<DocumentFailure>,
    pub vocabulary_size: usize,
    /// Highest-weighted job description terms in the fitted vocabulary
    pub top_query_terms: Vec<WeightedTerm>,
    pub normalization_mode: NormalizationMode,
    pub vectorizer: VectorizerConfig,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProfile {
    pub word_count: usize,
    pub term_count: usize,
    pub skills_section: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDetail {
    /// Ranking position this detail belongs to
    pub rank: usize,
    pub document_id: String,
    pub matched_keywords: Vec<String>,
    /// Similarity of the candidate's skills section to the job description,
    /// `None` when the resume has no recognizable skills section
    pub skills_similarity: Option<f64>,
    pub skills_section: String,
    pub word_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: f64,
}

impl ScreeningEngine {
    pub fn new(config: &ProcessingConfig) -> Result<Self> {
        let normalizer = Normalizer::from_config(config);
        let sections = SectionExtractor::new(&config.section_labels)?;
        let vectorizer = TfidfVectorizer::new(config.vectorizer.clone())?;

        info!(
            "Screening engine ready ({} normalization, {} max features)",
            normalizer.mode(),
            config.vectorizer.max_features
        );

        Ok(Self {
            normalizer,
            sections,
            vectorizer,
            keywords: KeywordMatcher::new(config.keyword_min_length),
            page_source: Box::new(PdfPageSource),
            keyword_top_n: config.keyword_top_n,
        })
    }

    /// Replace the PDF parser used for binary documents.
    pub fn with_page_source(mut self, source: impl PageSource + Send + Sync + 'static) -> Self {
        self.page_source = Box::new(source);
        self
    }

    /// Replace the normalizer, e.g. to force the fallback pipeline.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Plain text of a raw document. Binary content goes through the page source.
    pub fn extract(&self, document: &RawDocument) -> Result<String> {
        match &document.content {
            DocumentContent::Binary(bytes) => extract_text(self.page_source.as_ref(), bytes),
            DocumentContent::Text(text) => Ok(text.trim().to_string()),
        }
    }

    /// Extract and normalize every candidate. Documents that fail are
    /// reported and left out; the rest keep their batch order.
    pub fn prepare_documents(&self, batch: &[RawDocument]) -> (Corpus, Vec<DocumentFailure>) {
        let mut corpus = Corpus::new();
        let mut failures = Vec::new();

        for raw in batch {
            let text = match self.extract(raw) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Could not extract {}: {}", raw.id, e);
                    failures.push(DocumentFailure::new(&raw.id, FailureKind::Extraction, e.to_string()));
                    continue;
                }
            };

            if text.is_empty() {
                warn!("No text extracted from {}", raw.id);
                failures.push(DocumentFailure::new(&raw.id, FailureKind::EmptyText, "no text extracted"));
                continue;
            }

            let document = Document::new(&raw.id, DocumentRole::Candidate, text, &self.normalizer, &self.sections);
            if !document.is_indexable() {
                warn!("Nothing left to index in {} after normalization", raw.id);
                failures.push(DocumentFailure::new(
                    &raw.id,
                    FailureKind::EmptyText,
                    "no indexable terms after normalization",
                ));
                continue;
            }

            debug!("Prepared {} ({} terms)", document.id, document.term_count());
            corpus.push(document);
        }

        (corpus, failures)
    }

    /// Rank every candidate in the batch against the job description.
    pub fn screen(&self, job_description: &str, batch: &[RawDocument]) -> Result<ScreeningOutcome> {
        let start_time = Instant::now();

        if job_description.trim().is_empty() {
            return Err(ScreenerError::EmptyQuery("job description is blank".to_string()));
        }

        let (corpus, failures) = self.prepare_documents(batch);
        if corpus.is_empty() {
            return Err(ScreenerError::EmptyCorpus { failures });
        }

        let query = Document::new(
            QUERY_ID,
            DocumentRole::Query,
            job_description.trim().to_string(),
            &self.normalizer,
            &self.sections,
        );
        if !query.is_indexable() {
            return Err(ScreenerError::EmptyQuery(
                "no terms left after normalization".to_string(),
            ));
        }

        info!("Scoring {} resumes ({} skipped)", corpus.len(), failures.len());

        let outcome = self
            .vectorizer
            .fit_score(&query.normalized_text, &corpus.normalized_texts())?;
        let model = outcome.model.ok_or_else(|| {
            ScreenerError::EmptyQuery("no indexable terms in the job description".to_string())
        })?;

        let results: Vec<SimilarityResult> = outcome
            .scores
            .iter()
            .filter_map(|score| {
                corpus.get(score.index).map(|document| SimilarityResult {
                    index: score.index,
                    document_id: document.id.clone(),
                    score: score.score,
                })
            })
            .collect();

        let rankings = rank(&results);
        let details = self.candidate_details(&rankings, &corpus, &query, &model);

        let query_vector = model.transform(&query.normalized_text);
        let top_query_terms = model
            .top_terms(query_vector.view(), TOP_QUERY_TERMS)
            .into_iter()
            .map(|(term, weight)| WeightedTerm { term, weight })
            .collect();

        let processing_time = start_time.elapsed();
        info!(
            "Ranked {} resumes in {} ms",
            rankings.len(),
            processing_time.as_millis()
        );

        Ok(ScreeningOutcome {
            job: JobProfile {
                word_count: query.word_count,
                term_count: query.term_count(),
                skills_section: query.skills_section.clone(),
            },
            rankings,
            details,
            failures,
            vocabulary_size: model.vocabulary_size(),
            top_query_terms,
            normalization_mode: self.normalizer.mode(),
            vectorizer: self.vectorizer.config().clone(),
            processing_time_ms: processing_time.as_millis() as u64,
        })
    }

    fn candidate_details(
        &self,
        rankings: &[RankedEntry],
        corpus: &Corpus,
        query: &Document,
        model: &TfidfModel,
    ) -> Vec<CandidateDetail> {
        let query_vector = model.transform(&query.normalized_text);

        rankings
            .iter()
            .filter_map(|entry| corpus.get(entry.corpus_index).map(|document| (entry.rank, document)))
            .map(|(rank, document)| {
                let matched_keywords = self.keywords.match_normalized(
                    &query.normalized_text,
                    &document.normalized_text,
                    self.keyword_top_n,
                );

                let skills_similarity = document.has_skills_section().then(|| {
                    let skills_vector = model.transform(&document.skills_section);
                    model.similarity(query_vector.view(), skills_vector.view())
                });

                CandidateDetail {
                    rank,
                    document_id: document.id.clone(),
                    matched_keywords,
                    skills_similarity,
                    skills_section: document.skills_section.clone(),
                    word_count: document.word_count,
                }
            })
            .collect()
    }

    /// Raw skills section of a text, for previews.
    pub fn preview_section<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.sections.raw_section(text)
    }

    /// Normalized skills section of a text, empty when there is none.
    pub fn skills_section(&self, text: &str) -> String {
        self.sections.extract(text, &self.normalizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::processing::ranker::MatchTier;

    struct BrokenPdf;

    impl PageSource for BrokenPdf {
        fn pages(&self, _bytes: &[u8]) -> Result<Vec<String>> {
            Err(ScreenerError::PdfExtraction("trailer not found".to_string()))
        }
    }

    struct BlankPdf;

    impl PageSource for BlankPdf {
        fn pages(&self, _bytes: &[u8]) -> Result<Vec<String>> {
            Ok(vec!["   ".to_string(), String::new()])
        }
    }

    fn engine() -> ScreeningEngine {
        ScreeningEngine::new(&Config::default().processing).unwrap()
    }

    #[test]
    fn test_relevant_resume_ranks_first() {
        let batch = vec![
            RawDocument::from_text("designer.txt", "Graphic designer with Photoshop skills"),
            RawDocument::from_text("developer.txt", "Experienced Python developer skilled in SQL databases"),
        ];

        let outcome = engine()
            .screen("Python developer with SQL and machine learning experience", &batch)
            .unwrap();

        assert_eq!(outcome.rankings[0].document_id, "developer.txt");
        assert!(outcome.rankings[0].score > 0.05);
        assert_eq!(outcome.rankings[1].score, 0.0);
        assert_eq!(outcome.rankings[1].match_tier, MatchTier::Poor);
        assert_eq!(outcome.details[0].document_id, "developer.txt");
        assert_eq!(outcome.details[1].rank, 2);
        assert!(outcome.details[0].matched_keywords.contains(&"python".to_string()));
    }

    #[test]
    fn test_blank_query_rejected() {
        let batch = vec![RawDocument::from_text("a.txt", "rust")];
        assert!(matches!(
            engine().screen("  \n ", &batch),
            Err(ScreenerError::EmptyQuery(_))
        ));
        assert!(matches!(
            engine().screen("the and of", &batch),
            Err(ScreenerError::EmptyQuery(_))
        ));
    }

    #[test]
    fn test_all_documents_failing_is_empty_corpus() {
        let engine = engine().with_page_source(BrokenPdf);
        let batch = vec![
            RawDocument::from_bytes("a.pdf", b"%PDF-1.4".to_vec()),
            RawDocument::from_text("b.txt", "   "),
        ];

        match engine.screen("rust engineer", &batch) {
            Err(ScreenerError::EmptyCorpus { failures }) => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].kind, FailureKind::Extraction);
                assert_eq!(failures[1].kind, FailureKind::EmptyText);
            }
            other => panic!("expected EmptyCorpus, got {:?}", other.map(|o| o.rankings)),
        }
    }

    #[test]
    fn test_blank_pdf_is_empty_text_failure() {
        let engine = engine().with_page_source(BlankPdf);
        let batch = vec![
            RawDocument::from_bytes("scan.pdf", vec![1, 2, 3]),
            RawDocument::from_text("ok.txt", "rust engineer"),
        ];

        let outcome = engine.screen("rust engineer", &batch).unwrap();
        assert_eq!(outcome.rankings.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].document_id, "scan.pdf");
        assert_eq!(outcome.failures[0].kind, FailureKind::EmptyText);
    }

    #[test]
    fn test_skills_similarity_only_with_section() {
        let batch = vec![
            RawDocument::from_text("with.txt", "Backend engineer\nSkills: Rust, Kafka\nEducation: BSc"),
            RawDocument::from_text("without.txt", "Backend engineer who writes Rust"),
        ];

        let outcome = engine().screen("Rust backend engineer, Kafka", &batch).unwrap();
        let with = outcome.details.iter().find(|d| d.document_id == "with.txt").unwrap();
        let without = outcome.details.iter().find(|d| d.document_id == "without.txt").unwrap();

        assert!(with.skills_similarity.unwrap() > 0.0);
        assert_eq!(with.skills_section, "rust kafka");
        assert_eq!(without.skills_similarity, None);
    }

    #[test]
    fn test_degraded_normalizer_still_ranks() {
        let engine = engine().with_normalizer(Normalizer::degraded());
        let batch = vec![
            RawDocument::from_text("a.txt", "Rust engineer"),
            RawDocument::from_text("b.txt", "Pastry chef"),
        ];

        let outcome = engine.screen("Rust engineer", &batch).unwrap();
        assert_eq!(outcome.normalization_mode, NormalizationMode::Degraded);
        assert_eq!(outcome.rankings[0].document_id, "a.txt");
    }
}
