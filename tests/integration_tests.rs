//! Integration tests for the resume screener

use resume_screener::config::{Config, OutputFormat};
use resume_screener::error::{FailureKind, ScreenerError};
use resume_screener::input::manager::InputManager;
use resume_screener::output::formatter::ReportGenerator;
use resume_screener::output::report::ScreeningReport;
use resume_screener::processing::document::{DocumentContent, RawDocument};
use resume_screener::processing::keywords::KeywordMatcher;
use resume_screener::processing::normalizer::Normalizer;
use resume_screener::processing::ranker::MatchTier;
use resume_screener::processing::screener::ScreeningEngine;
use std::path::{Path, PathBuf};

fn text_of(document: &RawDocument) -> &str {
    match &document.content {
        DocumentContent::Text(text) => text,
        DocumentContent::Binary(_) => panic!("expected decoded text for {}", document.id),
    }
}

fn engine() -> ScreeningEngine {
    ScreeningEngine::new(&Config::default().processing).unwrap()
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.txt");

    let document = manager.load(path).await.unwrap();
    let text = text_of(&document);

    assert_eq!(document.id, "sample_resume.txt");
    assert!(text.contains("John Doe"));
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("React"));
    assert!(text.contains("Node.js"));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.md");

    let document = manager.load(path).await.unwrap();
    let text = text_of(&document);

    assert!(text.contains("John Doe"));
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("React"));
    assert!(text.contains("Node.js"));
    // Should not contain markdown formatting
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
}

#[tokio::test]
async fn test_pdf_is_kept_as_bytes() {
    let mut manager = InputManager::new();
    let document = manager.load(Path::new("tests/fixtures/corrupt.pdf")).await.unwrap();
    assert!(matches!(document.content, DocumentContent::Binary(_)));
}

#[tokio::test]
async fn test_caching_functionality() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.txt");

    let first = manager.load(path).await.unwrap();
    assert_eq!(manager.cache_size(), 1);

    let second = manager.load(path).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(manager.cache_size(), 1);

    manager.clear_cache();
    assert_eq!(manager.cache_size(), 0);
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let mut manager = InputManager::new();
    let result = manager.load(Path::new("tests/fixtures/unsupported.xyz")).await;
    assert!(matches!(result, Err(ScreenerError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_nonexistent_file() {
    let mut manager = InputManager::new();
    let result = manager.load(Path::new("tests/fixtures/nonexistent.txt")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_batch_load_reports_unreadable_files() {
    let mut manager = InputManager::new();
    let paths: Vec<PathBuf> = ["sample_resume.txt", "unsupported.xyz", "missing.pdf", "designer_resume.txt"]
        .iter()
        .map(|name| Path::new("tests/fixtures").join(name))
        .collect();

    let (documents, failures) = manager.load_batch(&paths).await;

    assert_eq!(documents.len(), 2);
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().all(|f| f.kind == FailureKind::Read));
    assert_eq!(failures[0].document_id, "unsupported.xyz");
    assert_eq!(failures[1].document_id, "missing.pdf");
}

#[tokio::test]
async fn test_end_to_end_ranking_from_files() {
    let mut manager = InputManager::new();
    let job = manager
        .load(Path::new("tests/fixtures/job_description.txt"))
        .await
        .unwrap();
    let paths: Vec<PathBuf> = ["designer_resume.txt", "corrupt.pdf", "sample_resume.txt", "sample_resume.md"]
        .iter()
        .map(|name| Path::new("tests/fixtures").join(name))
        .collect();
    let (documents, read_failures) = manager.load_batch(&paths).await;
    assert!(read_failures.is_empty());

    let engine = engine();
    let job_text = engine.extract(&job).unwrap();
    let outcome = engine.screen(&job_text, &documents).unwrap();

    assert_eq!(outcome.rankings.len(), 3);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].document_id, "corrupt.pdf");
    assert!(matches!(
        outcome.failures[0].kind,
        FailureKind::Extraction | FailureKind::EmptyText
    ));

    let last = outcome.rankings.last().unwrap();
    assert_eq!(last.document_id, "designer_resume.txt");
    assert!(outcome.rankings[0].document_id.starts_with("sample_resume"));
    assert!(outcome.rankings[0].score > last.score);

    let ranks: Vec<usize> = outcome.rankings.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);

    let report = ScreeningReport::from_outcome(outcome, "tests/fixtures/job_description.txt");
    let top = report.top_match.as_ref().unwrap();
    assert!(top.matched_keywords.contains(&"react".to_string()));
    assert!(top.matched_keywords.contains(&"postgresql".to_string()));
    assert_eq!(report.summary.total_candidates, 3);

    let json = ReportGenerator::new()
        .generate_report(&report, &OutputFormat::Json)
        .unwrap();
    assert!(json.contains("\"rankings\""));
    assert!(json.contains("corrupt.pdf"));
}

#[test]
fn test_relevant_candidate_outranks_unrelated_one() {
    let batch = vec![
        RawDocument::from_text("A", "Experienced Python developer skilled in SQL databases"),
        RawDocument::from_text("B", "Graphic designer with Photoshop skills"),
    ];

    let outcome = engine()
        .screen("Python developer with SQL and machine learning experience", &batch)
        .unwrap();

    assert_eq!(outcome.rankings[0].document_id, "A");
    assert_eq!(outcome.rankings[1].document_id, "B");
    assert!(outcome.rankings[0].score > outcome.rankings[1].score);
    assert_eq!(outcome.rankings[1].match_tier, MatchTier::Poor);
}

#[test]
fn test_corrupt_documents_are_skipped_not_fatal() {
    let batch = vec![
        RawDocument::from_text("one.txt", "Rust engineer building Kafka pipelines"),
        RawDocument::from_bytes("broken-1.pdf", b"not a pdf at all".to_vec()),
        RawDocument::from_text("two.txt", "Go engineer running Kubernetes clusters"),
        RawDocument::from_bytes("broken-2.pdf", vec![0x25, 0x50, 0x44, 0x46, 0x00, 0xff]),
        RawDocument::from_text("three.txt", "Data analyst writing SQL reports"),
    ];

    let outcome = engine().screen("Rust engineer with Kafka", &batch).unwrap();

    assert_eq!(outcome.rankings.len(), 3);
    assert_eq!(outcome.failures.len(), 2);
    let failed: Vec<&str> = outcome.failures.iter().map(|f| f.document_id.as_str()).collect();
    assert_eq!(failed, vec!["broken-1.pdf", "broken-2.pdf"]);
    assert_eq!(outcome.rankings[0].document_id, "one.txt");
}

#[test]
fn test_empty_corpus_is_an_error() {
    let batch = vec![RawDocument::from_bytes("broken.pdf", b"garbage".to_vec())];

    match engine().screen("Rust engineer", &batch) {
        Err(ScreenerError::EmptyCorpus { failures }) => assert_eq!(failures.len(), 1),
        other => panic!("expected EmptyCorpus, got {:?}", other.map(|o| o.rankings)),
    }
}

#[test]
fn test_shared_keywords_are_reported() {
    let keywords = KeywordMatcher::default().matched_keywords(
        &Normalizer::new(),
        "Requires strong communication and leadership skills",
        "Demonstrated leadership and communication in cross-functional teams",
        15,
    );

    assert!(keywords.contains(&"leadership".to_string()));
    assert!(keywords.contains(&"communication".to_string()));
    assert!(keywords.iter().all(|k| k.chars().count() > 2));
}

#[test]
fn test_identical_resume_scores_excellent() {
    let text = "Backend engineer with Rust, Tokio and PostgreSQL experience";
    let batch = vec![RawDocument::from_text("twin.txt", text)];

    let outcome = engine().screen(text, &batch).unwrap();
    assert!((outcome.rankings[0].score - 1.0).abs() < 1e-9);
    assert_eq!(outcome.rankings[0].score_percent, "100.00%");
    assert_eq!(outcome.rankings[0].match_tier, MatchTier::Excellent);
}
