//! Document structures shared by the screening pipeline

use crate::processing::normalizer::Normalizer;
use crate::processing::section::SectionExtractor;
use serde::{Deserialize, Serialize};

/// Content of a document as it arrived, before extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentContent {
    /// Container bytes (PDF) that still need text extraction
    Binary(Vec<u8>),
    /// Already-decoded text
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub id: String,
    pub content: DocumentContent,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, content: DocumentContent) -> Self {
        Self {
            id: id.into(),
            content,
        }
    }

    pub fn from_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, DocumentContent::Text(text.into()))
    }

    pub fn from_bytes(id: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(id, DocumentContent::Binary(bytes))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentRole {
    /// The job description every candidate is compared against
    Query,
    /// A resume being ranked
    Candidate,
}

/// A document after extraction and normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub role: DocumentRole,
    pub raw_text: String,
    pub normalized_text: String,
    /// Normalized skills section, empty when none was found
    pub skills_section: String,
    pub word_count: usize,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        role: DocumentRole,
        raw_text: String,
        normalizer: &Normalizer,
        sections: &SectionExtractor,
    ) -> Self {
        let normalized_text = normalizer.normalize(&raw_text);
        let skills_section = sections.extract(&raw_text, normalizer);
        let word_count = raw_text.split_whitespace().count();

        Self {
            id: id.into(),
            role,
            raw_text,
            normalized_text,
            skills_section,
            word_count,
        }
    }

    /// Whether normalization left any terms to index.
    pub fn is_indexable(&self) -> bool {
        !self.normalized_text.trim().is_empty()
    }

    pub fn has_skills_section(&self) -> bool {
        !self.skills_section.is_empty()
    }

    pub fn term_count(&self) -> usize {
        self.normalized_text.split_whitespace().count()
    }
}

/// Ordered collection of candidate documents. Positions are stable and are
/// what similarity results refer to.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn normalized_texts(&self) -> Vec<&str> {
        self.documents
            .iter()
            .map(|document| document.normalized_text.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_normalizes_on_creation() {
        let normalizer = Normalizer::new();
        let sections = SectionExtractor::default();
        let document = Document::new(
            "alice.txt",
            DocumentRole::Candidate,
            "Backend engineer\nSkills: Rust, PostgreSQL\nEducation: BSc".to_string(),
            &normalizer,
            &sections,
        );

        assert_eq!(document.normalized_text, "backend engineer skill rust postgresql education bsc");
        assert_eq!(document.skills_section, "rust postgresql");
        assert_eq!(document.word_count, 7);
        assert!(document.is_indexable());
        assert!(document.has_skills_section());
    }

    #[test]
    fn test_stopword_only_document_is_not_indexable() {
        let document = Document::new(
            "empty.txt",
            DocumentRole::Candidate,
            "and the of".to_string(),
            &Normalizer::new(),
            &SectionExtractor::default(),
        );
        assert!(!document.is_indexable());
        assert_eq!(document.term_count(), 0);
    }

    #[test]
    fn test_corpus_keeps_insertion_order() {
        let normalizer = Normalizer::new();
        let sections = SectionExtractor::default();
        let mut corpus = Corpus::new();
        for (id, text) in [("a", "rust"), ("b", "python")] {
            corpus.push(Document::new(id, DocumentRole::Candidate, text.to_string(), &normalizer, &sections));
        }

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get(1).map(|d| d.id.as_str()), Some("b"));
        assert_eq!(corpus.normalized_texts(), vec!["rust", "python"]);
    }
}
