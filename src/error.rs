//! Error handling for the resume screener

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Normalization error: {0}")]
    Normalization(String),

    #[error("Empty job description: {0}")]
    EmptyQuery(String),

    #[error("No usable resumes: {} document(s) failed", failures.len())]
    EmptyCorpus { failures: Vec<DocumentFailure> },

    #[error("Vectorization failed: {0}")]
    Vectorization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ScreenerError>;

/// Why a single document was left out of a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The file could not be read or has an unsupported type.
    Read,
    /// The document container could not be parsed.
    Extraction,
    /// Nothing indexable was left after extraction and normalization.
    EmptyText,
}

/// Per-document failure report. Never fatal to the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub document_id: String,
    pub kind: FailureKind,
    pub message: String,
}

impl DocumentFailure {
    pub fn new(document_id: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Read => write!(f, "read"),
            FailureKind::Extraction => write!(f, "extraction"),
            FailureKind::EmptyText => write!(f, "empty text"),
        }
    }
}

impl std::fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.document_id, self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_corpus_message_counts_failures() {
        let err = ScreenerError::EmptyCorpus {
            failures: vec![
                DocumentFailure::new("a.pdf", FailureKind::Extraction, "bad xref"),
                DocumentFailure::new("b.pdf", FailureKind::EmptyText, "no text"),
            ],
        };
        assert_eq!(err.to_string(), "No usable resumes: 2 document(s) failed");
    }

    #[test]
    fn test_failure_display() {
        let failure = DocumentFailure::new("cv.pdf", FailureKind::Extraction, "corrupt");
        assert_eq!(failure.to_string(), "cv.pdf (extraction): corrupt");
    }
}
