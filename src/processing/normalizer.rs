//! Text cleaning and normalization

use crate::config::ProcessingConfig;
use crate::error::{Result, ScreenerError};
use crate::processing::lemmatizer::Lemmatizer;
use crate::processing::stopwords::StopWords;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Which pipeline produced a normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizationMode {
    /// Boilerplate removal, tokenization, stopword filtering and lemmatization.
    Full,
    /// Letters-only lowercase text. Used when the lemmatizer is unavailable.
    Degraded,
}

impl std::fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizationMode::Full => write!(f, "full"),
            NormalizationMode::Degraded => write!(f, "degraded"),
        }
    }
}

pub struct Normalizer {
    stop_words: StopWords,
    lemmatizer: Option<Lemmatizer>,
    page_marker_regex: Regex,
    continued_regex: Regex,
    whitespace_regex: Regex,
    non_letter_regex: Regex,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::build(Some(Lemmatizer::new()))
    }

    /// Normalizer that always takes the letters-only fallback path.
    pub fn degraded() -> Self {
        Self::build(None)
    }

    pub fn with_lemmatizer(lemmatizer: Lemmatizer) -> Self {
        Self::build(Some(lemmatizer))
    }

    /// Build from configuration. A lemma exception file that cannot be loaded
    /// leaves the normalizer in degraded mode instead of failing.
    pub fn from_config(config: &ProcessingConfig) -> Self {
        match &config.lemma_exceptions {
            None => Self::new(),
            Some(path) => match Lemmatizer::with_exceptions_file(path) {
                Ok(lemmatizer) => Self::with_lemmatizer(lemmatizer),
                Err(e) => {
                    warn!("Lemmatizer unavailable, using fallback normalization: {}", e);
                    Self::degraded()
                }
            },
        }
    }

    fn build(lemmatizer: Option<Lemmatizer>) -> Self {
        let page_marker_regex = Regex::new(r"(?i)(page\s+\d+\s+of\s+\d+|page\s+\d+)")
            .expect("Invalid page marker regex");

        let continued_regex = Regex::new(r"(?i)\n\s*continued\s*\n")
            .expect("Invalid continuation regex");

        let whitespace_regex = Regex::new(r"\s{2,}")
            .expect("Invalid whitespace regex");

        let non_letter_regex = Regex::new(r"[^a-zA-Z\s]")
            .expect("Invalid letter filter regex");

        Self {
            stop_words: StopWords::english(),
            lemmatizer,
            page_marker_regex,
            continued_regex,
            whitespace_regex,
            non_letter_regex,
        }
    }

    pub fn mode(&self) -> NormalizationMode {
        if self.lemmatizer.is_some() {
            NormalizationMode::Full
        } else {
            NormalizationMode::Degraded
        }
    }

    /// Normalize with the full pipeline, or fail if it is unavailable.
    pub fn try_normalize(&self, text: &str) -> Result<String> {
        let lemmatizer = self.lemmatizer.as_ref().ok_or_else(|| {
            ScreenerError::Normalization("lemmatizer backend is not available".to_string())
        })?;

        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let cleaned = self.strip_boilerplate(text).to_lowercase();

        let tokens: Vec<String> = cleaned
            .unicode_words()
            .filter(|token| token.chars().all(char::is_alphanumeric))
            .filter(|token| !self.stop_words.contains(token))
            .map(|token| lemmatizer.lemmatize(token))
            .filter(|lemma| !self.stop_words.contains(lemma))
            .collect();

        Ok(self.drop_page_markers(tokens).join(" "))
    }

    /// Drop tokens that would read as a page marker together with the number
    /// after them. Punctuated markers such as `page-2` and inflected ones such
    /// as `pages 12` only become `page N` after tokenizing and lemmatizing, so
    /// this runs on the final tokens and keeps the output stable when normalized
    /// again.
    fn drop_page_markers(&self, tokens: Vec<String>) -> Vec<String> {
        let mut kept: Vec<String> = Vec::with_capacity(tokens.len());
        for token in tokens {
            while kept
                .last()
                .is_some_and(|previous| self.page_marker_regex.is_match(&format!("{} {}", previous, token)))
            {
                kept.pop();
            }
            kept.push(token);
        }
        kept
    }

    /// Normalize text, falling back to the letters-only pipeline when the
    /// full one fails. Never panics; empty input gives an empty string.
    pub fn normalize(&self, text: &str) -> String {
        match self.try_normalize(text) {
            Ok(normalized) => normalized,
            Err(e) => {
                debug!("Falling back to letters-only normalization: {}", e);
                self.fallback_normalize(text)
            }
        }
    }

    /// Drop everything except ASCII letters and whitespace, lowercase and
    /// collapse whitespace. Stopwords are kept.
    pub fn fallback_normalize(&self, text: &str) -> String {
        let letters = self.non_letter_regex.replace_all(text, "").to_lowercase();
        letters.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Remove page markers and continuation lines, then collapse runs of whitespace.
    pub fn strip_boilerplate(&self, text: &str) -> String {
        let without_pages = self.page_marker_regex.replace_all(text, "");
        let without_continued = self.continued_regex.replace_all(&without_pages, "\n");
        self.whitespace_regex
            .replace_all(&without_continued, " ")
            .trim()
            .to_string()
    }

    pub fn tokens(&self, text: &str) -> Vec<String> {
        self.normalize(text)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pipeline() {
        let normalizer = Normalizer::new();
        let text = "Experienced Python developer skilled in SQL databases";
        assert_eq!(
            normalizer.normalize(text),
            "experience python developer skill sql database"
        );
        assert_eq!(normalizer.mode(), NormalizationMode::Full);
    }

    #[test]
    fn test_page_markers_and_continuations_removed() {
        let normalizer = Normalizer::new();
        let text = "Rust engineer\nPage 1 of 2\ncontinued\nKafka   pipelines page 7";
        assert_eq!(
            normalizer.strip_boilerplate(text),
            "Rust engineer\nKafka pipelines"
        );
        assert_eq!(normalizer.normalize(text), "rust engineer kafka pipeline");
    }

    #[test]
    fn test_punctuation_and_stopwords_dropped() {
        let normalizer = Normalizer::new();
        assert_eq!(
            normalizer.normalize("The team, and the leadership: all of it!"),
            "team leadership"
        );
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("   \n\t "), "");
        assert_eq!(Normalizer::degraded().normalize(""), "");
    }

    #[test]
    fn test_degraded_mode_uses_fallback() {
        let normalizer = Normalizer::degraded();
        assert_eq!(normalizer.mode(), NormalizationMode::Degraded);
        assert!(normalizer.try_normalize("Rust").is_err());
        assert_eq!(
            normalizer.normalize("C++ & Rust,  5 years!"),
            "c rust years"
        );
    }

    #[test]
    fn test_unloadable_exceptions_degrade() {
        let mut config = crate::config::Config::default().processing;
        config.lemma_exceptions = Some("/nonexistent/lemmas.toml".into());
        assert_eq!(Normalizer::from_config(&config).mode(), NormalizationMode::Degraded);
    }

    #[test]
    fn test_tool_names_keep_their_trailing_s() {
        let normalizer = Normalizer::new();
        assert_eq!(
            normalizer.normalize("PostgreSQL Postgres Jenkins DevOps pandas"),
            "postgresql postgres jenkins devops pandas"
        );
    }

    #[test]
    fn test_punctuated_and_inflected_page_markers_dropped() {
        let normalizer = Normalizer::new();
        for text in [
            "See page-2 for details",
            "Page: 3 of the report",
            "Managed 5 pages 12 times",
            "page page 4 homepage 9",
        ] {
            let once = normalizer.normalize(text);
            assert!(!normalizer.page_marker_regex.is_match(&once), "{:?} -> {:?}", text, once);
            assert_eq!(normalizer.normalize(&once), once);
        }
        assert_eq!(normalizer.normalize("Managed 5 pages 12 times"), "manage 5 12 time");
        assert_eq!(normalizer.normalize("page views"), "page view");
    }

    #[test]
    fn test_normalization_is_stable_on_its_output() {
        let normalizer = Normalizer::new();
        let once = normalizer.normalize("Managed teams building distributed services and databases");
        assert_eq!(normalizer.normalize(&once), once);
    }
}
