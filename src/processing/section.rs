//! Skills section extraction

use crate::error::{Result, ScreenerError};
use crate::processing::normalizer::Normalizer;
use regex::Regex;

/// Finds the body of a labelled section such as `Skills: ...`.
///
/// A section starts at the first `label:` occurrence (labels are matched
/// case-insensitively) and ends at the first blank line, the first line
/// starting with an uppercase ASCII letter, or the end of the text.
#[derive(Debug, Clone)]
pub struct SectionExtractor {
    pattern: Regex,
}

impl Default for SectionExtractor {
    fn default() -> Self {
        let labels = crate::config::Config::default().processing.section_labels;
        Self::new(&labels).expect("Invalid default section labels")
    }
}

impl SectionExtractor {
    pub fn new(labels: &[String]) -> Result<Self> {
        let alternatives: Vec<String> = labels
            .iter()
            .map(|label| label.trim())
            .filter(|label| !label.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Err(ScreenerError::Configuration(
                "at least one section label is required".to_string(),
            ));
        }

        let pattern = format!(
            r"(?s)(?i:{}):(.+?)(?:\n\n|\n[A-Z]|\z)",
            alternatives.join("|")
        );
        let pattern = Regex::new(&pattern)
            .map_err(|e| ScreenerError::Configuration(format!("Invalid section labels: {}", e)))?;

        Ok(Self { pattern })
    }

    /// Trimmed body of the first labelled section, before normalization.
    pub fn raw_section<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|body| body.as_str().trim())
    }

    /// Normalized body of the first labelled section, or an empty string.
    pub fn extract(&self, text: &str, normalizer: &Normalizer) -> String {
        match self.raw_section(text) {
            Some(body) => normalizer.normalize(body),
            None => String::new(),
        }
    }
}
