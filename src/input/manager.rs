//! Input manager for turning files on disk into raw documents

use crate::error::{DocumentFailure, FailureKind, Result, ScreenerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::markdown_to_text;
use crate::processing::document::{DocumentContent, RawDocument};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct InputManager {
    cache: HashMap<PathBuf, RawDocument>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Read one file. PDF bytes are kept for the extractor; text and
    /// Markdown are decoded here.
    pub async fn load(&mut self, path: &Path) -> Result<RawDocument> {
        if self.enable_cache {
            if let Some(cached) = self.cache.get(path) {
                debug!("Using cached document for: {}", path.display());
                return Ok(cached.clone());
            }
        }

        if !path.exists() {
            return Err(ScreenerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let id = Self::document_id(path);
        let content = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Reading PDF: {}", path.display());
                DocumentContent::Binary(fs::read(path).await?)
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                let bytes = fs::read(path).await?;
                DocumentContent::Text(String::from_utf8_lossy(&bytes).into_owned())
            }
            FileType::Markdown => {
                info!("Reading markdown file: {}", path.display());
                let bytes = fs::read(path).await?;
                DocumentContent::Text(markdown_to_text(&String::from_utf8_lossy(&bytes)))
            }
            FileType::Unknown => {
                return Err(ScreenerError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}",
                    path.display()
                )));
            }
        };

        let document = RawDocument::new(id, content);
        if self.enable_cache {
            self.cache.insert(path.to_path_buf(), document.clone());
        }

        Ok(document)
    }

    /// Read every path independently. Unreadable files become failures and
    /// do not stop the rest of the batch.
    pub async fn load_batch(&mut self, paths: &[PathBuf]) -> (Vec<RawDocument>, Vec<DocumentFailure>) {
        let mut documents = Vec::with_capacity(paths.len());
        let mut failures = Vec::new();

        for path in paths {
            match self.load(path).await {
                Ok(document) => documents.push(document),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    failures.push(DocumentFailure::new(
                        Self::document_id(path),
                        FailureKind::Read,
                        e.to_string(),
                    ));
                }
            }
        }

        (documents, failures)
    }

    fn document_id(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
