//! Text extraction from binary documents and markup

use crate::error::{Result, ScreenerError};
use pulldown_cmark::{Event, Parser, Tag};
use std::panic::{self, AssertUnwindSafe};

/// Document parser that splits a binary container into per-page text.
pub trait PageSource {
    fn pages(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

/// PDF page source backed by `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfPageSource;

impl PageSource for PdfPageSource {
    fn pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        // pdf-extract panics on some malformed inputs
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }));

        match outcome {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(ScreenerError::PdfExtraction(e.to_string())),
            Err(_) => Err(ScreenerError::PdfExtraction(
                "PDF parser aborted on malformed input".to_string(),
            )),
        }
    }
}

/// Extract the plain text of a binary document.
///
/// Pages without text are skipped; the rest are joined with newlines and the
/// result is trimmed. No normalization happens here.
pub fn extract_text<S: PageSource + ?Sized>(source: &S, bytes: &[u8]) -> Result<String> {
    let pages = source.pages(bytes)?;

    let mut text = String::new();
    for page in pages.iter().filter(|page| !page.trim().is_empty()) {
        text.push_str(page);
        text.push('\n');
    }

    Ok(text.trim().to_string())
}

/// Render Markdown to plain text, one line per block element.
pub fn markdown_to_text(markdown: &str) -> String {
    let mut output = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => output.push_str(&text),
            Event::SoftBreak => output.push(' '),
            Event::HardBreak => output.push('\n'),
            Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(..))
            | Event::End(Tag::Item)
            | Event::End(Tag::CodeBlock(_)) => output.push('\n'),
            _ => {}
        }
    }

    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
