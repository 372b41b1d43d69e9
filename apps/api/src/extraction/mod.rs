//! Resume text extraction: PDF text layer with an OCR fallback, plus the
//! line-budget trimmer applied before prompting.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub mod ocr;
pub mod pdf;

pub use ocr::{PageOcr, TesseractOcr};
pub use pdf::PdfTextExtractor;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse PDF: {0}")]
    Parse(String),

    #[error("{tool} not found on PATH")]
    ToolMissing { tool: String },

    #[error("{tool} failed on page {page} with exit code {code}: {stderr}")]
    ToolFailed {
        tool: String,
        page: usize,
        code: i32,
        stderr: String,
    },

    #[error("extraction task failed: {0}")]
    Task(String),

    /// Extraction stopped part-way; `partial` holds the pages read before the failure.
    #[error("{source}")]
    Incomplete {
        partial: String,
        source: Box<ExtractionError>,
    },
}

impl ExtractionError {
    /// Text recovered before the failure, empty when nothing was read.
    pub fn partial_text(&self) -> &str {
        match self {
            ExtractionError::Incomplete { partial, .. } => partial,
            _ => "",
        }
    }
}

/// Turns a document on disk into plain text.
///
/// Carried in `Screener` as `Arc<dyn TextExtractor>` so tests can swap in fakes.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// Keeps the first `max_lines` lines of the whitespace-trimmed text.
pub fn trim_cv(text: &str, max_lines: usize) -> String {
    text.trim()
        .lines()
        .take(max_lines)
        .collect::<Vec<_>>()
        .join("\n")
}
