//! PDF text extraction
//!
//! The session only needs two things from a document: how many pages it has
//! and the ordered text runs of each page. `PageTextSource` is that contract;
//! `MuPdfSource` is the MuPDF-backed implementation used in production.
//! Rendering and text positioning stay in the browser (PDF.js).

mod source;

pub use source::MuPdfSource;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the PDF collaborator
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open document: {0}")]
    Load(String),

    #[error("Failed to extract text from page {page}: {message}")]
    Extract { page: usize, message: String },

    #[error("Text extraction timed out after {0}s")]
    Timeout(u64),

    #[error("Page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },
}

/// Per-page text supplier for a loaded document
///
/// Pages are 1-based. `page_runs` returns the ordered text runs of a page;
/// the session joins them with single spaces to form the cached page text.
#[async_trait]
pub trait PageTextSource: Send + Sync {
    /// Number of pages in the document
    fn page_count(&self) -> usize;

    /// Extract the ordered text runs of a 1-based page
    async fn page_runs(&self, page: usize) -> Result<Vec<String>, PdfError>;
}
