//! MuPDF-backed page text source
//!
//! MuPDF documents are not thread-safe. This source stores the file path,
//! opens a fresh document for each operation, and serializes access through
//! a `parking_lot::Mutex`, so no long-lived `Document` reference ever crosses
//! a thread boundary. Extraction is CPU-bound and runs on the blocking pool
//! with a per-page timeout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use mupdf::{Document, TextPageOptions};
use parking_lot::Mutex;
use tokio::time::{timeout, Duration};

use super::{PageTextSource, PdfError};

/// Timeout for extracting a single page's text.
/// Some PDFs make MuPDF hang; the blocking thread may keep running, but the
/// caller gets an answer and treats the page as absent.
const EXTRACT_TIMEOUT_SECS: u64 = 15;

/// A PDF file opened for text extraction
pub struct MuPdfSource {
    path: PathBuf,
    page_count: usize,
    lock: Arc<Mutex<()>>,
}

impl MuPdfSource {
    /// Open a PDF and validate it by reading its page count
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PdfError> {
        let path = path.as_ref().to_path_buf();
        let path_str = path.to_string_lossy();

        let doc = Document::open(&*path_str).map_err(|e| PdfError::Load(e.to_string()))?;
        let page_count = doc
            .page_count()
            .map_err(|e| PdfError::Load(e.to_string()))? as usize;

        Ok(Self {
            path,
            page_count,
            lock: Arc::new(Mutex::new(())),
        })
    }

    /// Blocking extraction of one page's text runs (MuPDF call, serialized)
    fn extract_runs(path: &Path, lock: &Mutex<()>, page: usize) -> Result<Vec<String>, PdfError> {
        let _guard = lock.lock();

        let path_str = path.to_string_lossy();
        let doc = Document::open(&*path_str).map_err(|e| PdfError::Load(e.to_string()))?;

        let mupdf_page = doc.load_page(page as i32 - 1).map_err(|e| PdfError::Extract {
            page,
            message: e.to_string(),
        })?;
        let text_page = mupdf_page
            .to_text_page(TextPageOptions::empty())
            .map_err(|e| PdfError::Extract {
                page,
                message: e.to_string(),
            })?;

        // One run per structured-text line, in document order
        let mut runs = Vec::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let mut text = String::new();
                for ch in line.chars() {
                    if let Some(c) = ch.char() {
                        text.push(c);
                    }
                }
                let text = text.trim().to_string();
                if !text.is_empty() {
                    runs.push(text);
                }
            }
        }

        Ok(runs)
    }
}

#[async_trait]
impl PageTextSource for MuPdfSource {
    fn page_count(&self) -> usize {
        self.page_count
    }

    async fn page_runs(&self, page: usize) -> Result<Vec<String>, PdfError> {
        if page == 0 || page > self.page_count {
            return Err(PdfError::PageOutOfRange {
                page,
                page_count: self.page_count,
            });
        }

        let path = self.path.clone();
        let lock = Arc::clone(&self.lock);

        let result = timeout(
            Duration::from_secs(EXTRACT_TIMEOUT_SECS),
            tokio::task::spawn_blocking(move || Self::extract_runs(&path, &lock, page)),
        )
        .await;

        match result {
            Ok(join_result) => join_result.map_err(|e| PdfError::Extract {
                page,
                message: format!("Task join error: {}", e),
            })?,
            Err(_) => Err(PdfError::Timeout(EXTRACT_TIMEOUT_SECS)),
        }
    }
}
