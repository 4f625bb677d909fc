//! Reading session
//!
//! Owns the per-document state: the page-text cache, the current page, and
//! the active selection. The HTTP layer drives it; it knows nothing about
//! rendering or transport.
//!
//! Lifecycle is linear: uninitialized -> loaded -> (page-navigated |
//! selection-changed)* -> loaded again. Every `load_document` resets the
//! state in full and bumps the load generation; extraction results tagged
//! with a stale generation are dropped instead of being written into a cache
//! that has since been reset.

pub mod prompt;

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::pdf::PageTextSource;

/// How many pages are extracted at once per load
const EXTRACT_CONCURRENCY: usize = 4;

/// Session-level errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Annotation text is empty")]
    EmptyAnnotation,

    #[error("No document loaded")]
    NoDocument,
}

/// Immutable annotation payload handed to the note sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub document_name: String,
    pub page_number: usize,
    pub selected_text: String,
    pub annotation_text: String,
}

/// Read-only view of the session for the UI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub document_name: Option<String>,
    pub page_count: usize,
    pub current_page: usize,
    pub selection: String,
    pub extracted_pages: usize,
    pub generation: u64,
}

#[derive(Default)]
struct SessionInner {
    document_name: Option<String>,
    page_count: usize,
    current_page: usize,
    selection: String,
    generation: u64,
    page_texts: HashMap<usize, String>,
}

/// Shared reading session
///
/// Cheap to clone; all clones see the same state. Handlers race only
/// through this API, so the interior `RwLock` is the only synchronization.
#[derive(Clone, Default)]
pub struct ReadingSession {
    inner: Arc<RwLock<SessionInner>>,
}

impl ReadingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a new document and schedule text extraction for all its pages.
    ///
    /// Resets the session (page 1, empty selection, empty cache) and bumps
    /// the load generation. Extraction runs in the background in ascending
    /// page order with bounded concurrency; completions may land out of
    /// order and the cache tolerates that. A page that fails to extract is
    /// logged and left absent.
    pub async fn load_document(&self, name: &str, source: Arc<dyn PageTextSource>) {
        let generation = {
            let mut inner = self.inner.write().await;
            inner.generation += 1;
            inner.document_name = Some(name.to_string());
            inner.page_count = source.page_count();
            inner.current_page = 1;
            inner.selection.clear();
            inner.page_texts.clear();
            inner.generation
        };

        tracing::info!(
            document = name,
            pages = source.page_count(),
            generation,
            "Document loaded, starting text extraction"
        );

        let session = self.clone();
        tokio::spawn(async move {
            session.extract_all(source, generation).await;
        });
    }

    async fn extract_all(&self, source: Arc<dyn PageTextSource>, generation: u64) {
        let page_count = source.page_count();

        futures::stream::iter(1..=page_count)
            .for_each_concurrent(EXTRACT_CONCURRENCY, |page| {
                let source = Arc::clone(&source);
                let session = self.clone();
                async move {
                    match source.page_runs(page).await {
                        Ok(runs) => {
                            session
                                .store_page_text(generation, page, runs.join(" "))
                                .await;
                        }
                        Err(err) => {
                            tracing::warn!(page, generation, %err, "Page text extraction failed");
                        }
                    }
                }
            })
            .await;

        tracing::debug!(generation, pages = page_count, "Text extraction finished");
    }

    /// Write one page's text, unless the session has moved on to a newer
    /// load. Returns whether the write was accepted.
    pub(crate) async fn store_page_text(
        &self,
        generation: u64,
        page: usize,
        text: String,
    ) -> bool {
        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            tracing::debug!(
                page,
                stale = generation,
                current = inner.generation,
                "Discarding stale extraction result"
            );
            return false;
        }
        inner.page_texts.insert(page, text);
        true
    }

    /// Move to page `n`. Out-of-range values (including anything while no
    /// document is loaded) are a silent no-op.
    pub async fn set_current_page(&self, n: usize) {
        let mut inner = self.inner.write().await;
        if n >= 1 && n <= inner.page_count {
            inner.current_page = n;
        }
    }

    /// Record the active selection verbatim (the caller trims). Empty means
    /// "no selection". No-op while no document is loaded.
    pub async fn record_selection(&self, text: &str) {
        let mut inner = self.inner.write().await;
        if inner.document_name.is_some() {
            inner.selection = text.to_string();
        }
    }

    /// Assemble the translation prompt from the current state.
    pub async fn build_translation_prompt(&self) -> String {
        let inner = self.inner.read().await;
        prompt::build_prompt(&inner.selection, inner.current_page, &inner.page_texts)
    }

    /// Build an annotation record from the current state.
    pub async fn build_annotation_record(
        &self,
        annotation_text: &str,
    ) -> Result<AnnotationRecord, SessionError> {
        let annotation = annotation_text.trim();
        if annotation.is_empty() {
            return Err(SessionError::EmptyAnnotation);
        }

        let inner = self.inner.read().await;
        let document_name = inner
            .document_name
            .clone()
            .ok_or(SessionError::NoDocument)?;

        Ok(AnnotationRecord {
            document_name,
            page_number: inner.current_page,
            selected_text: inner.selection.clone(),
            annotation_text: annotation.to_string(),
        })
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.read().await;
        SessionSnapshot {
            document_name: inner.document_name.clone(),
            page_count: inner.page_count,
            current_page: inner.current_page,
            selection: inner.selection.clone(),
            extracted_pages: inner.page_texts.len(),
            generation: inner.generation,
        }
    }
}
