//! Note-taking sink
//!
//! The session's contract with persistence ends at handing an
//! `AnnotationRecord` to a `NoteSink`. The production sink talks to the
//! Notion REST API; tests swap in a recording mock.

mod notion;

pub use notion::NotionSink;

use async_trait::async_trait;
use thiserror::Error;

use crate::session::AnnotationRecord;

/// Errors from the note collaborator
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Notion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notion returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Notion is not configured (set NOTION_API_KEY and NOTION_PAGE_ID)")]
    NotConfigured,
}

/// Destination for saved annotations
#[async_trait]
pub trait NoteSink: Send + Sync {
    /// Persist one annotation. The record is not retained locally either way.
    async fn publish(&self, record: &AnnotationRecord) -> Result<(), NoteError>;
}

/// Recording sink for tests
#[cfg(test)]
pub struct MockSink {
    pub published: tokio::sync::Mutex<Vec<AnnotationRecord>>,
    pub fail: bool,
}

#[cfg(test)]
impl MockSink {
    pub fn new() -> Self {
        Self {
            published: tokio::sync::Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            published: tokio::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl NoteSink for MockSink {
    async fn publish(&self, record: &AnnotationRecord) -> Result<(), NoteError> {
        if self.fail {
            return Err(NoteError::Api {
                status: 400,
                body: "mock failure".into(),
            });
        }
        self.published.lock().await.push(record.clone());
        Ok(())
    }
}
