//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::notes::NoteSink;
use crate::session::ReadingSession;
use crate::storage::UploadStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pub config: Config,
    pub store: UploadStore,
    pub session: ReadingSession,
    pub notes: Arc<dyn NoteSink>,
}

impl AppState {
    pub fn new(config: Config, store: UploadStore, notes: Arc<dyn NoteSink>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                session: ReadingSession::new(),
                notes,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the upload store
    pub fn store(&self) -> &UploadStore {
        &self.inner.store
    }

    /// Get the reading session
    pub fn session(&self) -> &ReadingSession {
        &self.inner.session
    }

    /// Get the note sink
    pub fn notes(&self) -> &Arc<dyn NoteSink> {
        &self.inner.notes
    }
}
