//! Upload storage
//!
//! Stored PDFs live in a flat directory. Filenames are sanitized before
//! writing and validated again on lookup so a crafted name can never escape
//! the upload directory.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flat on-disk store for uploaded PDFs
#[derive(Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create the store, making the directory if it does not exist
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save a file under its sanitized name; returns the stored name
    pub async fn save(&self, filename: &str, data: &[u8]) -> Result<String, StorageError> {
        let name = sanitize_filename(filename)
            .ok_or_else(|| StorageError::InvalidFilename(filename.to_string()))?;
        tokio::fs::write(self.dir.join(&name), data).await?;
        tracing::debug!(file = %name, bytes = data.len(), "Stored upload");
        Ok(name)
    }

    /// Resolve a stored file's path, rejecting anything that would leave
    /// the upload directory
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, StorageError> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(StorageError::InvalidFilename(filename.to_string()));
        }

        let path = self.dir.join(filename);
        if !path.is_file() {
            return Err(StorageError::NotFound(filename.to_string()));
        }
        Ok(path)
    }

    /// Read a stored file
    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(filename)?;
        Ok(tokio::fs::read(path).await?)
    }
}

/// Reduce an untrusted filename to a safe flat name.
///
/// Takes the last path component, keeps ASCII alphanumerics plus `.`, `_`
/// and `-`, collapses everything else to `_`, and strips leading dots.
/// Returns `None` when nothing usable remains.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_' || c == '.') {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_simple_names() {
        assert_eq!(sanitize_filename("paper.pdf").as_deref(), Some("paper.pdf"));
        assert_eq!(
            sanitize_filename("My Paper (v2).pdf").as_deref(),
            Some("My_Paper__v2_.pdf")
        );
    }

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(
            sanitize_filename("../../etc/passwd.pdf").as_deref(),
            Some("passwd.pdf")
        );
        assert_eq!(
            sanitize_filename("C:\\Users\\x\\doc.pdf").as_deref(),
            Some("doc.pdf")
        );
    }

    #[test]
    fn sanitize_rejects_degenerate_names() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("..."), None);
        assert_eq!(sanitize_filename("///"), None);
    }

    #[test]
    fn sanitize_strips_leading_dots() {
        assert_eq!(sanitize_filename(".hidden.pdf").as_deref(), Some("hidden.pdf"));
    }

    #[tokio::test]
    async fn save_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();

        let stored = store.save("a file.pdf", b"content").await.unwrap();
        assert_eq!(stored, "a_file.pdf");
        assert_eq!(store.read(&stored).await.unwrap(), b"content");
    }

    #[tokio::test]
    async fn resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();

        assert!(matches!(
            store.resolve("../secret.pdf"),
            Err(StorageError::InvalidFilename(_))
        ));
        assert!(matches!(
            store.resolve("a/b.pdf"),
            Err(StorageError::InvalidFilename(_))
        ));
        assert!(matches!(
            store.resolve("missing.pdf"),
            Err(StorageError::NotFound(_))
        ));
    }
}
