//! Upload route
//!
//! POST /upload - multipart form with a `file` field holding the PDF.
//! On success the file is stored, opened with MuPDF, and loaded into the
//! reading session (text extraction starts in the background). Responds
//! `{"url": "/pdf/<name>", "filename": "<name>"}`; errors come back as
//! `{"error": "<message>"}`.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tokio::time::{timeout, Duration};

use crate::pdf::{MuPdfSource, PageTextSource};
use crate::state::AppState;
use crate::storage::StorageError;

/// Timeout for opening and validating an uploaded PDF
const OPEN_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file part")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Invalid file type")]
    InvalidFileType,

    #[error("Malformed upload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Failed to open PDF: {0}")]
    Load(String),

    #[error("{0}")]
    Storage(#[from] StorageError),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            UploadError::MissingFile
            | UploadError::EmptyFilename
            | UploadError::InvalidFileType
            | UploadError::Multipart(_) => StatusCode::BAD_REQUEST,
            UploadError::Load(_) => StatusCode::UNPROCESSABLE_ENTITY,
            UploadError::Storage(StorageError::InvalidFilename(_)) => StatusCode::BAD_REQUEST,
            UploadError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
}

/// Create the upload router
pub fn router(max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(upload_file))
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

/// POST /upload
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await?.to_vec();
            file = Some((filename, data));
            break;
        }
    }

    let (filename, data) = file.ok_or(UploadError::MissingFile)?;
    if filename.is_empty() {
        return Err(UploadError::EmptyFilename);
    }
    if !is_pdf_filename(&filename) {
        return Err(UploadError::InvalidFileType);
    }

    let stored = state.store().save(&filename, &data).await?;
    let path = state.store().dir().join(&stored);

    // Opening a PDF is blocking MuPDF work; some files make it hang
    let open_path = path.clone();
    let open_result = timeout(
        Duration::from_secs(OPEN_TIMEOUT_SECS),
        tokio::task::spawn_blocking(move || MuPdfSource::open(&open_path)),
    )
    .await;

    let opened = match open_result {
        Ok(Ok(Ok(source))) => Ok(source),
        Ok(Ok(Err(e))) => Err(UploadError::Load(e.to_string())),
        Ok(Err(join_err)) => Err(UploadError::Load(format!("Task join error: {}", join_err))),
        Err(_) => Err(UploadError::Load(format!(
            "Timed out after {}s",
            OPEN_TIMEOUT_SECS
        ))),
    };

    let source = match opened {
        Ok(source) => source,
        Err(err) => {
            // A file the viewer can never open must not accumulate on disk
            if let Err(io_err) = tokio::fs::remove_file(&path).await {
                tracing::warn!(file = %stored, %io_err, "Failed to remove rejected upload");
            }
            return Err(err);
        }
    };

    tracing::info!(
        file = %stored,
        pages = source.page_count(),
        bytes = data.len(),
        "Upload accepted"
    );

    state.session().load_document(&stored, Arc::new(source)).await;

    Ok(Json(UploadResponse {
        url: format!("/pdf/{}", urlencoding::encode(&stored)),
        filename: stored,
    }))
}

/// Only `.pdf` uploads are accepted
fn is_pdf_filename(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::Value;
    use tempfile::TempDir;

    use crate::config::Config;
    use crate::notes::MockSink;
    use crate::storage::UploadStore;

    #[test]
    fn pdf_extension_check() {
        assert!(is_pdf_filename("paper.pdf"));
        assert!(is_pdf_filename("PAPER.PDF"));
        assert!(!is_pdf_filename("paper.epub"));
        assert!(!is_pdf_filename("pdf"));
        assert!(!is_pdf_filename(""));
    }

    fn test_server(dir: &TempDir) -> TestServer {
        let store = UploadStore::new(dir.path().join("uploads")).unwrap();
        let state = AppState::new(Config::default(), store, Arc::new(MockSink::new()));
        let app = axum::Router::new()
            .nest("/upload", router(1024 * 1024))
            .with_state(state);
        TestServer::new(app).unwrap()
    }

    fn stored_uploads(dir: &TempDir) -> Vec<std::path::PathBuf> {
        std::fs::read_dir(dir.path().join("uploads"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    #[tokio::test]
    async fn missing_file_part_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&dir);

        let form = MultipartForm::new().add_text("other", "value");
        let response = server.post("/upload").multipart(form).await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["error"], "No file part");
        assert!(stored_uploads(&dir).is_empty());
    }

    #[tokio::test]
    async fn empty_filename_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&dir);

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"%PDF-1.4".to_vec())
                .file_name("")
                .mime_type("application/pdf"),
        );
        let response = server.post("/upload").multipart(form).await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["error"], "No selected file");
        assert!(stored_uploads(&dir).is_empty());
    }

    #[tokio::test]
    async fn non_pdf_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&dir);

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"not a pdf".to_vec())
                .file_name("book.epub")
                .mime_type("application/epub+zip"),
        );
        let response = server.post("/upload").multipart(form).await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["error"], "Invalid file type");
        assert!(stored_uploads(&dir).is_empty());
    }

    #[tokio::test]
    async fn unreadable_pdf_is_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&dir);

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"this is not pdf data".to_vec())
                .file_name("broken.pdf")
                .mime_type("application/pdf"),
        );
        let response = server.post("/upload").multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("Failed to open PDF"));

        // The stored file is cleaned up on the failed open
        assert!(stored_uploads(&dir).is_empty());
    }
}
