//! File serving routes
//!
//! Serves stored PDFs back to the browser viewer.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the files router
pub fn router() -> Router<AppState> {
    Router::new().route("/:filename", get(serve_pdf))
}

/// GET /pdf/:filename
async fn serve_pdf(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let bytes = state.store().read(&filename).await?;
    let len = bytes.len();

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, len)
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", filename),
        )
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.to_string()))?)
}
