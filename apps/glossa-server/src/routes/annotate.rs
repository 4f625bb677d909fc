//! Annotation route
//!
//! POST /annotate - the legacy payload-carrying endpoint: the client sends
//! the full annotation context and the server forwards it to the note sink.
//! Responds `{"success": true}` or `{"success": false, "error": "..."}`.
//! The session-state variant lives under /api/v1/session/annotation.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::session::AnnotationRecord;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateRequest {
    #[serde(default = "default_pdf_name")]
    pub pdf_name: String,
    #[serde(default)]
    pub page_num: usize,
    #[serde(default)]
    pub selected_text: String,
    #[serde(default)]
    pub annotation: String,
}

fn default_pdf_name() -> String {
    "Unknown PDF".to_string()
}

#[derive(Serialize)]
pub struct AnnotateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Create the annotate router
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(save_annotation))
}

/// POST /annotate
async fn save_annotation(
    State(state): State<AppState>,
    Json(req): Json<AnnotateRequest>,
) -> (StatusCode, Json<AnnotateResponse>) {
    let annotation = req.annotation.trim();
    if annotation.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Annotation text is empty");
    }

    let record = AnnotationRecord {
        document_name: req.pdf_name,
        page_number: req.page_num,
        selected_text: req.selected_text,
        annotation_text: annotation.to_string(),
    };

    match state.notes().publish(&record).await {
        Ok(()) => (
            StatusCode::OK,
            Json(AnnotateResponse {
                success: true,
                error: None,
            }),
        ),
        Err(err) => {
            tracing::error!(%err, "Failed to save annotation");
            failure(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<AnnotateResponse>) {
    (
        status,
        Json(AnnotateResponse {
            success: false,
            error: Some(message.to_string()),
        }),
    )
}
