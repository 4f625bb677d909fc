//! Session routes
//!
//! The explicit interface the browser UI drives instead of mutating
//! globals: snapshot, page navigation, selection, prompt generation, and
//! the session-state annotation save.

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::SessionSnapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetPageRequest {
    pub page: usize,
}

#[derive(Serialize)]
pub struct SetPageResponse {
    /// Page in effect after the request (unchanged if out of range)
    pub page: usize,
}

#[derive(Debug, Deserialize)]
pub struct SetSelectionRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct PromptResponse {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct AnnotationRequest {
    pub annotation: String,
}

#[derive(Serialize)]
pub struct AnnotationResponse {
    pub success: bool,
}

/// Create the session router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_session))
        .route("/page", put(set_page))
        .route("/selection", put(set_selection))
        .route("/prompt", post(build_prompt))
        .route("/annotation", post(save_annotation))
}

/// GET /api/v1/session
async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session().snapshot().await)
}

/// PUT /api/v1/session/page
///
/// Out-of-range pages are a silent no-op; the response carries the page
/// actually in effect.
async fn set_page(
    State(state): State<AppState>,
    Json(req): Json<SetPageRequest>,
) -> Json<SetPageResponse> {
    state.session().set_current_page(req.page).await;
    let snapshot = state.session().snapshot().await;
    Json(SetPageResponse {
        page: snapshot.current_page,
    })
}

/// PUT /api/v1/session/selection
async fn set_selection(
    State(state): State<AppState>,
    Json(req): Json<SetSelectionRequest>,
) -> Json<SessionSnapshot> {
    state.session().record_selection(&req.text).await;
    Json(state.session().snapshot().await)
}

/// POST /api/v1/session/prompt
///
/// The UI copies the returned prompt to the clipboard.
async fn build_prompt(State(state): State<AppState>) -> Json<PromptResponse> {
    Json(PromptResponse {
        prompt: state.session().build_translation_prompt().await,
    })
}

/// POST /api/v1/session/annotation
async fn save_annotation(
    State(state): State<AppState>,
    Json(req): Json<AnnotationRequest>,
) -> Result<Json<AnnotationResponse>> {
    let record = state.session().build_annotation_record(&req.annotation).await?;
    state.notes().publish(&record).await?;
    Ok(Json(AnnotationResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::config::Config;
    use crate::notes::MockSink;
    use crate::pdf::{PageTextSource, PdfError};
    use crate::storage::UploadStore;
    use async_trait::async_trait;

    struct StaticSource {
        pages: Vec<&'static str>,
    }

    #[async_trait]
    impl PageTextSource for StaticSource {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        async fn page_runs(&self, page: usize) -> std::result::Result<Vec<String>, PdfError> {
            self.pages
                .get(page - 1)
                .map(|text| vec![text.to_string()])
                .ok_or(PdfError::PageOutOfRange {
                    page,
                    page_count: self.pages.len(),
                })
        }
    }

    fn test_state(notes: Arc<MockSink>) -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads")).unwrap();
        AppState::new(Config::default(), store, notes)
    }

    fn test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .nest("/api/v1/session", router())
            .with_state(state);
        TestServer::new(app).unwrap()
    }

    async fn load_pages(state: &AppState, pages: Vec<&'static str>) {
        state
            .session()
            .load_document("paper.pdf", Arc::new(StaticSource { pages }))
            .await;
        for _ in 0..100 {
            let snap = state.session().snapshot().await;
            if snap.extracted_pages == snap.page_count {
                return;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
        }
        panic!("extraction did not finish");
    }

    #[tokio::test]
    async fn snapshot_starts_uninitialized() {
        let state = test_state(Arc::new(MockSink::new()));
        let server = test_server(state);

        let response = server.get("/api/v1/session").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["documentName"], Value::Null);
        assert_eq!(body["pageCount"], 0);
        assert_eq!(body["currentPage"], 0);
        assert_eq!(body["generation"], 0);
    }

    #[tokio::test]
    async fn page_selection_and_prompt_flow() {
        let state = test_state(Arc::new(MockSink::new()));
        load_pages(&state, vec!["A", "B", "C", "D", "E"]).await;
        let server = test_server(state);

        let response = server.put("/api/v1/session/page").json(&json!({"page": 3})).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["page"], 3);

        // Out of range leaves the page where it was
        let response = server.put("/api/v1/session/page").json(&json!({"page": 9})).await;
        assert_eq!(response.json::<Value>()["page"], 3);

        server
            .put("/api/v1/session/selection")
            .json(&json!({"text": "foo"}))
            .await
            .assert_status_ok();

        let response = server.post("/api/v1/session/prompt").await;
        response.assert_status_ok();
        let prompt = response.json::<Value>()["prompt"].as_str().unwrap().to_string();
        assert!(prompt.contains("[Page 2]\nB"));
        assert!(prompt.contains("[Page 3]\nC"));
        assert!(prompt.contains("[Page 4]\nD"));
        assert!(!prompt.contains("[Page 1]"));
        assert!(prompt.contains("=== TEXT TO TRANSLATE ===\nfoo"));
    }

    #[tokio::test]
    async fn annotation_uses_session_state() {
        let sink = Arc::new(MockSink::new());
        let state = test_state(Arc::clone(&sink));
        load_pages(&state, vec!["A", "B"]).await;
        state.session().set_current_page(2).await;
        state.session().record_selection("selected words").await;
        let server = test_server(state);

        let response = server
            .post("/api/v1/session/annotation")
            .json(&json!({"annotation": "my note"}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["success"], true);

        let published = sink.published.lock().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].document_name, "paper.pdf");
        assert_eq!(published[0].page_number, 2);
        assert_eq!(published[0].selected_text, "selected words");
        assert_eq!(published[0].annotation_text, "my note");
    }

    #[tokio::test]
    async fn empty_annotation_is_rejected() {
        let sink = Arc::new(MockSink::new());
        let state = test_state(Arc::clone(&sink));
        load_pages(&state, vec!["A"]).await;
        let server = test_server(state);

        let response = server
            .post("/api/v1/session/annotation")
            .json(&json!({"annotation": "   "}))
            .await;
        response.assert_status_bad_request();
        assert!(sink.published.lock().await.is_empty());
    }

    #[tokio::test]
    async fn sink_failure_surfaces_as_error() {
        let state = test_state(Arc::new(MockSink::failing()));
        load_pages(&state, vec!["A"]).await;
        let server = test_server(state);

        let response = server
            .post("/api/v1/session/annotation")
            .json(&json!({"annotation": "note"}))
            .await;
        response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    }
}
