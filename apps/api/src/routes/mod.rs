pub mod health;

use axum::{
    http::{Method, StatusCode, Uri},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::state::AppState;
use crate::{applications, diag, documents, scoring, tailor};

async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "path": uri.path(),
            "method": method.as_str(),
        })),
    )
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/diag", get(diag::handle_diag))
        // Skill-overlap scoring (legacy alias kept for older clients)
        .route("/score", post(scoring::handle_score))
        .route("/match/score", post(scoring::handle_score))
        // Documents
        .route(
            "/upload/resume",
            post(documents::handlers::handle_upload_resume),
        )
        .route(
            "/documents",
            get(documents::handlers::handle_list_documents),
        )
        .route(
            "/documents/delete",
            post(documents::handlers::handle_delete_document)
                .delete(documents::handlers::handle_delete_document),
        )
        .route(
            "/documents/html",
            get(documents::handlers::handle_get_document_html),
        )
        // Applications
        .route(
            "/applications",
            post(applications::handle_create_application),
        )
        // Tailoring
        .route("/tailor", post(tailor::handlers::handle_tailor))
        .fallback(not_found)
        .with_state(state)
}
