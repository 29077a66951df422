use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": "resume-assistant",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
