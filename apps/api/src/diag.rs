//! Diagnostic connectivity probe for the generation backend.
//!
//! Two steps, both always reported: raw TCP reachability of the API host
//! (with round-trip time) and an authenticated HTTPS request to the
//! models listing. 200 when every step passes, 500 otherwise.

use std::time::{Duration, Instant};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tokio::net::TcpStream;

use crate::state::AppState;

const API_HOST: &str = "api.openai.com";
const MODELS_URL: &str = "https://api.openai.com/v1/models";
const TCP_TIMEOUT: Duration = Duration::from_secs(5);
const MODELS_TIMEOUT: Duration = Duration::from_secs(6);

/// GET /diag
pub async fn handle_diag(State(state): State<AppState>) -> impl IntoResponse {
    let mut ok = true;
    let mut steps = Vec::new();

    let started = Instant::now();
    match tokio::time::timeout(TCP_TIMEOUT, TcpStream::connect((API_HOST, 443))).await {
        Ok(Ok(_stream)) => {
            steps.push(json!({
                "tcp": "ok",
                "rtt_ms": started.elapsed().as_millis() as u64,
            }));
        }
        Ok(Err(e)) => {
            ok = false;
            steps.push(json!({ "tcp": format!("error: {e}") }));
        }
        Err(_) => {
            ok = false;
            steps.push(json!({ "tcp": format!("error: connect timed out after {TCP_TIMEOUT:?}") }));
        }
    }

    let api_key = state.config.openai_api_key.clone().unwrap_or_default();
    match state
        .http
        .get(MODELS_URL)
        .bearer_auth(api_key)
        .timeout(MODELS_TIMEOUT)
        .send()
        .await
    {
        Ok(response) => {
            steps.push(json!({ "models_http_status": response.status().as_u16() }));
        }
        Err(e) => {
            ok = false;
            steps.push(json!({ "models_error": e.to_string() }));
        }
    }

    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(json!({ "ok": ok, "steps": steps })))
}
