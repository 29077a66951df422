//! Application submission handler.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::ApplicationRecord;
use crate::state::AppState;
use crate::storage::applications::put_application;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub user_id: Option<String>,
    pub job_id: Option<String>,
    pub score: Option<f64>,
    pub status: Option<String>,
}

/// POST /applications
///
/// Creates an application record with sensible defaults and echoes it back.
pub async fn handle_create_application(
    State(state): State<AppState>,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let record = ApplicationRecord {
        user_id: request.user_id.as_deref().unwrap_or("demo").trim().to_string(),
        job_id: request
            .job_id
            .filter(|j| !j.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        score: request.score.unwrap_or(0.0),
        status: request.status.unwrap_or_else(|| "CREATED".to_string()),
        created_at: chrono::Utc::now().timestamp(),
    };

    put_application(&state.ddb, &state.config.appl_table, &record).await?;

    Ok(Json(record))
}
