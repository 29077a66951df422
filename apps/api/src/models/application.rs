use serde::{Deserialize, Serialize};

/// A job application record. Created on submission; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub user_id: String,
    pub job_id: String,
    pub score: f64,
    pub status: String,
    pub created_at: i64,
}
