//! Skill-overlap scoring — pure, deterministic, no LLM call.

use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    #[serde(default)]
    pub resume_skills: Vec<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub score: f64,
    pub coverage: f64,
}

/// Fraction of required skills covered by the resume's skills,
/// case-insensitive. An empty requirement list scores zero rather than
/// dividing by zero.
pub fn skill_coverage(resume_skills: &[String], required_skills: &[String]) -> f64 {
    let resume: std::collections::HashSet<String> =
        resume_skills.iter().map(|s| s.to_lowercase()).collect();
    let required: std::collections::HashSet<String> =
        required_skills.iter().map(|s| s.to_lowercase()).collect();
    let overlap = required.intersection(&resume).count();
    overlap as f64 / std::cmp::max(1, required.len()) as f64
}

/// POST /score (also mounted at /match/score)
///
/// An absent or unparseable body scores as empty skill lists rather than
/// rejecting the request.
pub async fn handle_score(body: Option<Json<ScoreRequest>>) -> Json<ScoreResponse> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let coverage = skill_coverage(&request.resume_skills, &request.required_skills);
    let score = (coverage * 1000.0).round() / 1000.0;
    Json(ScoreResponse { score, coverage })
}
