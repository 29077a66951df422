//! Axum route handler for the tailor pipeline.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::MAX_DOCS_PER_USER;
use crate::errors::AppError;
use crate::models::document::{DocumentKind, DocumentRecord};
use crate::state::AppState;
use crate::storage::blob;
use crate::storage::documents::{count_docs_for_user, find_doc_by_id, put_document, DocQuota};
use crate::tailor::jobfetch::{fetch_job_text, JOB_FETCH_TIMEOUT};
use crate::tailor::plaintext::{extract_resume_text, TextOutcome};
use crate::tailor::{tailor_resume_html, TailorOptions};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorRequest {
    pub user_id: Option<String>,
    pub document_id: Option<String>,
    pub job_url: Option<String>,
    pub interests: Option<String>,
}

/// POST /tailor
///
/// Body: { userId, documentId, jobUrl, interests }
/// Produces an HTML resume and stores it under
/// `resumes/{userId}/tailored/*.html`, indexed as a tailored document
/// referencing its source.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = request.user_id.as_deref().unwrap_or("demo").trim().to_string();
    let source_doc_id = request.document_id.unwrap_or_default().trim().to_string();
    let job_url = request.job_url.unwrap_or_default().trim().to_string();
    let interests = request.interests.unwrap_or_default().trim().to_string();

    if user_id.is_empty() || source_doc_id.is_empty() || job_url.is_empty() {
        return Err(AppError::Validation(
            "Fields required: userId, documentId, jobUrl".to_string(),
        ));
    }
    info!("tailor start: user={user_id} doc={source_doc_id}");

    // Soft quota: an unknowable count never blocks the request.
    match count_docs_for_user(&state.ddb, &state.config.docs_table, &user_id).await {
        DocQuota::Counted(n) if n >= MAX_DOCS_PER_USER => {
            return Err(AppError::QuotaExceeded(format!(
                "Document limit reached ({MAX_DOCS_PER_USER})"
            )));
        }
        DocQuota::Counted(_) => {}
        DocQuota::Unknown(reason) => {
            warn!("doc count unavailable, proceeding: {reason}");
        }
    }

    let source = find_doc_by_id(&state.ddb, &state.config.docs_table, &user_id, &source_doc_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Source document not found".to_string()))?;

    if source.s3_key.is_empty() {
        return Err(AppError::Validation("Source item missing s3Key".to_string()));
    }
    let source_ct = if source.content_type.is_empty() {
        "application/octet-stream".to_string()
    } else {
        source.content_type.clone()
    };

    // Blob-read failure degrades the resume text rather than failing the
    // request; the placeholder stays visible in the output.
    let resume_text = match blob::get_blob(&state.s3, &state.config.bucket, &source.s3_key).await {
        Ok(data) => {
            info!("fetched resume bytes: ct={source_ct} len={}", data.len());
            extract_resume_text(&data, &source_ct)
        }
        Err(detail) => {
            warn!("failed to read source blob: {detail}");
            TextOutcome::Degraded("[Could not fetch original resume bytes]".to_string())
        }
    };

    let job_text = fetch_job_text(&state.http, &job_url, JOB_FETCH_TIMEOUT).await;
    info!("fetched job text: {} chars", job_text.text().len());

    let opts = TailorOptions {
        per_call_timeout: state.config.openai_timeout,
        max_retries: state.config.openai_max_retries,
    };
    let html = tailor_resume_html(
        state.chat.as_deref(),
        &opts,
        resume_text.text(),
        job_text.text(),
        &interests,
    )
    .await;
    let html_bytes = html.into_bytes();
    info!("tailored html: {} bytes", html_bytes.len());

    let created_at = chrono::Utc::now().timestamp();
    let html_key = blob::tailored_key(&user_id, &source.s3_key, created_at);

    let metadata = std::collections::HashMap::from([
        ("type".to_string(), DocumentKind::Tailored.as_str().to_string()),
        ("sourcedocumentid".to_string(), source_doc_id.clone()),
        ("joburl".to_string(), job_url.clone()),
        ("interests".to_string(), interests.clone()),
    ]);
    blob::put_blob(
        &state.s3,
        &state.config.bucket,
        &html_key,
        html_bytes.clone(),
        blob::PutOptions {
            content_type: "text/html; charset=utf-8".to_string(),
            cache_control: Some("no-cache".to_string()),
            encrypt: true,
            metadata: Some(metadata),
        },
    )
    .await
    .map_err(|detail| AppError::Blob(format!("S3 put failed: {detail}")))?;

    let new_doc_id = Uuid::new_v4().to_string();
    let record = DocumentRecord {
        user_id: user_id.clone(),
        document_id: new_doc_id.clone(),
        kind: DocumentKind::Tailored,
        s3_key: html_key.clone(),
        content_type: "text/html".to_string(),
        size: html_bytes.len() as i64,
        created_at,
        source_document_id: Some(source_doc_id),
        job_url: Some(job_url),
        interests: Some(interests),
        url: None,
    };
    put_document(&state.ddb, &state.config.docs_table, &record).await?;
    info!("tailored document indexed: {new_doc_id}");

    let url = blob::presign_get(&state.s3, &state.config.bucket, &html_key).await?;

    Ok(Json(json!({
        "ok": true,
        "documentId": new_doc_id,
        "s3Key": html_key,
        "createdAt": created_at,
        "type": DocumentKind::Tailored.as_str(),
        "url": url,
        "contentType": "text/html",
    })))
}
