//! Axum route handlers for document upload, listing, deletion, and direct
//! HTML retrieval.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::MAX_DOCS_PER_USER;
use crate::errors::AppError;
use crate::models::document::{DocumentKind, DocumentRecord};
use crate::state::AppState;
use crate::storage::blob;
use crate::storage::documents::{
    count_docs_for_user, delete_document, find_doc_by_id, list_docs_for_user, put_document,
    DocQuota,
};

/// Extensions accepted for resume uploads. Keep in sync with the UI.
const ALLOWED_EXTS: &[&str] = &["pdf", "doc", "docx", "txt"];
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

fn file_ext(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Upload
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResumeRequest {
    pub user_id: Option<String>,
    pub filename: Option<String>,
    pub content_base64: Option<String>,
}

/// POST /upload/resume
///
/// Stores the decoded upload in the blob store and indexes it as an
/// original document, returning a short-lived retrieval URL.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Json(request): Json<UploadResumeRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = request.user_id.as_deref().unwrap_or("demo").trim().to_string();
    let filename = request
        .filename
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| format!("resume-{}.txt", Uuid::new_v4()))
        .trim()
        .to_string();
    let content_b64 = request.content_base64.unwrap_or_default();

    if user_id.is_empty() || content_b64.is_empty() {
        return Err(AppError::Validation(
            "Fields required: userId, filename, contentBase64".to_string(),
        ));
    }

    if !ALLOWED_EXTS.contains(&file_ext(&filename).as_str()) {
        return Err(AppError::UnsupportedMedia(
            "Unsupported file type. Allowed: PDF, DOC, DOCX, TXT".to_string(),
        ));
    }

    match count_docs_for_user(&state.ddb, &state.config.docs_table, &user_id).await {
        DocQuota::Counted(n) if n >= MAX_DOCS_PER_USER => {
            return Err(AppError::QuotaExceeded(format!(
                "Doc limit reached ({MAX_DOCS_PER_USER})."
            )));
        }
        DocQuota::Counted(_) => {}
        DocQuota::Unknown(reason) => {
            warn!("doc count unavailable, proceeding: {reason}");
        }
    }

    let data = BASE64
        .decode(content_b64.trim())
        .map_err(|_| AppError::Validation("contentBase64 is not valid base64".to_string()))?;

    if data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::PayloadTooLarge("File too large (>10MB)".to_string()));
    }

    let content_type = mime_guess::from_path(&filename)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string();
    let key = blob::original_key(&user_id, &filename);
    let size = data.len() as i64;

    blob::put_blob(
        &state.s3,
        &state.config.bucket,
        &key,
        data,
        blob::PutOptions {
            content_type: content_type.clone(),
            ..Default::default()
        },
    )
    .await
    .map_err(|detail| AppError::Blob(format!("Upload failed: {detail}")))?;

    let document_id = Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().timestamp();
    let record = DocumentRecord {
        user_id: user_id.clone(),
        document_id: document_id.clone(),
        kind: DocumentKind::Original,
        s3_key: key.clone(),
        content_type: content_type.clone(),
        size,
        created_at,
        source_document_id: None,
        job_url: None,
        interests: None,
        url: None,
    };
    put_document(&state.ddb, &state.config.docs_table, &record).await?;
    info!("uploaded document {document_id} for {user_id} ({size} bytes)");

    let url = blob::presign_get(&state.s3, &state.config.bucket, &key).await?;

    Ok(Json(json!({
        "ok": true,
        "documentId": document_id,
        "bucket": state.config.bucket,
        "s3Key": key,
        "size": size,
        "contentType": content_type,
        "createdAt": created_at,
        "url": url,
    })))
}

// ────────────────────────────────────────────────────────────────────────────
// Listing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsQuery {
    pub user_id: Option<String>,
}

/// GET /documents?userId=...
///
/// Lists the owner's documents, each with a best-effort presigned URL.
pub async fn handle_list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = query.user_id.as_deref().unwrap_or("demo").trim().to_string();

    let mut items = list_docs_for_user(&state.ddb, &state.config.docs_table, &user_id).await?;

    for item in &mut items {
        if item.s3_key.is_empty() {
            continue;
        }
        match blob::presign_get(&state.s3, &state.config.bucket, &item.s3_key).await {
            Ok(url) => item.url = Some(url),
            Err(e) => warn!("presign failed for {}: {e}", item.s3_key),
        }
    }

    let count = items.len();
    Ok(Json(json!({ "items": items, "count": count })))
}

// ────────────────────────────────────────────────────────────────────────────
// Deletion
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDocumentParams {
    pub user_id: Option<String>,
    pub document_id: Option<String>,
    pub s3_key: Option<String>,
}

/// DELETE|POST /documents/delete
///
/// Accepts parameters from the body or the query string. Deleting a
/// record that does not exist is a success ("nothing to delete"), and a
/// blob that is already gone (or untouchable) does not fail the request.
pub async fn handle_delete_document(
    State(state): State<AppState>,
    Query(query): Query<DeleteDocumentParams>,
    body: Option<Json<DeleteDocumentParams>>,
) -> Result<Json<Value>, AppError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let user_id = body
        .user_id
        .or(query.user_id)
        .unwrap_or_else(|| "demo".to_string())
        .trim()
        .to_string();
    let document_id = body
        .document_id
        .or(query.document_id)
        .unwrap_or_default()
        .trim()
        .to_string();
    let mut explicit_key = body
        .s3_key
        .or(query.s3_key)
        .unwrap_or_default()
        .trim()
        .to_string();

    if user_id.is_empty() || (document_id.is_empty() && explicit_key.is_empty()) {
        return Err(AppError::Validation(
            "Fields required: userId AND (documentId OR s3Key)".to_string(),
        ));
    }

    let mut record = None;
    if explicit_key.is_empty() {
        record =
            find_doc_by_id(&state.ddb, &state.config.docs_table, &user_id, &document_id).await?;

        let Some(found) = &record else {
            return Ok(Json(json!({
                "ok": true,
                "message": "Document not found; nothing to delete",
            })));
        };
        explicit_key = found.s3_key.clone();
    }

    let mut s3_deleted = false;
    if !explicit_key.is_empty() {
        match blob::delete_blob(&state.s3, &state.config.bucket, &explicit_key).await {
            Ok(()) => s3_deleted = true,
            Err(detail) if blob::is_tolerable_delete_error(&detail) => {
                warn!("tolerated blob delete failure for {explicit_key}: {detail}");
            }
            Err(detail) => {
                return Err(AppError::Blob(format!("S3 delete failed: {detail}")));
            }
        }
    }

    let mut ddb_deleted = false;
    if let Some(found) = &record {
        delete_document(
            &state.ddb,
            &state.config.docs_table,
            &found.user_id,
            &found.document_id,
        )
        .await?;
        ddb_deleted = true;
    } else if !document_id.is_empty() {
        delete_document(&state.ddb, &state.config.docs_table, &user_id, &document_id).await?;
        ddb_deleted = true;
    }

    Ok(Json(json!({
        "ok": true,
        "s3Deleted": s3_deleted,
        "ddbDeleted": ddb_deleted,
        "s3Key": explicit_key,
        "userId": user_id,
        "documentId": if document_id.is_empty() {
            record.as_ref().map(|r| r.document_id.clone())
        } else {
            Some(document_id)
        },
    })))
}

// ────────────────────────────────────────────────────────────────────────────
// Direct HTML retrieval
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHtmlQuery {
    pub user_id: Option<String>,
    pub document_id: Option<String>,
}

/// GET /documents/html?userId=...&documentId=...
///
/// Returns the stored HTML body itself. The browser talks only to this
/// service, so the blob store's CORS configuration never enters the
/// picture.
pub async fn handle_get_document_html(
    State(state): State<AppState>,
    Query(query): Query<DocumentHtmlQuery>,
) -> Result<Response, AppError> {
    let user_id = query.user_id.as_deref().unwrap_or("demo").trim().to_string();
    let document_id = query.document_id.unwrap_or_default().trim().to_string();

    if user_id.is_empty() || document_id.is_empty() {
        return Err(AppError::Validation("Missing userId or documentId".to_string()));
    }

    let record = find_doc_by_id(&state.ddb, &state.config.docs_table, &user_id, &document_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    if !record.content_type.starts_with("text/html") {
        return Err(AppError::UnsupportedMedia(
            "Document is not text/html".to_string(),
        ));
    }
    if record.s3_key.is_empty() {
        return Err(AppError::Store("Document missing s3Key".to_string()));
    }

    let body = blob::get_blob(&state.s3, &state.config.bucket, &record.s3_key)
        .await
        .map_err(|detail| AppError::Blob(format!("Failed to read S3 object: {detail}")))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        String::from_utf8_lossy(&body).into_owned(),
    )
        .into_response())
}
