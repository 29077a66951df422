//! Docs table access — point lookups, listings, counts, writes.
//!
//! Every read has a scan fallback: the primary path assumes a
//! (userId, documentId) key schema, and when the live table disagrees the
//! query fails with a ValidationException and we scan with a filter
//! instead. Callers never see the difference.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, Select};
use aws_sdk_dynamodb::Client as DynamoClient;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::document::{DocumentKind, DocumentRecord};
use crate::storage::{attr_n, attr_s, is_key_schema_mismatch, item_n, item_s, sdk_error_detail};

/// Result of the per-owner document count. The count is advisory — an
/// inability to count is reported as `Unknown` so the caller makes the
/// soft-fail decision deliberately instead of a swallowed error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocQuota {
    Counted(i64),
    Unknown(String),
}

pub fn to_item(record: &DocumentRecord) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert("userId".to_string(), attr_s(&record.user_id));
    item.insert("documentId".to_string(), attr_s(&record.document_id));
    item.insert("type".to_string(), attr_s(record.kind.as_str()));
    item.insert("s3Key".to_string(), attr_s(&record.s3_key));
    item.insert("contentType".to_string(), attr_s(&record.content_type));
    item.insert("size".to_string(), attr_n(record.size));
    item.insert("createdAt".to_string(), attr_n(record.created_at));
    if let Some(src) = &record.source_document_id {
        item.insert("sourceDocumentId".to_string(), attr_s(src));
    }
    if let Some(url) = &record.job_url {
        item.insert("jobUrl".to_string(), attr_s(url));
    }
    if let Some(interests) = &record.interests {
        item.insert("interests".to_string(), attr_s(interests));
    }
    item
}

/// Tolerant item decode: required identity fields must be present, the
/// rest default. Items written by older revisions stay readable.
pub fn from_item(item: &HashMap<String, AttributeValue>) -> Option<DocumentRecord> {
    Some(DocumentRecord {
        user_id: item_s(item, "userId")?,
        document_id: item_s(item, "documentId")?,
        kind: DocumentKind::from_str_lossy(&item_s(item, "type").unwrap_or_default()),
        s3_key: item_s(item, "s3Key").unwrap_or_default(),
        content_type: item_s(item, "contentType").unwrap_or_default(),
        size: item_n(item, "size").unwrap_or(0),
        created_at: item_n(item, "createdAt").unwrap_or(0),
        source_document_id: item_s(item, "sourceDocumentId"),
        job_url: item_s(item, "jobUrl"),
        interests: item_s(item, "interests"),
        url: None,
    })
}

/// Point lookup by (userId, documentId), falling back to a filtered scan
/// when the key-schema assumption does not hold. Absence is `Ok(None)`.
pub async fn find_doc_by_id(
    ddb: &DynamoClient,
    table: &str,
    user_id: &str,
    document_id: &str,
) -> Result<Option<DocumentRecord>, AppError> {
    match ddb
        .get_item()
        .table_name(table)
        .key("userId", attr_s(user_id))
        .key("documentId", attr_s(document_id))
        .send()
        .await
    {
        Ok(out) => {
            if let Some(record) = out.item.as_ref().and_then(from_item) {
                return Ok(Some(record));
            }
        }
        Err(e) => {
            debug!(
                "GetItem failed, falling back to scan: {}",
                sdk_error_detail(&e)
            );
        }
    }

    let out = ddb
        .scan()
        .table_name(table)
        .limit(1)
        .filter_expression("userId = :u AND documentId = :d")
        .expression_attribute_values(":u", attr_s(user_id))
        .expression_attribute_values(":d", attr_s(document_id))
        .send()
        .await
        .map_err(|e| AppError::Store(format!("DynamoDB read failed: {}", sdk_error_detail(&e))))?;

    Ok(out
        .items
        .unwrap_or_default()
        .first()
        .and_then(from_item))
}

/// Best-effort per-owner document count. Query COUNT first; on a key-schema
/// mismatch, paginate a scan COUNT. Any failure yields `Unknown`.
pub async fn count_docs_for_user(ddb: &DynamoClient, table: &str, user_id: &str) -> DocQuota {
    match ddb
        .query()
        .table_name(table)
        .key_condition_expression("userId = :u")
        .expression_attribute_values(":u", attr_s(user_id))
        .select(Select::Count)
        .send()
        .await
    {
        Ok(out) => DocQuota::Counted(i64::from(out.count)),
        Err(e) => {
            let detail = sdk_error_detail(&e);
            if !is_key_schema_mismatch(&detail) {
                return DocQuota::Unknown(detail);
            }
            scan_count(ddb, table, user_id).await
        }
    }
}

async fn scan_count(ddb: &DynamoClient, table: &str, user_id: &str) -> DocQuota {
    let mut total: i64 = 0;
    let mut start_key: Option<HashMap<String, AttributeValue>> = None;
    loop {
        let out = match ddb
            .scan()
            .table_name(table)
            .filter_expression("userId = :u")
            .expression_attribute_values(":u", attr_s(user_id))
            .select(Select::Count)
            .set_exclusive_start_key(start_key.take())
            .send()
            .await
        {
            Ok(out) => out,
            Err(e) => return DocQuota::Unknown(sdk_error_detail(&e)),
        };
        total += i64::from(out.count);
        match out.last_evaluated_key {
            Some(key) => start_key = Some(key),
            None => break,
        }
    }
    DocQuota::Counted(total)
}

/// Range query by owner, newest first, capped at 100 — with the usual
/// scan fallback on a key-schema mismatch.
pub async fn list_docs_for_user(
    ddb: &DynamoClient,
    table: &str,
    user_id: &str,
) -> Result<Vec<DocumentRecord>, AppError> {
    let items = match ddb
        .query()
        .table_name(table)
        .key_condition_expression("userId = :u")
        .expression_attribute_values(":u", attr_s(user_id))
        .limit(100)
        .scan_index_forward(false)
        .send()
        .await
    {
        Ok(out) => out.items.unwrap_or_default(),
        Err(e) => {
            let detail = sdk_error_detail(&e);
            if !is_key_schema_mismatch(&detail) {
                return Err(AppError::Store(format!("DynamoDB query failed: {detail}")));
            }
            warn!("docs query missed key schema; scanning instead");
            ddb.scan()
                .table_name(table)
                .limit(100)
                .filter_expression("userId = :u")
                .expression_attribute_values(":u", attr_s(user_id))
                .send()
                .await
                .map_err(|e| {
                    AppError::Store(format!("DynamoDB scan failed: {}", sdk_error_detail(&e)))
                })?
                .items
                .unwrap_or_default()
        }
    };

    Ok(items.iter().filter_map(from_item).collect())
}

pub async fn put_document(
    ddb: &DynamoClient,
    table: &str,
    record: &DocumentRecord,
) -> Result<(), AppError> {
    ddb.put_item()
        .table_name(table)
        .set_item(Some(to_item(record)))
        .send()
        .await
        .map_err(|e| AppError::Store(format!("DynamoDB put failed: {}", sdk_error_detail(&e))))?;
    Ok(())
}

pub async fn delete_document(
    ddb: &DynamoClient,
    table: &str,
    user_id: &str,
    document_id: &str,
) -> Result<(), AppError> {
    ddb.delete_item()
        .table_name(table)
        .key("userId", attr_s(user_id))
        .key("documentId", attr_s(document_id))
        .send()
        .await
        .map_err(|e| {
            AppError::Store(format!("DynamoDB delete failed: {}", sdk_error_detail(&e)))
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> DocumentRecord {
        DocumentRecord {
            user_id: "demo".to_string(),
            document_id: "doc-1".to_string(),
            kind: DocumentKind::Tailored,
            s3_key: "resumes/demo/tailored/cv__tailored_1700000000.html".to_string(),
            content_type: "text/html".to_string(),
            size: 2048,
            created_at: 1_700_000_000,
            source_document_id: Some("doc-0".to_string()),
            job_url: Some("https://example.com/job".to_string()),
            interests: Some("backend, infra".to_string()),
            url: None,
        }
    }

    #[test]
    fn test_item_round_trip_preserves_all_fields() {
        let record = sample_record();
        let item = to_item(&record);
        let recovered = from_item(&item).unwrap();
        assert_eq!(recovered.user_id, record.user_id);
        assert_eq!(recovered.document_id, record.document_id);
        assert_eq!(recovered.kind, DocumentKind::Tailored);
        assert_eq!(recovered.s3_key, record.s3_key);
        assert_eq!(recovered.size, 2048);
        assert_eq!(recovered.created_at, 1_700_000_000);
        assert_eq!(recovered.source_document_id.as_deref(), Some("doc-0"));
        assert_eq!(
            recovered.job_url.as_deref(),
            Some("https://example.com/job")
        );
    }

    #[test]
    fn test_optional_fields_absent_from_original_item() {
        let mut record = sample_record();
        record.kind = DocumentKind::Original;
        record.source_document_id = None;
        record.job_url = None;
        record.interests = None;
        let item = to_item(&record);
        assert!(!item.contains_key("sourceDocumentId"));
        assert!(!item.contains_key("jobUrl"));
        assert!(!item.contains_key("interests"));
        let recovered = from_item(&item).unwrap();
        assert_eq!(recovered.kind, DocumentKind::Original);
        assert!(recovered.source_document_id.is_none());
    }

    #[test]
    fn test_from_item_requires_identity_fields() {
        let mut item = to_item(&sample_record());
        item.remove("documentId");
        assert!(from_item(&item).is_none());
    }

    #[test]
    fn test_from_item_tolerates_missing_metadata() {
        let mut item = HashMap::new();
        item.insert("userId".to_string(), attr_s("demo"));
        item.insert("documentId".to_string(), attr_s("doc-9"));
        let recovered = from_item(&item).unwrap();
        assert_eq!(recovered.kind, DocumentKind::Original);
        assert_eq!(recovered.size, 0);
        assert!(recovered.s3_key.is_empty());
    }

    #[test]
    fn test_key_schema_mismatch_detection() {
        assert!(is_key_schema_mismatch(
            "ValidationException: something about keys"
        ));
        assert!(is_key_schema_mismatch(
            "Query condition missed key schema element"
        ));
        assert!(!is_key_schema_mismatch("AccessDeniedException"));
    }
}
