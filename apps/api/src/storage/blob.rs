//! Blob store access — S3 puts, gets, deletes, and presigned retrieval URLs.
//!
//! Keys are hierarchical: `resumes/{userId}/{filename}` for uploaded
//! originals, `resumes/{userId}/tailored/{base}__tailored_{unix}.html` for
//! generated output.

use std::collections::HashMap;
use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;

use crate::errors::AppError;
use crate::storage::sdk_error_detail;

/// Presigned URLs are short-lived: long enough for a browser to follow,
/// short enough not to be a durable capability.
const PRESIGN_EXPIRY: Duration = Duration::from_secs(300);

pub fn original_key(user_id: &str, filename: &str) -> String {
    format!("resumes/{user_id}/{filename}")
}

pub fn tailored_key(user_id: &str, source_key: &str, created_at: i64) -> String {
    let base = strip_extension(basename(source_key));
    format!("resumes/{user_id}/tailored/{base}__tailored_{created_at}.html")
}

fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, _)) => base,
        None => name,
    }
}

/// Parameters for a blob write beyond key and body.
#[derive(Debug, Default)]
pub struct PutOptions {
    pub content_type: String,
    pub cache_control: Option<String>,
    pub encrypt: bool,
    pub metadata: Option<HashMap<String, String>>,
}

pub async fn put_blob(
    s3: &S3Client,
    bucket: &str,
    key: &str,
    body: Vec<u8>,
    opts: PutOptions,
) -> Result<(), String> {
    let mut req = s3
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body))
        .content_type(&opts.content_type)
        .content_disposition("inline")
        .set_cache_control(opts.cache_control)
        .set_metadata(opts.metadata);
    if opts.encrypt {
        req = req.server_side_encryption(ServerSideEncryption::Aes256);
    }
    req.send().await.map_err(|e| sdk_error_detail(&e))?;
    Ok(())
}

pub async fn get_blob(s3: &S3Client, bucket: &str, key: &str) -> Result<Bytes, String> {
    let out = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| sdk_error_detail(&e))?;
    let aggregated = out
        .body
        .collect()
        .await
        .map_err(|e| sdk_error_detail(&e))?;
    Ok(aggregated.into_bytes())
}

/// Deletes a blob, returning the raw error detail on failure so the caller
/// can decide which failures to tolerate (missing key, denied access).
pub async fn delete_blob(s3: &S3Client, bucket: &str, key: &str) -> Result<(), String> {
    s3.delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| sdk_error_detail(&e))?;
    Ok(())
}

/// A delete that failed because the object is already gone, or because we
/// cannot touch it, does not fail the request.
pub fn is_tolerable_delete_error(detail: &str) -> bool {
    detail.contains("NoSuchKey") || detail.contains("AccessDenied")
}

/// Time-limited retrieval URL for a stored object.
pub async fn presign_get(s3: &S3Client, bucket: &str, key: &str) -> Result<String, AppError> {
    let config = PresigningConfig::expires_in(PRESIGN_EXPIRY)
        .map_err(|e| AppError::Blob(format!("Presigning config invalid: {e}")))?;
    let presigned = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .presigned(config)
        .await
        .map_err(|e| AppError::Blob(format!("Presigning failed: {}", sdk_error_detail(&e))))?;
    Ok(presigned.uri().to_string())
}
