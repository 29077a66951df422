pub mod applications;
pub mod blob;
pub mod documents;

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

pub(crate) fn attr_s(v: impl Into<String>) -> AttributeValue {
    AttributeValue::S(v.into())
}

pub(crate) fn attr_n(v: i64) -> AttributeValue {
    AttributeValue::N(v.to_string())
}

pub(crate) fn item_s(item: &HashMap<String, AttributeValue>, key: &str) -> Option<String> {
    item.get(key).and_then(|v| v.as_s().ok()).cloned()
}

pub(crate) fn item_n(item: &HashMap<String, AttributeValue>, key: &str) -> Option<i64> {
    item.get(key)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse::<i64>().ok())
}

/// Errors from the DynamoDB SDK carry the service code inside their debug
/// representation; we only need it for fallback and tolerance decisions.
pub(crate) fn sdk_error_detail<E: std::fmt::Debug>(e: &E) -> String {
    format!("{e:?}")
}

/// A query against the wrong key schema surfaces as a ValidationException.
/// That is the signal to fall back to a filtered scan.
pub(crate) fn is_key_schema_mismatch(detail: &str) -> bool {
    detail.contains("ValidationException") || detail.contains("Query condition missed key schema")
}
