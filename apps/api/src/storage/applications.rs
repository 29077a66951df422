//! Applications table access. Write-only in the current surface.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use crate::errors::AppError;
use crate::models::application::ApplicationRecord;
use crate::storage::{attr_n, attr_s, sdk_error_detail};

pub fn to_item(record: &ApplicationRecord) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert("userId".to_string(), attr_s(&record.user_id));
    item.insert("jobId".to_string(), attr_s(&record.job_id));
    item.insert(
        "score".to_string(),
        AttributeValue::N(record.score.to_string()),
    );
    item.insert("status".to_string(), attr_s(&record.status));
    item.insert("createdAt".to_string(), attr_n(record.created_at));
    item
}

pub async fn put_application(
    ddb: &DynamoClient,
    table: &str,
    record: &ApplicationRecord,
) -> Result<(), AppError> {
    ddb.put_item()
        .table_name(table)
        .set_item(Some(to_item(record)))
        .send()
        .await
        .map_err(|e| AppError::Store(format!("DynamoDB put failed: {}", sdk_error_detail(&e))))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_item_shape() {
        let record = ApplicationRecord {
            user_id: "demo".to_string(),
            job_id: "job-1".to_string(),
            score: 0.5,
            status: "CREATED".to_string(),
            created_at: 1_700_000_000,
        };
        let item = to_item(&record);
        assert_eq!(item["userId"].as_s().unwrap(), "demo");
        assert_eq!(item["score"].as_n().unwrap(), "0.5");
        assert_eq!(item["status"].as_s().unwrap(), "CREATED");
    }
}
