use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use reqwest::Client as HttpClient;

use crate::config::Config;
use crate::llm_client::ChatBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub ddb: DynamoClient,
    pub s3: S3Client,
    /// Plain HTTP client used for job-page fetches.
    pub http: HttpClient,
    /// Generation backend. `None` when no credential is configured — the
    /// tailor pipeline then serves its deterministic fallback render.
    pub chat: Option<Arc<dyn ChatBackend>>,
    pub config: Config,
}
