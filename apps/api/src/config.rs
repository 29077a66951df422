use std::time::Duration;

use anyhow::{Context, Result};

/// Maximum live documents per user. Keep in sync with the UI.
pub const MAX_DOCS_PER_USER: i64 = 10;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub bucket: String,
    pub docs_table: String,
    pub appl_table: String,
    pub aws_region: String,
    /// Generation backend credential. Absent means the tailor pipeline
    /// serves its deterministic fallback render and never calls out.
    pub openai_api_key: Option<String>,
    /// Per-attempt timeout for a generation call.
    pub openai_timeout: Duration,
    /// Extra generation attempts after a failed invariant check. 0 or 1 is sensible.
    pub openai_max_retries: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs = std::env::var("OPENAI_HTTP_TIMEOUT")
            .unwrap_or_else(|_| "18.0".to_string())
            .parse::<f64>()
            .context("OPENAI_HTTP_TIMEOUT must be a number of seconds")?;

        Ok(Config {
            bucket: require_env("BUCKET_NAME")?,
            docs_table: require_env("DOCS_TABLE")?,
            appl_table: require_env("APPL_TABLE")?,
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-2".to_string()),
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            openai_timeout: Duration::from_secs_f64(timeout_secs),
            openai_max_retries: std::env::var("OPENAI_MAX_RETRIES")
                .unwrap_or_else(|_| "1".to_string())
                .parse::<u32>()
                .context("OPENAI_MAX_RETRIES must be a non-negative integer")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
