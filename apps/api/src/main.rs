mod applications;
mod config;
mod diag;
mod documents;
mod errors;
mod llm_client;
mod models;
mod routes;
mod scoring;
mod state;
mod storage;
mod tailor;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use aws_config::Region;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{ChatBackend, OpenAiClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Cargo exposes the package name with hyphens; the tracing
            // target uses the crate name with underscores.
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Assistant API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize AWS clients (S3 + DynamoDB share one config)
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .load()
        .await;
    let s3 = aws_sdk_s3::Client::new(&aws_config);
    let ddb = aws_sdk_dynamodb::Client::new(&aws_config);
    info!("S3 and DynamoDB clients initialized (region: {})", config.aws_region);

    // Plain HTTP client for job-page fetches; the 12s connect timeout is
    // the blanket safety net under the per-call timeouts.
    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(12))
        .build()?;

    // Generation backend — optional; without a credential the tailor
    // pipeline serves its deterministic fallback render.
    let chat: Option<Arc<dyn ChatBackend>> = match &config.openai_api_key {
        Some(key) => {
            info!("Generation backend configured (model: {})", llm_client::MODEL);
            Some(Arc::new(OpenAiClient::new(key.clone())))
        }
        None => {
            info!("No generation credential; tailoring will serve fallback renders");
            None
        }
    };

    let state = AppState {
        ddb,
        s3,
        http,
        chat,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
