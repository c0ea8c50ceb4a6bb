// Main entry point for API server

use anyhow::{Context, Result};
use server_core::{
    server::{build_app, build_extractor},
    Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,captable=debug,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cap Table Extractor API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        model = config.openai_model.as_deref().unwrap_or(captable::ai::DEFAULT_MODEL),
        task_timeout_secs = config.task_timeout.map(|t| t.as_secs()),
        max_upload_bytes = config.max_upload_bytes,
        "Configuration loaded"
    );

    // Build application
    let app = build_app(build_extractor(&config), config.max_upload_bytes);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
