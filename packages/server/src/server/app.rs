//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use captable::{ai::OpenAIInference, Extractor, ExtractorConfig};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::server::routes::{
    extract_pdf_handler, extract_text_handler, health_handler, review_handler,
    sample_output_handler,
};

/// Name reported by the health endpoints.
pub const SERVICE_NAME: &str = "Cap Table Extractor API";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<Extractor>,
}

/// Build the extractor described by the configuration.
pub fn build_extractor(config: &Config) -> Extractor {
    let mut inference = OpenAIInference::new(config.openai_api_key.clone());
    if let Some(model) = &config.openai_model {
        inference = inference.with_model(model.clone());
    }
    if let Some(base_url) = &config.openai_base_url {
        inference = inference.with_base_url(base_url.clone());
    }

    let extractor_config = match config.task_timeout {
        Some(timeout) => ExtractorConfig::new().with_task_timeout(timeout),
        None => ExtractorConfig::new().without_timeout(),
    };

    Extractor::new(Arc::new(inference)).with_config(extractor_config)
}

/// Build the router around an extractor.
pub fn build_app(extractor: Extractor, max_upload_bytes: usize) -> Router {
    let state = AppState {
        extractor: Arc::new(extractor),
    };

    // CORS configuration - allow any origin; the API holds no credentials
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .route("/extract-text", post(extract_text_handler))
        .route("/extract-pdf", post(extract_pdf_handler))
        .route("/review", post(review_handler))
        .route("/sample-output", get(sample_output_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
