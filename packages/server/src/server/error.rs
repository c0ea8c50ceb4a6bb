//! API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use captable::ExtractError;
use serde::Serialize;
use thiserror::Error;

/// Errors a route can answer with. Everything else is a 200 with a document.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed upload
    #[error("{0}")]
    BadRequest(String),

    /// A submitted document that breaks a schema invariant
    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(error: ExtractError) -> Self {
        match error {
            ExtractError::Preprocess(e) => ApiError::BadRequest(format!("Failed to read file: {}", e)),
            ExtractError::AssemblyDefect(_) => {
                tracing::error!(error = %error, "Extraction produced an invalid document");
                ApiError::Internal(format!("Failed to extract cap table data: {}", error))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}
