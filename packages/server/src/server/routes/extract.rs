//! Extraction endpoints.

use axum::{
    extract::{Multipart, State},
    Form, Json,
};
use captable::CapTableImportDocument;
use serde::Deserialize;
use tracing::{info, warn};

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ExtractTextForm {
    pub text: String,
    pub company_name: Option<String>,
}

/// Extract a cap table from plain text (form fields `text`, `company_name`).
pub async fn extract_text_handler(
    State(state): State<AppState>,
    Form(form): Form<ExtractTextForm>,
) -> Result<Json<CapTableImportDocument>, ApiError> {
    info!(text_len = form.text.len(), "Extracting cap table from text");

    let document = state
        .extractor
        .extract_from_text(&form.text, form.company_name.as_deref())
        .await?;

    Ok(Json(document))
}

/// Extract a cap table from an uploaded PDF (multipart `file`, `company_name`).
pub async fn extract_pdf_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CapTableImportDocument>, ApiError> {
    let mut company_name: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "company_name" => {
                company_name = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read company_name: {}", e))
                })?);
            }
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                if !filename.to_lowercase().ends_with(".pdf") {
                    return Err(ApiError::BadRequest("Only PDF files are supported".into()));
                }
                let bytes = field.bytes().await.map_err(|e| {
                    warn!(error = %e, "Failed to read upload bytes");
                    ApiError::BadRequest(format!("Failed to read file: {}", e))
                })?;
                file = Some((filename, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("A PDF file is required".into()))?;

    info!(filename = %filename, size = bytes.len(), "Extracting cap table from PDF");

    let document = state
        .extractor
        .extract_from_document(&bytes, company_name.as_deref())
        .await?;

    Ok(Json(document))
}
