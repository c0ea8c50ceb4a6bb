use axum::Json;
use captable::{review, CapTableImportDocument, ImportReview};
use tracing::debug;

use crate::server::error::ApiError;

/// Review a serialized import document.
///
/// The body is re-validated while deserializing, so a document that breaks
/// a schema invariant is rejected with 422 before any review runs.
pub async fn review_handler(Json(body): Json<serde_json::Value>) -> Result<Json<ImportReview>, ApiError> {
    let document: CapTableImportDocument = serde_json::from_value(body)
        .map_err(|e| ApiError::Unprocessable(format!("Invalid import document: {}", e)))?;

    let result = review(&document);
    debug!(
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "Reviewed import document"
    );

    Ok(Json(result))
}
