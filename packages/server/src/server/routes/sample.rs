use axum::Json;
use captable::CapTableImportDocument;
use serde_json::{json, Value};

use crate::server::error::ApiError;

/// The fixed example, as served. Whole amounts are written as integers.
fn sample_value() -> Value {
    json!({
        "version": "1.0",
        "metadata": {
            "companyName": "Example Startup Inc.",
            "dateGenerated": "2025-01-06T12:00:00Z",
            "source": "documents",
            "extractionConfidence": {
                "overall": 85.0,
                "details": {
                    "safes": 90.0,
                    "commonStock": 90.0,
                    "options": 90.0,
                    "pricedRounds": 70.0
                }
            }
        },
        "capTable": {
            "commonStock": [{
                "holderName": "John Founder",
                "shares": 4500000,
                "vestingSchedule": {
                    "cliff": "12 months",
                    "totalVestingPeriod": "48 months",
                    "startDate": "2023-01-01"
                }
            }],
            "options": {
                "issued": 250000,
                "unissued": 750000,
                "targetPoolPercentage": 10.0
            },
            "safes": [{
                "investorName": "YC",
                "investmentAmount": 125000,
                "valuationCap": 1785714,
                "discount": 0,
                "conversionType": "post"
            }]
        }
    })
}

/// A fixed example of the output format.
pub fn sample_document() -> Result<CapTableImportDocument, serde_json::Error> {
    serde_json::from_value(sample_value())
}

/// Get a sample output to understand the expected format.
///
/// The example is checked against the schema before it is served.
pub async fn sample_output_handler() -> Result<Json<Value>, ApiError> {
    sample_document()
        .map_err(|e| ApiError::Internal(format!("Sample document is invalid: {}", e)))?;
    Ok(Json(sample_value()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_document_is_valid() {
        let document = sample_document().unwrap();
        assert_eq!(document.cap_table().safes().len(), 1);
        assert!(document.extraction_notes().is_none());
        assert!(captable::review(&document).is_valid());
    }

    #[test]
    fn test_sample_amounts_are_integers() {
        let value = sample_value();
        let safe = &value["capTable"]["safes"][0];
        assert_eq!(safe["investmentAmount"].as_u64(), Some(125000));
        assert_eq!(safe["valuationCap"].as_u64(), Some(1785714));
        assert_eq!(value["capTable"]["options"]["targetPoolPercentage"], json!(10.0));
    }
}
