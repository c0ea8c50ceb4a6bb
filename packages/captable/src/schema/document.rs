//! The top-level import document and its metadata.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    each, non_negative_count, ClosedSet, CommonStockHolder, CommonStockHolderCandidate,
    ExtractionConfidence, ExtractionConfidenceCandidate, OptionsPool, OptionsPoolCandidate,
    PricedRound, PricedRoundCandidate, SafeInvestment, SafeInvestmentCandidate,
};
use crate::error::{SchemaResult, SchemaViolation};

/// Version tag of the import format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaVersion {
    #[default]
    #[serde(rename = "1.0")]
    V1_0,
    #[serde(rename = "1.1")]
    V1_1,
}

impl ClosedSet for SchemaVersion {
    const ALL: &'static [Self] = &[Self::V1_0, Self::V1_1];

    fn as_str(&self) -> &'static str {
        match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
        }
    }
}

/// Where the cap table data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    Excel,
    Documents,
    Mixed,
    Manual,
}

impl ClosedSet for ImportSource {
    const ALL: &'static [Self] = &[Self::Excel, Self::Documents, Self::Mixed, Self::Manual];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Excel => "excel",
            Self::Documents => "documents",
            Self::Mixed => "mixed",
            Self::Manual => "manual",
        }
    }
}

// =============================================================================
// Metadata
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportMetadataCandidate {
    pub company_name: Option<String>,
    pub date_generated: String,
    pub source: String,
    pub extraction_confidence: Option<ExtractionConfidenceCandidate>,
}

/// Run metadata. The generation timestamp is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ImportMetadataCandidate")]
pub struct ImportMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    company_name: Option<String>,
    date_generated: DateTime<Utc>,
    source: ImportSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    extraction_confidence: Option<ExtractionConfidence>,
}

impl ImportMetadata {
    pub fn new(
        company_name: Option<String>,
        date_generated: DateTime<Utc>,
        source: ImportSource,
        extraction_confidence: Option<ExtractionConfidence>,
    ) -> Self {
        Self {
            company_name,
            date_generated,
            source,
            extraction_confidence,
        }
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company_name.as_deref()
    }

    pub fn date_generated(&self) -> DateTime<Utc> {
        self.date_generated
    }

    pub fn source(&self) -> ImportSource {
        self.source
    }

    pub fn extraction_confidence(&self) -> Option<&ExtractionConfidence> {
        self.extraction_confidence.as_ref()
    }
}

/// Accepts RFC 3339 timestamps and offset-less ISO 8601 ones (read as UTC).
fn parse_timestamp(field: &str, raw: &str) -> SchemaResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| SchemaViolation::new(field, format!("`{}` is not an ISO 8601 timestamp", raw)))
}

impl TryFrom<ImportMetadataCandidate> for ImportMetadata {
    type Error = SchemaViolation;

    fn try_from(candidate: ImportMetadataCandidate) -> SchemaResult<Self> {
        Ok(Self {
            company_name: candidate.company_name,
            date_generated: parse_timestamp("dateGenerated", &candidate.date_generated)?,
            source: ImportSource::parse_field("source", &candidate.source)?,
            extraction_confidence: candidate
                .extraction_confidence
                .map(ExtractionConfidence::try_from)
                .transpose()
                .map_err(|e| e.within("extractionConfidence"))?,
        })
    }
}

// =============================================================================
// Cap table body
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapTableCandidate {
    pub common_stock: Vec<CommonStockHolderCandidate>,
    pub options: OptionsPoolCandidate,
    pub safes: Vec<SafeInvestmentCandidate>,
    pub priced_rounds: Option<Vec<PricedRoundCandidate>>,
    pub unused_shares: Option<i64>,
}

/// The cap table body: holdings, the option pool and every instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CapTableCandidate")]
pub struct CapTable {
    common_stock: Vec<CommonStockHolder>,
    options: OptionsPool,
    safes: Vec<SafeInvestment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priced_rounds: Option<Vec<PricedRound>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unused_shares: Option<u64>,
}

impl CapTable {
    pub fn new(
        common_stock: Vec<CommonStockHolder>,
        options: OptionsPool,
        safes: Vec<SafeInvestment>,
        priced_rounds: Option<Vec<PricedRound>>,
        unused_shares: Option<u64>,
    ) -> Self {
        Self {
            common_stock,
            options,
            safes,
            priced_rounds,
            unused_shares,
        }
    }

    pub fn common_stock(&self) -> &[CommonStockHolder] {
        &self.common_stock
    }

    pub fn options(&self) -> &OptionsPool {
        &self.options
    }

    pub fn safes(&self) -> &[SafeInvestment] {
        &self.safes
    }

    pub fn priced_rounds(&self) -> Option<&[PricedRound]> {
        self.priced_rounds.as_deref()
    }

    pub fn unused_shares(&self) -> Option<u64> {
        self.unused_shares
    }
}

impl TryFrom<CapTableCandidate> for CapTable {
    type Error = SchemaViolation;

    fn try_from(candidate: CapTableCandidate) -> SchemaResult<Self> {
        Ok(Self {
            common_stock: each(
                "commonStock",
                candidate.common_stock,
                CommonStockHolder::try_from,
            )?,
            options: OptionsPool::try_from(candidate.options).map_err(|e| e.within("options"))?,
            safes: each("safes", candidate.safes, SafeInvestment::try_from)?,
            priced_rounds: candidate
                .priced_rounds
                .map(|rounds| each("pricedRounds", rounds, PricedRound::try_from))
                .transpose()?,
            unused_shares: candidate
                .unused_shares
                .map(|n| non_negative_count("unusedShares", n))
                .transpose()?,
        })
    }
}

// =============================================================================
// Top-level document
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapTableImportDocumentCandidate {
    pub version: String,
    pub metadata: ImportMetadataCandidate,
    pub cap_table: CapTableCandidate,
    pub extraction_notes: Option<Vec<String>>,
}

/// The top-level import document.
///
/// `extractionNotes` is either absent (a clean run) or a non-empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CapTableImportDocumentCandidate")]
pub struct CapTableImportDocument {
    version: SchemaVersion,
    metadata: ImportMetadata,
    cap_table: CapTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    extraction_notes: Option<Vec<String>>,
}

impl CapTableImportDocument {
    pub fn new(
        version: SchemaVersion,
        metadata: ImportMetadata,
        cap_table: CapTable,
        extraction_notes: Option<Vec<String>>,
    ) -> SchemaResult<Self> {
        if matches!(&extraction_notes, Some(notes) if notes.is_empty()) {
            return Err(SchemaViolation::new(
                "extractionNotes",
                "must be absent rather than an empty list",
            ));
        }
        Ok(Self {
            version,
            metadata,
            cap_table,
            extraction_notes,
        })
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn metadata(&self) -> &ImportMetadata {
        &self.metadata
    }

    pub fn cap_table(&self) -> &CapTable {
        &self.cap_table
    }

    pub fn extraction_notes(&self) -> Option<&[String]> {
        self.extraction_notes.as_deref()
    }
}

impl TryFrom<CapTableImportDocumentCandidate> for CapTableImportDocument {
    type Error = SchemaViolation;

    fn try_from(candidate: CapTableImportDocumentCandidate) -> SchemaResult<Self> {
        let version = SchemaVersion::parse_field("version", &candidate.version)?;
        let metadata =
            ImportMetadata::try_from(candidate.metadata).map_err(|e| e.within("metadata"))?;
        let cap_table =
            CapTable::try_from(candidate.cap_table).map_err(|e| e.within("capTable"))?;
        Self::new(version, metadata, cap_table, candidate.extraction_notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "version": "1.0",
            "metadata": {
                "companyName": "Example Startup Inc.",
                "dateGenerated": "2025-01-06T12:00:00",
                "source": "documents",
                "extractionConfidence": {
                    "overall": 85.0,
                    "details": { "safes": 90, "commonStock": 85, "options": 80, "pricedRounds": 85 }
                }
            },
            "capTable": {
                "commonStock": [
                    { "holderName": "John Founder", "shares": 4500000 }
                ],
                "options": { "issued": 250000, "unissued": 750000, "targetPoolPercentage": 10.0 },
                "safes": [
                    { "investorName": "YC", "investmentAmount": 125000, "valuationCap": 1785714,
                      "discount": 0, "conversionType": "post" }
                ]
            }
        })
    }

    #[test]
    fn test_sample_document_deserializes() {
        let doc: CapTableImportDocument = serde_json::from_value(sample()).unwrap();
        assert_eq!(doc.version(), SchemaVersion::V1_0);
        assert_eq!(doc.metadata().source(), ImportSource::Documents);
        assert_eq!(doc.metadata().company_name(), Some("Example Startup Inc."));
        assert_eq!(doc.cap_table().common_stock().len(), 1);
        assert!(doc.cap_table().priced_rounds().is_none());
        assert!(doc.extraction_notes().is_none());
    }

    #[test]
    fn test_closed_sets_are_enforced_on_read() {
        let mut bad_version = sample();
        bad_version["version"] = json!("2.0");
        let err = serde_json::from_value::<CapTableImportDocument>(bad_version).unwrap_err();
        assert!(err.to_string().contains("version"));

        let mut bad_source = sample();
        bad_source["metadata"]["source"] = json!("email");
        let err = serde_json::from_value::<CapTableImportDocument>(bad_source).unwrap_err();
        assert!(err.to_string().contains("metadata.source"));
    }

    #[test]
    fn test_nested_violation_path() {
        let mut doc = sample();
        doc["capTable"]["safes"][0]["discount"] = json!(150);
        let err = serde_json::from_value::<CapTableImportDocument>(doc).unwrap_err();
        assert!(err.to_string().contains("capTable.safes[0].discount"), "{}", err);
    }

    #[test]
    fn test_empty_notes_list_is_rejected() {
        let mut doc = sample();
        doc["extractionNotes"] = json!([]);
        assert!(serde_json::from_value::<CapTableImportDocument>(doc).is_err());
    }

    #[test]
    fn test_timestamp_forms() {
        assert!(parse_timestamp("t", "2025-01-06T12:00:00Z").is_ok());
        assert!(parse_timestamp("t", "2025-01-06T12:00:00.123456").is_ok());
        assert!(parse_timestamp("t", "2025-01-06T12:00:00+02:00").is_ok());
        assert_eq!(parse_timestamp("t", "yesterday").unwrap_err().field, "t");
    }

    #[test]
    fn test_round_trip_preserves_document() {
        let doc: CapTableImportDocument = serde_json::from_value(sample()).unwrap();
        let json = serde_json::to_value(&doc).unwrap();
        let again: CapTableImportDocument = serde_json::from_value(json).unwrap();
        assert_eq!(doc, again);
    }
}
