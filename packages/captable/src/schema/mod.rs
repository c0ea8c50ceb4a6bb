//! Schema layer: every structured cap table entity and its field invariants.
//!
//! Each entity with invariants comes in two forms:
//!
//! - a `*Candidate`: the raw value set as it arrives from an inference engine
//!   or an external JSON document (primitive fields, no guarantees);
//! - the validated entity, built with `TryFrom<Candidate>` (or a constructor) and
//!   immutable afterwards. Deserializing a validated entity goes through its
//!   candidate, so invariants are re-checked on every external read.
//!
//! Closed enumerations (`conversionType`, `source`, `version`, side letters) are
//! carried as strings in candidates so an unknown value surfaces as a
//! [`SchemaViolation`] naming the field instead of a bare parse error.

pub mod confidence;
pub mod document;
pub mod holdings;
pub mod priced_round;
pub mod safe;
pub mod vesting;

pub use confidence::{ExtractionConfidence, ExtractionConfidenceCandidate, TaskKind};
pub use document::{
    CapTable, CapTableCandidate, CapTableImportDocument, CapTableImportDocumentCandidate,
    ImportMetadata, ImportMetadataCandidate, ImportSource, SchemaVersion,
};
pub use holdings::{CommonStockHolder, CommonStockHolderCandidate, OptionsPool, OptionsPoolCandidate};
pub use priced_round::{
    ParticipationRights, PricedRound, PricedRoundCandidate, SeriesInvestor,
    SeriesInvestorCandidate,
};
pub use safe::{AdditionalTerms, ConversionType, SafeInvestment, SafeInvestmentCandidate, SideLetter};
pub use vesting::VestingSchedule;

use crate::error::{SchemaResult, SchemaViolation};

// =============================================================================
// Shared field rules
// =============================================================================

/// Names must contain something other than whitespace. Returns the trimmed name.
pub(crate) fn non_empty(field: &str, value: String) -> SchemaResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SchemaViolation::new(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Investment amounts must be finite and strictly positive.
pub(crate) fn positive_amount(field: &str, value: f64) -> SchemaResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SchemaViolation::new(
            field,
            format!("must be greater than 0 (got {})", value),
        ))
    }
}

/// Valuations and other free amounts only need to be real numbers.
pub(crate) fn finite(field: &str, value: f64) -> SchemaResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SchemaViolation::new(field, "must be a finite number"))
    }
}

/// Percentages, discounts and confidences live in `0..=100`.
pub(crate) fn percentage(field: &str, value: f64) -> SchemaResult<f64> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(SchemaViolation::new(
            field,
            format!("must be between 0 and 100 (got {})", value),
        ))
    }
}

pub(crate) fn optional_percentage(field: &str, value: Option<f64>) -> SchemaResult<Option<f64>> {
    value.map(|v| percentage(field, v)).transpose()
}

/// Share counts must be strictly positive.
pub(crate) fn positive_count(field: &str, value: i64) -> SchemaResult<u64> {
    if value > 0 {
        Ok(value as u64)
    } else {
        Err(SchemaViolation::new(
            field,
            format!("must be greater than 0 (got {})", value),
        ))
    }
}

/// Pool sizes and unallocated shares may be zero but never negative.
pub(crate) fn non_negative_count(field: &str, value: i64) -> SchemaResult<u64> {
    u64::try_from(value).map_err(|_| {
        SchemaViolation::new(field, format!("must not be negative (got {})", value))
    })
}

/// Validate every element of a list, tagging violations with the element index.
pub(crate) fn each<C, T>(
    field: &str,
    candidates: Vec<C>,
    validate: impl Fn(C) -> SchemaResult<T>,
) -> SchemaResult<Vec<T>> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(i, c)| validate(c).map_err(|e| e.at_index(field, i)))
        .collect()
}

/// Closed string enumerations shared by the schema.
pub(crate) trait ClosedSet: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse_field(field: &str, raw: &str) -> SchemaResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == raw)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                SchemaViolation::new(
                    field,
                    format!("`{}` is not one of {}", raw, allowed.join(", ")),
                )
            })
    }
}
