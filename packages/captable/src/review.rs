//! Review of an assembled import document.
//!
//! A document that deserializes or assembles is already structurally valid.
//! Review looks for things that are legal but suspicious, or that an importer
//! cannot use: no stockholders, capped SAFEs missing their cap, rounds with
//! nobody in them.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate};
use serde::Serialize;

use crate::schema::{CapTableImportDocument, ConversionType, SafeInvestment};

/// A later SAFE cap below this fraction of the previous one is flagged.
pub const CAP_DECREASE_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One problem found in a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFinding {
    /// Dotted path of the field, e.g. `capTable.safes[1].valuationCap`
    pub field: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ReviewFinding {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
            suggestion: None,
        }
    }

    fn warning(
        field: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Warning,
            suggestion: Some(suggestion.into()),
        }
    }
}

/// Headline figures of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub holders_count: usize,
    pub safes_count: usize,
    pub total_safe_investment: f64,
    pub series_investors_count: usize,
    pub total_series_investment: f64,
}

/// Result of [`review`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReview {
    pub is_valid: bool,
    pub errors: Vec<ReviewFinding>,
    pub warnings: Vec<ReviewFinding>,
    pub summary: ReviewSummary,
}

impl ImportReview {
    /// True when there are no error findings. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Review a document for import.
pub fn review(document: &CapTableImportDocument) -> ImportReview {
    let mut findings = Vec::new();

    check_common_stock(document, &mut findings);
    check_safes(document.cap_table().safes(), &mut findings);
    check_priced_rounds(document, &mut findings);
    check_duplicate_names(document, &mut findings);
    check_cap_progression(document.cap_table().safes(), &mut findings);

    let (errors, warnings): (Vec<_>, Vec<_>) = findings
        .into_iter()
        .partition(|f| f.severity == Severity::Error);

    ImportReview {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        summary: summarize(document),
    }
}

fn check_common_stock(document: &CapTableImportDocument, findings: &mut Vec<ReviewFinding>) {
    if document.cap_table().common_stock().is_empty() {
        findings.push(ReviewFinding::error(
            "capTable.commonStock",
            "At least one common stockholder is required",
        ));
    }
}

fn check_safes(safes: &[SafeInvestment], findings: &mut Vec<ReviewFinding>) {
    for (i, safe) in safes.iter().enumerate() {
        let field = format!("capTable.safes[{}].valuationCap", i);
        match safe.valuation_cap().filter(|cap| *cap > 0.0) {
            None if safe.conversion_type() != ConversionType::Mfn => {
                findings.push(ReviewFinding::error(
                    field,
                    "Valuation cap is required for non-MFN SAFEs",
                ));
            }
            Some(cap) if cap < safe.investment_amount() => {
                findings.push(ReviewFinding::warning(
                    field,
                    format!(
                        "Valuation cap {} is below the investment amount {}",
                        cap,
                        safe.investment_amount()
                    ),
                    "Verify this is intentional",
                ));
            }
            _ => {}
        }
    }
}

fn check_priced_rounds(document: &CapTableImportDocument, findings: &mut Vec<ReviewFinding>) {
    let rounds = document.cap_table().priced_rounds().unwrap_or_default();

    for (i, round) in rounds.iter().enumerate() {
        if round.pre_money_valuation() <= 0.0 {
            findings.push(ReviewFinding::error(
                format!("capTable.pricedRounds[{}].preMoneyValuation", i),
                "Pre-money valuation must be positive",
            ));
        }
        if round.investors().is_empty() {
            findings.push(ReviewFinding::error(
                format!("capTable.pricedRounds[{}].investors", i),
                "At least one investor is required for a priced round",
            ));
        }
    }
}

/// Names shared between any two parties, compared case-insensitively.
fn check_duplicate_names(document: &CapTableImportDocument, findings: &mut Vec<ReviewFinding>) {
    let cap_table = document.cap_table();
    let names = cap_table
        .common_stock()
        .iter()
        .map(|h| h.holder_name())
        .chain(cap_table.safes().iter().map(|s| s.investor_name()))
        .chain(
            cap_table
                .priced_rounds()
                .unwrap_or_default()
                .iter()
                .flat_map(|r| r.investors())
                .map(|i| i.investor_name()),
        );

    let mut seen = BTreeSet::new();
    let mut duplicates = Vec::new();
    for name in names {
        let name = name.to_lowercase();
        if !seen.insert(name.clone()) && !duplicates.contains(&name) {
            duplicates.push(name);
        }
    }

    if !duplicates.is_empty() {
        findings.push(ReviewFinding::warning(
            "names",
            format!("Duplicate names detected: {}", duplicates.join(", ")),
            "Verify if these are the same entity or different ones",
        ));
    }
}

/// Compare each dated, capped SAFE with the one executed before it.
fn check_cap_progression(safes: &[SafeInvestment], findings: &mut Vec<ReviewFinding>) {
    let mut dated: Vec<(NaiveDate, f64)> = safes
        .iter()
        .filter_map(|safe| {
            let date = parse_date(safe.date_executed()?)?;
            let cap = safe.valuation_cap().filter(|cap| *cap > 0.0)?;
            Some((date, cap))
        })
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    for pair in dated.windows(2) {
        let (previous, current) = (pair[0].1, pair[1].1);
        if current < previous * CAP_DECREASE_THRESHOLD {
            findings.push(ReviewFinding::warning(
                "capTable.safes",
                format!(
                    "SAFE valuation cap decreased significantly from {} to {}",
                    previous, current
                ),
                "Verify if this cap decrease is intentional",
            ));
        }
    }
}

/// Plain dates and full timestamps; anything else is treated as undated.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive()))
}

fn summarize(document: &CapTableImportDocument) -> ReviewSummary {
    let cap_table = document.cap_table();
    let rounds = cap_table.priced_rounds().unwrap_or_default();

    ReviewSummary {
        holders_count: cap_table.common_stock().len(),
        safes_count: cap_table.safes().len(),
        total_safe_investment: cap_table
            .safes()
            .iter()
            .map(SafeInvestment::investment_amount)
            .sum(),
        series_investors_count: rounds.iter().map(|r| r.investors().len()).sum(),
        total_series_investment: rounds.iter().map(|r| r.total_investment()).sum(),
    }
}
