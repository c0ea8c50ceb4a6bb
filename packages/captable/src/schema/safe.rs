//! SAFE investments.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{finite, non_empty, percentage, positive_amount, ClosedSet};
use crate::error::{SchemaResult, SchemaViolation};

/// How a SAFE converts into equity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConversionType {
    /// Post-money valuation cap
    Post,
    /// Pre-money valuation cap
    Pre,
    /// Most favored nation, no cap of its own
    Mfn,
}

impl ClosedSet for ConversionType {
    const ALL: &'static [Self] = &[Self::Post, Self::Pre, Self::Mfn];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Pre => "pre",
            Self::Mfn => "mfn",
        }
    }
}

/// Side letter rights attached to a SAFE.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum SideLetter {
    #[serde(rename = "mfn")]
    Mfn,
    #[serde(rename = "pro-rata")]
    ProRata,
}

impl ClosedSet for SideLetter {
    const ALL: &'static [Self] = &[Self::Mfn, Self::ProRata];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Mfn => "mfn",
            Self::ProRata => "pro-rata",
        }
    }
}

/// Extra terms that some SAFEs carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalTerms {
    /// Interest rate, as a percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest: Option<f64>,

    /// Expiration date (calendar date)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    /// Any other terms, verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_terms: Option<String>,
}

/// A SAFE as extracted.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SafeInvestmentCandidate {
    /// Name of the investor
    pub investor_name: String,

    /// Amount invested, in dollars
    pub investment_amount: f64,

    /// Valuation cap in dollars; absent for uncapped SAFEs
    pub valuation_cap: Option<f64>,

    /// Discount as a percentage (0-100); absent means no discount
    pub discount: Option<f64>,

    /// Conversion mechanics
    #[schemars(with = "ConversionType")]
    pub conversion_type: String,

    /// Execution date (calendar date)
    pub date_executed: Option<String>,

    /// Side letter rights granted with the SAFE
    #[schemars(with = "Option<Vec<SideLetter>>")]
    pub side_letters: Option<Vec<String>>,

    /// Interest, expiration and other terms
    pub additional_terms: Option<AdditionalTerms>,
}

/// A validated SAFE.
///
/// `investmentAmount > 0`, `0 <= discount <= 100`, and the conversion type and
/// side letters come from their closed sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SafeInvestmentCandidate")]
pub struct SafeInvestment {
    investor_name: String,
    investment_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    valuation_cap: Option<f64>,
    discount: f64,
    conversion_type: ConversionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_executed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    side_letters: Option<BTreeSet<SideLetter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    additional_terms: Option<AdditionalTerms>,
}

impl SafeInvestment {
    pub fn investor_name(&self) -> &str {
        &self.investor_name
    }

    pub fn investment_amount(&self) -> f64 {
        self.investment_amount
    }

    pub fn valuation_cap(&self) -> Option<f64> {
        self.valuation_cap
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn conversion_type(&self) -> ConversionType {
        self.conversion_type
    }

    pub fn date_executed(&self) -> Option<&str> {
        self.date_executed.as_deref()
    }

    pub fn side_letters(&self) -> Option<&BTreeSet<SideLetter>> {
        self.side_letters.as_ref()
    }

    pub fn additional_terms(&self) -> Option<&AdditionalTerms> {
        self.additional_terms.as_ref()
    }
}

impl TryFrom<SafeInvestmentCandidate> for SafeInvestment {
    type Error = SchemaViolation;

    fn try_from(candidate: SafeInvestmentCandidate) -> SchemaResult<Self> {
        let side_letters = candidate
            .side_letters
            .map(|letters| {
                letters
                    .iter()
                    .enumerate()
                    .map(|(i, raw)| SideLetter::parse_field(&format!("sideLetters[{}]", i), raw))
                    .collect::<SchemaResult<BTreeSet<_>>>()
            })
            .transpose()?;

        Ok(Self {
            investor_name: non_empty("investorName", candidate.investor_name)?,
            investment_amount: positive_amount("investmentAmount", candidate.investment_amount)?,
            valuation_cap: candidate
                .valuation_cap
                .map(|cap| finite("valuationCap", cap))
                .transpose()?,
            discount: percentage("discount", candidate.discount.unwrap_or(0.0))?,
            conversion_type: ConversionType::parse_field(
                "conversionType",
                &candidate.conversion_type,
            )?,
            date_executed: candidate.date_executed,
            side_letters,
            additional_terms: candidate.additional_terms,
        })
    }
}
