//! Common stock holdings and the option pool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{non_empty, non_negative_count, optional_percentage, positive_count, VestingSchedule};
use crate::error::{SchemaResult, SchemaViolation};

// =============================================================================
// Common stock
// =============================================================================

/// A common stockholder as extracted (founder, employee with exercised shares).
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommonStockHolderCandidate {
    /// Full name of the holder
    pub holder_name: String,

    /// Number of common shares held
    pub shares: i64,

    /// Vesting terms attached to the shares, if any
    pub vesting_schedule: Option<VestingSchedule>,

    /// Anything else worth keeping about this holder
    pub notes: Option<String>,
}

/// A validated common stockholder. `shares > 0` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CommonStockHolderCandidate")]
pub struct CommonStockHolder {
    holder_name: String,
    shares: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    vesting_schedule: Option<VestingSchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl CommonStockHolder {
    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn shares(&self) -> u64 {
        self.shares
    }

    pub fn vesting_schedule(&self) -> Option<&VestingSchedule> {
        self.vesting_schedule.as_ref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

impl TryFrom<CommonStockHolderCandidate> for CommonStockHolder {
    type Error = SchemaViolation;

    fn try_from(candidate: CommonStockHolderCandidate) -> SchemaResult<Self> {
        Ok(Self {
            holder_name: non_empty("holderName", candidate.holder_name)?,
            shares: positive_count("shares", candidate.shares)?,
            vesting_schedule: candidate.vesting_schedule,
            notes: candidate.notes,
        })
    }
}

// =============================================================================
// Option pool
// =============================================================================

/// The option pool as extracted.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionsPoolCandidate {
    /// Options already granted
    pub issued: i64,

    /// Options reserved but not yet granted
    pub unissued: i64,

    /// Target pool size as a post-money percentage (0-100)
    pub target_pool_percentage: Option<f64>,

    /// Vesting terms applied to grants by default
    pub vesting_defaults: Option<VestingSchedule>,
}

/// A validated option pool. Exactly one exists per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "OptionsPoolCandidate")]
pub struct OptionsPool {
    issued: u64,
    unissued: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_pool_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vesting_defaults: Option<VestingSchedule>,
}

impl OptionsPool {
    /// Target pool percentage used when nothing could be extracted.
    pub const FALLBACK_TARGET_PERCENTAGE: f64 = 10.0;

    /// The pool reported when extraction fails or finds nothing:
    /// nothing issued, nothing reserved, a 10% target.
    pub fn fallback() -> Self {
        Self {
            issued: 0,
            unissued: 0,
            target_pool_percentage: Some(Self::FALLBACK_TARGET_PERCENTAGE),
            vesting_defaults: None,
        }
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }

    pub fn unissued(&self) -> u64 {
        self.unissued
    }

    /// Total size of the pool (issued + unissued).
    pub fn total(&self) -> u64 {
        self.issued.saturating_add(self.unissued)
    }

    pub fn target_pool_percentage(&self) -> Option<f64> {
        self.target_pool_percentage
    }

    pub fn vesting_defaults(&self) -> Option<&VestingSchedule> {
        self.vesting_defaults.as_ref()
    }
}

impl TryFrom<OptionsPoolCandidate> for OptionsPool {
    type Error = SchemaViolation;

    fn try_from(candidate: OptionsPoolCandidate) -> SchemaResult<Self> {
        Ok(Self {
            issued: non_negative_count("issued", candidate.issued)?,
            unissued: non_negative_count("unissued", candidate.unissued)?,
            target_pool_percentage: optional_percentage(
                "targetPoolPercentage",
                candidate.target_pool_percentage,
            )?,
            vesting_defaults: candidate.vesting_defaults,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn holder(shares: i64) -> CommonStockHolderCandidate {
        CommonStockHolderCandidate {
            holder_name: "John Founder".into(),
            shares,
            vesting_schedule: None,
            notes: None,
        }
    }

    #[test]
    fn test_holder_requires_positive_shares() {
        assert_eq!(CommonStockHolder::try_from(holder(4_500_000)).unwrap().shares(), 4_500_000);

        for shares in [0, -1, i64::MIN] {
            let err = CommonStockHolder::try_from(holder(shares)).unwrap_err();
            assert_eq!(err.field, "shares");
        }
    }

    #[test]
    fn test_holder_requires_name() {
        let mut candidate = holder(10);
        candidate.holder_name = " ".into();
        let err = CommonStockHolder::try_from(candidate).unwrap_err();
        assert_eq!(err.field, "holderName");
    }

    #[test]
    fn test_holder_deserialize_rechecks_invariants() {
        let ok: CommonStockHolder = serde_json::from_value(json!({
            "holderName": "Jane",
            "shares": 100,
            "vestingSchedule": { "cliff": "12 months" }
        }))
        .unwrap();
        assert_eq!(ok.vesting_schedule().unwrap().cliff.as_deref(), Some("12 months"));

        let err = serde_json::from_value::<CommonStockHolder>(json!({
            "holderName": "Jane",
            "shares": 0
        }))
        .unwrap_err();
        assert!(err.to_string().contains("shares"));
    }

    #[test]
    fn test_fallback_pool_serialization() {
        let json = serde_json::to_value(OptionsPool::fallback()).unwrap();
        assert_eq!(
            json,
            json!({ "issued": 0, "unissued": 0, "targetPoolPercentage": 10.0 })
        );
    }

    #[test]
    fn test_pool_rejects_negative_counts_and_bad_percentage() {
        let candidate = OptionsPoolCandidate {
            issued: -1,
            unissued: 0,
            target_pool_percentage: None,
            vesting_defaults: None,
        };
        assert_eq!(OptionsPool::try_from(candidate).unwrap_err().field, "issued");

        let candidate = OptionsPoolCandidate {
            issued: 250_000,
            unissued: 750_000,
            target_pool_percentage: Some(120.0),
            vesting_defaults: None,
        };
        assert_eq!(
            OptionsPool::try_from(candidate).unwrap_err().field,
            "targetPoolPercentage"
        );
    }

    #[test]
    fn test_pool_total() {
        let pool = OptionsPool::try_from(OptionsPoolCandidate {
            issued: 250_000,
            unissued: 750_000,
            target_pool_percentage: Some(10.0),
            vesting_defaults: None,
        })
        .unwrap();
        assert_eq!(pool.total(), 1_000_000);
    }
}
