//! Vesting schedules.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Time-based rule governing when granted shares or options become owned.
///
/// Every field is optional; absence means "not specified", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VestingSchedule {
    /// Cliff period as written, e.g. "12 months"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cliff: Option<String>,

    /// Total vesting period as written, e.g. "48 months"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_vesting_period: Option<String>,

    /// Vesting start date (calendar date, e.g. "2023-01-01")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    /// Acceleration clauses, e.g. "double trigger on change of control"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration_clauses: Option<Vec<String>>,
}

impl VestingSchedule {
    /// True when no term of the schedule was specified.
    pub fn is_unspecified(&self) -> bool {
        self.cliff.is_none()
            && self.total_vesting_period.is_none()
            && self.start_date.is_none()
            && self.acceleration_clauses.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_are_omitted() {
        let schedule = VestingSchedule {
            cliff: Some("12 months".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json, serde_json::json!({ "cliff": "12 months" }));
        assert!(!schedule.is_unspecified());
        assert!(VestingSchedule::default().is_unspecified());
    }
}
