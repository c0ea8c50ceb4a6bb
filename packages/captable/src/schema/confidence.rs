//! Extraction confidence scores.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{percentage, ClosedSet};
use crate::error::{SchemaResult, SchemaViolation};

/// The fixed set of extraction tasks. Also the keys of the confidence details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskKind {
    Safes,
    CommonStock,
    Options,
    PricedRounds,
}

impl TaskKind {
    /// Every task the orchestrator runs, in a stable order.
    pub const ALL: [TaskKind; 4] = [
        TaskKind::Safes,
        TaskKind::CommonStock,
        TaskKind::Options,
        TaskKind::PricedRounds,
    ];

    /// Wire name, as used for confidence detail keys.
    pub fn as_str(&self) -> &'static str {
        <Self as ClosedSet>::as_str(self)
    }

    /// What the task extracts, in words (used in notes).
    pub fn subject(&self) -> &'static str {
        match self {
            TaskKind::Safes => "SAFEs",
            TaskKind::CommonStock => "stockholders",
            TaskKind::Options => "options pool",
            TaskKind::PricedRounds => "priced rounds",
        }
    }
}

impl ClosedSet for TaskKind {
    const ALL: &'static [Self] = &TaskKind::ALL;

    fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Safes => "safes",
            TaskKind::CommonStock => "commonStock",
            TaskKind::Options => "options",
            TaskKind::PricedRounds => "pricedRounds",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence as it appears in an external document.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfidenceCandidate {
    pub overall: f64,
    pub details: BTreeMap<String, f64>,
}

/// Overall confidence plus one score per task, all in `0..=100`.
///
/// The detail keys are exactly [`TaskKind::ALL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExtractionConfidenceCandidate")]
pub struct ExtractionConfidence {
    overall: f64,
    details: BTreeMap<TaskKind, f64>,
}

impl ExtractionConfidence {
    /// Build from per-task scores; the overall score is their unweighted mean.
    pub fn from_scores(details: BTreeMap<TaskKind, f64>) -> SchemaResult<Self> {
        let overall = if details.is_empty() {
            0.0
        } else {
            details.values().sum::<f64>() / details.len() as f64
        };
        Self::new(overall, details)
    }

    pub fn new(overall: f64, details: BTreeMap<TaskKind, f64>) -> SchemaResult<Self> {
        let overall = percentage("overall", overall)?;

        for kind in TaskKind::ALL {
            let score = details.get(&kind).copied().ok_or_else(|| {
                SchemaViolation::new(format!("details.{}", kind), "missing task score")
            })?;
            percentage(&format!("details.{}", kind), score)?;
        }
        if details.len() != TaskKind::ALL.len() {
            return Err(SchemaViolation::new(
                "details",
                "keys must be exactly safes, commonStock, options, pricedRounds",
            ));
        }

        Ok(Self { overall, details })
    }

    pub fn overall(&self) -> f64 {
        self.overall
    }

    pub fn details(&self) -> &BTreeMap<TaskKind, f64> {
        &self.details
    }

    pub fn score(&self, kind: TaskKind) -> f64 {
        self.details.get(&kind).copied().unwrap_or(0.0)
    }
}

impl TryFrom<ExtractionConfidenceCandidate> for ExtractionConfidence {
    type Error = SchemaViolation;

    fn try_from(candidate: ExtractionConfidenceCandidate) -> SchemaResult<Self> {
        let details = candidate
            .details
            .into_iter()
            .map(|(key, score)| {
                TaskKind::parse_field("details", &key)
                    .map(|kind| (kind, score))
            })
            .collect::<SchemaResult<BTreeMap<_, _>>>()?;
        Self::new(candidate.overall, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scores(values: [f64; 4]) -> BTreeMap<TaskKind, f64> {
        TaskKind::ALL.into_iter().zip(values).collect()
    }

    #[test]
    fn test_overall_is_unweighted_mean() {
        let confidence = ExtractionConfidence::from_scores(scores([0.0, 90.0, 90.0, 90.0])).unwrap();
        assert_eq!(confidence.overall(), 67.5);
        assert_eq!(confidence.score(TaskKind::Safes), 0.0);
    }

    #[test]
    fn test_missing_task_is_rejected() {
        let mut details = scores([90.0; 4]);
        details.remove(&TaskKind::Options);
        let err = ExtractionConfidence::from_scores(details).unwrap_err();
        assert_eq!(err.field, "details.options");
    }

    #[test]
    fn test_scores_are_bounded() {
        let err = ExtractionConfidence::from_scores(scores([90.0, 90.0, 190.0, 90.0])).unwrap_err();
        assert_eq!(err.field, "overall");

        let err = ExtractionConfidence::new(50.0, scores([90.0, -1.0, 50.0, 50.0])).unwrap_err();
        assert_eq!(err.field, "details.commonStock");
    }

    #[test]
    fn test_wire_form_uses_task_names() {
        let confidence = ExtractionConfidence::from_scores(scores([90.0, 90.0, 50.0, 0.0])).unwrap();
        assert_eq!(
            serde_json::to_value(&confidence).unwrap(),
            json!({
                "overall": 57.5,
                "details": {
                    "safes": 90.0,
                    "commonStock": 90.0,
                    "options": 50.0,
                    "pricedRounds": 0.0
                }
            })
        );
    }

    #[test]
    fn test_deserialize_rejects_unknown_task() {
        let err = serde_json::from_value::<ExtractionConfidence>(json!({
            "overall": 80,
            "details": { "safes": 80, "commonStock": 80, "options": 80, "warrants": 80 }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("warrants"));
    }
}
