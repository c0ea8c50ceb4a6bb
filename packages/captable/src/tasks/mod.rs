//! Extraction tasks.
//!
//! A task pairs an instruction block with a target result shape and runs it
//! through the shared inference capability. Running a task never fails: every
//! error is folded into a [`TaskOutcome::Failure`] so the orchestrator can keep
//! going with the other tasks.

pub mod prompts;

use std::time::{Duration, Instant};

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::TaskFailure;
use crate::schema::{
    each, CommonStockHolder, CommonStockHolderCandidate, OptionsPool, OptionsPoolCandidate,
    PricedRound, PricedRoundCandidate, SafeInvestment, SafeInvestmentCandidate, TaskKind,
};
use crate::traits::{Inference, InferenceRequest};

/// Confidence of a successful task that found something.
pub const CONFIDENCE_WITH_CONTENT: f64 = 90.0;

/// Confidence of a successful task that found nothing.
///
/// Lower than a result with content: an empty answer cannot tell "nothing
/// there" apart from "nothing matched".
pub const CONFIDENCE_EMPTY: f64 = 50.0;

/// Confidence of a failed task.
pub const CONFIDENCE_FAILED: f64 = 0.0;

// =============================================================================
// Result shapes
// =============================================================================

/// The shape of a task's result slot, fixed when the task is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// Zero or one object
    OptionalSingle,
    /// A possibly empty list of objects
    List,
}

/// Object root for list answers (structured outputs need an object at the root).
#[derive(Deserialize, JsonSchema)]
struct ListEnvelope<T> {
    /// Every item found in the document; empty when there are none
    items: Vec<T>,
}

/// Object root for optional single answers.
///
/// `value` must be present (null when there is none); an object without it
/// is not an empty answer.
#[derive(Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, bound(deserialize = "T: Deserialize<'de>"))]
struct SingleEnvelope<T> {
    /// The item found in the document, or null when there is none
    #[serde(deserialize_with = "Option::deserialize")]
    value: Option<T>,
}

/// Bare arrays are accepted too, for bindings that do not need an object root.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListAnswer<T> {
    Wrapped(ListEnvelope<T>),
    Bare(Vec<T>),
}

/// Same for single answers: a bare object is the item itself.
#[derive(Deserialize)]
#[serde(untagged)]
enum SingleAnswer<T> {
    Wrapped(SingleEnvelope<T>),
    Bare(T),
}

impl ResultShape {
    /// JSON schema of the envelope holding candidates of type `C`.
    fn schema_for<C: JsonSchema>(self) -> Result<serde_json::Value, TaskFailure> {
        let schema = match self {
            ResultShape::List => schema_for!(ListEnvelope<C>),
            ResultShape::OptionalSingle => schema_for!(SingleEnvelope<C>),
        };
        serde_json::to_value(schema).map_err(TaskFailure::SchemaEncoding)
    }

    /// Unwrap the envelope into zero or more candidates.
    fn unwrap<C: DeserializeOwned>(self, value: serde_json::Value) -> Result<Vec<C>, serde_json::Error> {
        match self {
            ResultShape::List => Ok(match serde_json::from_value::<ListAnswer<C>>(value)? {
                ListAnswer::Wrapped(envelope) => envelope.items,
                ListAnswer::Bare(items) => items,
            }),
            ResultShape::OptionalSingle => Ok(match serde_json::from_value::<SingleAnswer<C>>(value)? {
                SingleAnswer::Wrapped(envelope) => envelope.value.into_iter().collect(),
                SingleAnswer::Bare(item) => vec![item],
            }),
        }
    }
}

/// A task's structured value, tagged by the slot it fills.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Safes(Vec<SafeInvestment>),
    CommonStock(Vec<CommonStockHolder>),
    Options(Option<OptionsPool>),
    PricedRounds(Vec<PricedRound>),
}

impl Extracted {
    pub fn kind(&self) -> TaskKind {
        match self {
            Extracted::Safes(_) => TaskKind::Safes,
            Extracted::CommonStock(_) => TaskKind::CommonStock,
            Extracted::Options(_) => TaskKind::Options,
            Extracted::PricedRounds(_) => TaskKind::PricedRounds,
        }
    }

    /// Number of extracted items (0 or 1 for the single-object slot).
    pub fn len(&self) -> usize {
        match self {
            Extracted::Safes(v) => v.len(),
            Extracted::CommonStock(v) => v.len(),
            Extracted::Options(v) => usize::from(v.is_some()),
            Extracted::PricedRounds(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Task outcome
// =============================================================================

/// What running one task produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// The inference call succeeded and its answer validated.
    Success { value: Extracted, confidence: f64 },

    /// The task failed; `fallback` is the value to use in its place, if any.
    Failure {
        kind: TaskKind,
        note: String,
        fallback: Option<Extracted>,
    },
}

impl TaskOutcome {
    pub fn confidence(&self) -> f64 {
        match self {
            TaskOutcome::Success { confidence, .. } => *confidence,
            TaskOutcome::Failure { .. } => CONFIDENCE_FAILED,
        }
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            TaskOutcome::Success { .. } => None,
            TaskOutcome::Failure { note, .. } => Some(note),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failure { .. })
    }

    /// The structured value, or the fallback for a failed task.
    pub fn into_value(self) -> Option<Extracted> {
        match self {
            TaskOutcome::Success { value, .. } => Some(value),
            TaskOutcome::Failure { fallback, .. } => fallback,
        }
    }
}

// =============================================================================
// Extraction task
// =============================================================================

/// One independent extraction: instructions + result shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionTask {
    kind: TaskKind,
    instructions: &'static str,
    shape: ResultShape,
}

impl ExtractionTask {
    pub fn safes() -> Self {
        Self {
            kind: TaskKind::Safes,
            instructions: prompts::SAFE_INSTRUCTIONS,
            shape: ResultShape::List,
        }
    }

    pub fn common_stock() -> Self {
        Self {
            kind: TaskKind::CommonStock,
            instructions: prompts::COMMON_STOCK_INSTRUCTIONS,
            shape: ResultShape::List,
        }
    }

    pub fn options() -> Self {
        Self {
            kind: TaskKind::Options,
            instructions: prompts::OPTIONS_INSTRUCTIONS,
            shape: ResultShape::OptionalSingle,
        }
    }

    pub fn priced_rounds() -> Self {
        Self {
            kind: TaskKind::PricedRounds,
            instructions: prompts::PRICED_ROUND_INSTRUCTIONS,
            shape: ResultShape::List,
        }
    }

    pub fn for_kind(kind: TaskKind) -> Self {
        match kind {
            TaskKind::Safes => Self::safes(),
            TaskKind::CommonStock => Self::common_stock(),
            TaskKind::Options => Self::options(),
            TaskKind::PricedRounds => Self::priced_rounds(),
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn instructions(&self) -> &'static str {
        self.instructions
    }

    pub fn shape(&self) -> ResultShape {
        self.shape
    }

    /// Target schema sent to the inference capability.
    pub fn schema(&self) -> Result<serde_json::Value, TaskFailure> {
        match self.kind {
            TaskKind::Safes => self.shape.schema_for::<SafeInvestmentCandidate>(),
            TaskKind::CommonStock => self.shape.schema_for::<CommonStockHolderCandidate>(),
            TaskKind::Options => self.shape.schema_for::<OptionsPoolCandidate>(),
            TaskKind::PricedRounds => self.shape.schema_for::<PricedRoundCandidate>(),
        }
    }

    /// Run the task against the full document text.
    ///
    /// Never returns an error; failures (including a timeout) become a
    /// zero-confidence [`TaskOutcome::Failure`] carrying a note.
    pub async fn run(
        &self,
        inference: &dyn Inference,
        text: &str,
        timeout: Option<Duration>,
    ) -> TaskOutcome {
        let start = Instant::now();

        match self.try_run(inference, text, timeout).await {
            Ok(value) => {
                let confidence = if value.is_empty() {
                    CONFIDENCE_EMPTY
                } else {
                    CONFIDENCE_WITH_CONTENT
                };

                info!(
                    task = %self.kind,
                    items = value.len(),
                    confidence = confidence,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Extraction task complete"
                );

                TaskOutcome::Success { value, confidence }
            }
            Err(failure) => {
                warn!(
                    task = %self.kind,
                    error = %failure,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Extraction task failed"
                );

                self.failed(failure)
            }
        }
    }

    async fn try_run(
        &self,
        inference: &dyn Inference,
        text: &str,
        timeout: Option<Duration>,
    ) -> Result<Extracted, TaskFailure> {
        let schema = self.schema()?;
        let request = InferenceRequest {
            task: self.kind,
            instructions: self.instructions,
            schema: &schema,
            input: text,
        };

        debug!(task = %self.kind, text_len = text.len(), "Calling inference");

        let answer = match timeout {
            Some(limit) => tokio::time::timeout(limit, inference.infer(request))
                .await
                .map_err(|_| TaskFailure::TimedOut(limit))??,
            None => inference.infer(request).await?,
        };

        self.decode(answer)
    }

    /// Turn a raw answer into validated entities for this task's slot.
    pub fn decode(&self, answer: serde_json::Value) -> Result<Extracted, TaskFailure> {
        let extracted = match self.kind {
            TaskKind::Safes => Extracted::Safes(each(
                "safes",
                self.shape.unwrap::<SafeInvestmentCandidate>(answer)?,
                SafeInvestment::try_from,
            )?),
            TaskKind::CommonStock => Extracted::CommonStock(each(
                "commonStock",
                self.shape.unwrap::<CommonStockHolderCandidate>(answer)?,
                CommonStockHolder::try_from,
            )?),
            TaskKind::Options => Extracted::Options(
                self.shape
                    .unwrap::<OptionsPoolCandidate>(answer)?
                    .into_iter()
                    .next()
                    .map(OptionsPool::try_from)
                    .transpose()
                    .map_err(|e| e.within("options"))?,
            ),
            TaskKind::PricedRounds => Extracted::PricedRounds(each(
                "pricedRounds",
                self.shape.unwrap::<PricedRoundCandidate>(answer)?,
                PricedRound::try_from,
            )?),
        };
        Ok(extracted)
    }

    fn failed(&self, failure: TaskFailure) -> TaskOutcome {
        match self.kind {
            TaskKind::Options => TaskOutcome::Failure {
                kind: self.kind,
                note: format!(
                    "Failed to extract {}, using defaults: {}",
                    self.kind.subject(),
                    failure
                ),
                fallback: Some(Extracted::Options(Some(OptionsPool::fallback()))),
            },
            _ => TaskOutcome::Failure {
                kind: self.kind,
                note: format!("Failed to extract {}: {}", self.kind.subject(), failure),
                fallback: None,
            },
        }
    }
}

/// The four tasks every extraction run executes.
pub fn standard_tasks() -> [ExtractionTask; 4] {
    TaskKind::ALL.map(ExtractionTask::for_kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockInference;
    use serde_json::json;

    #[test]
    fn test_standard_tasks_cover_every_kind_once() {
        let kinds: Vec<TaskKind> = standard_tasks().iter().map(|t| t.kind()).collect();
        assert_eq!(kinds, TaskKind::ALL.to_vec());
        assert_eq!(ExtractionTask::options().shape(), ResultShape::OptionalSingle);
        assert_eq!(ExtractionTask::safes().shape(), ResultShape::List);
    }

    #[test]
    fn test_schema_has_object_root() {
        for task in standard_tasks() {
            let schema = task.schema().unwrap();
            assert_eq!(schema["type"], json!("object"), "{:?}", task.kind());
        }
        let list = ExtractionTask::safes().schema().unwrap();
        assert!(list["properties"]["items"].is_object());
        let single = ExtractionTask::options().schema().unwrap();
        assert!(single["properties"]["value"].is_object());
    }

    #[test]
    fn test_decode_accepts_bare_arrays() {
        let task = ExtractionTask::common_stock();
        let extracted = task
            .decode(json!([{ "holderName": "Jane", "shares": 10 }]))
            .unwrap();
        assert_eq!(extracted.len(), 1);
    }

    #[test]
    fn test_decode_reports_violation_path() {
        let task = ExtractionTask::common_stock();
        let err = task
            .decode(json!({ "items": [
                { "holderName": "Jane", "shares": 10 },
                { "holderName": "Joe", "shares": 0 }
            ]}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "schema violation at `commonStock[1].shares`: must be greater than 0 (got 0)"
        );
    }

    #[tokio::test]
    async fn test_success_confidence_depends_on_content() {
        let inference = MockInference::new()
            .with_response(TaskKind::Safes, json!({ "items": [] }))
            .with_response(
                TaskKind::CommonStock,
                json!({ "items": [{ "holderName": "Jane", "shares": 10 }] }),
            );

        let empty = ExtractionTask::safes().run(&inference, "text", None).await;
        assert_eq!(empty.confidence(), CONFIDENCE_EMPTY);
        assert!(empty.note().is_none());

        let full = ExtractionTask::common_stock().run(&inference, "text", None).await;
        assert_eq!(full.confidence(), CONFIDENCE_WITH_CONTENT);
    }

    #[tokio::test]
    async fn test_failure_is_folded_into_outcome() {
        let inference = MockInference::new().with_failure(TaskKind::Safes, "model overloaded");

        let outcome = ExtractionTask::safes().run(&inference, "text", None).await;
        assert!(outcome.is_failure());
        assert_eq!(outcome.confidence(), CONFIDENCE_FAILED);
        assert_eq!(
            outcome.note(),
            Some("Failed to extract SAFEs: API error: model overloaded")
        );
        assert_eq!(outcome.into_value(), None);
    }

    #[tokio::test]
    async fn test_options_failure_falls_back_to_default_pool() {
        let inference = MockInference::new().with_failure(TaskKind::Options, "boom");

        let outcome = ExtractionTask::options().run(&inference, "text", None).await;
        assert!(outcome.note().unwrap().contains("using defaults"));
        assert_eq!(
            outcome.into_value(),
            Some(Extracted::Options(Some(OptionsPool::fallback())))
        );
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure() {
        let inference = MockInference::new()
            .with_response(TaskKind::PricedRounds, json!({ "items": [] }))
            .with_delay(TaskKind::PricedRounds, Duration::from_millis(200));

        let outcome = ExtractionTask::priced_rounds()
            .run(&inference, "text", Some(Duration::from_millis(10)))
            .await;
        assert!(outcome.is_failure());
        assert!(outcome.note().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_a_failure() {
        let inference =
            MockInference::new().with_response(TaskKind::Options, json!({ "pool": "large" }));

        let outcome = ExtractionTask::options().run(&inference, "text", None).await;
        assert!(outcome.is_failure());
        assert!(outcome.note().unwrap().contains("did not match the target shape"));
        assert!(outcome.note().unwrap().contains("using defaults"));
        assert_eq!(
            outcome.into_value(),
            Some(Extracted::Options(Some(OptionsPool::fallback())))
        );
    }

    #[test]
    fn test_single_answer_requires_value_key() {
        let task = ExtractionTask::options();
        assert!(task.decode(json!({ "pool": "large" })).is_err());
        assert!(task.decode(json!({})).is_err());
        assert_eq!(task.decode(json!({ "value": null })).unwrap(), Extracted::Options(None));
    }

    #[tokio::test]
    async fn test_decode_accepts_bare_single_object() {
        let answer = json!({ "issued": 250000, "unissued": 750000, "targetPoolPercentage": 10.0 });
        let extracted = ExtractionTask::options().decode(answer.clone()).unwrap();
        let Extracted::Options(Some(pool)) = extracted else {
            panic!("expected a pool, got {:?}", extracted);
        };
        assert_eq!(pool.issued(), 250000);
        assert_eq!(pool.unissued(), 750000);

        let inference = MockInference::new().with_response(TaskKind::Options, answer);
        let outcome = ExtractionTask::options().run(&inference, "text", None).await;
        assert_eq!(outcome.confidence(), CONFIDENCE_WITH_CONTENT);
        assert!(outcome.note().is_none());
    }
}
