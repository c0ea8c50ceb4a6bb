//! Orchestration of the four extraction tasks into one import document.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{ExtractError, PreprocessError, Result};
use crate::preprocess::PdfTextPreprocessor;
use crate::schema::{
    CapTable, CapTableImportDocument, CommonStockHolder, ExtractionConfidence, ImportMetadata,
    ImportSource, OptionsPool, PricedRound, SafeInvestment, SchemaVersion, TaskKind,
};
use crate::tasks::{standard_tasks, Extracted, ExtractionTask, TaskOutcome};
use crate::traits::{DocumentPreprocessor, Inference};

/// Default per-task time limit for one inference call.
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for an [`Extractor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Time limit applied to each task independently.
    ///
    /// A task that exceeds it is recorded as failed; siblings keep running.
    /// `None` waits as long as the inference capability takes.
    pub task_timeout: Option<Duration>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            task_timeout: Some(DEFAULT_TASK_TIMEOUT),
        }
    }
}

impl ExtractorConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-task timeout.
    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = Some(timeout);
        self
    }

    /// Let tasks run without a time limit.
    pub fn without_timeout(mut self) -> Self {
        self.task_timeout = None;
        self
    }
}

/// Runs every extraction task against a document and assembles the result.
///
/// Holds no per-run state, so one extractor can serve concurrent runs.
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use captable::{Extractor, testing::MockInference};
///
/// let extractor = Extractor::new(Arc::new(MockInference::new()));
/// let document = extractor.extract_from_text(text, Some("Acme, Inc.")).await?;
/// ```
#[derive(Clone)]
pub struct Extractor {
    inference: Arc<dyn Inference>,
    preprocessor: Arc<dyn DocumentPreprocessor>,
    tasks: [ExtractionTask; 4],
    config: ExtractorConfig,
}

impl Extractor {
    /// Create an extractor that reads PDFs and uses the default config.
    pub fn new(inference: Arc<dyn Inference>) -> Self {
        Self {
            inference,
            preprocessor: Arc::new(PdfTextPreprocessor::new()),
            tasks: standard_tasks(),
            config: ExtractorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the document preprocessor.
    pub fn with_preprocessor(mut self, preprocessor: Arc<dyn DocumentPreprocessor>) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Turn a binary document into text, then extract from the text.
    ///
    /// Only unreadable bytes fail here; a document without a text layer
    /// still produces a (low confidence) import document. Parsing runs on the
    /// blocking pool, and a parser panic counts as an unreadable document.
    pub async fn extract_from_document(
        &self,
        bytes: &[u8],
        company_name: Option<&str>,
    ) -> Result<CapTableImportDocument> {
        let preprocessor = Arc::clone(&self.preprocessor);
        let bytes = bytes.to_vec();
        let text = tokio::task::spawn_blocking(move || preprocessor.extract_text(&bytes))
            .await
            .map_err(|e| PreprocessError::Unreadable(format!("text extraction aborted: {}", e)))??;

        self.extract_from_text(&text, company_name).await
    }

    /// Extract a cap table from document text.
    ///
    /// Task failures never surface as errors: they lower the confidence and
    /// add a note. The only error is an assembled document that breaks a
    /// schema invariant, which indicates a bug.
    #[instrument(
        name = "extraction_run",
        skip(self, text, company_name),
        fields(run_id = %Uuid::new_v4(), text_len = text.len())
    )]
    pub async fn extract_from_text(
        &self,
        text: &str,
        company_name: Option<&str>,
    ) -> Result<CapTableImportDocument> {
        let start = Instant::now();
        let timeout = self.config.task_timeout;

        let outcomes = join_all(
            self.tasks
                .iter()
                .map(|task| task.run(self.inference.as_ref(), text, timeout)),
        )
        .await;

        let document = assemble(outcomes, company_name)?;

        let confidence = document
            .metadata()
            .extraction_confidence()
            .map(ExtractionConfidence::overall)
            .unwrap_or_default();
        info!(
            confidence = confidence,
            failed_tasks = document.extraction_notes().map_or(0, <[String]>::len),
            duration_ms = start.elapsed().as_millis() as u64,
            "Extraction run complete"
        );

        Ok(document)
    }
}

/// The slots of the cap table body, filled one task at a time.
#[derive(Default)]
struct Slots {
    safes: Vec<SafeInvestment>,
    common_stock: Vec<CommonStockHolder>,
    options: Option<OptionsPool>,
    priced_rounds: Vec<PricedRound>,
}

impl Slots {
    fn fill(&mut self, value: Extracted) {
        match value {
            Extracted::Safes(safes) => self.safes = safes,
            Extracted::CommonStock(holders) => self.common_stock = holders,
            Extracted::Options(pool) => self.options = pool,
            Extracted::PricedRounds(rounds) => self.priced_rounds = rounds,
        }
    }
}

/// Merge task outcomes into a document stamped with the current time.
fn assemble(outcomes: Vec<TaskOutcome>, company_name: Option<&str>) -> Result<CapTableImportDocument> {
    let mut scores = BTreeMap::new();
    let mut notes = Vec::new();
    let mut slots = Slots::default();

    for outcome in outcomes {
        let kind = match &outcome {
            TaskOutcome::Success { value, .. } => value.kind(),
            TaskOutcome::Failure { kind, .. } => *kind,
        };
        scores.insert(kind, outcome.confidence());
        if let Some(note) = outcome.note() {
            notes.push(note.to_string());
        }
        if let Some(value) = outcome.into_value() {
            slots.fill(value);
        }
    }

    for kind in TaskKind::ALL {
        if !scores.contains_key(&kind) {
            warn!(task = %kind, "No outcome recorded for task");
        }
    }

    let confidence =
        ExtractionConfidence::from_scores(scores).map_err(ExtractError::AssemblyDefect)?;

    let cap_table = CapTable::new(
        slots.common_stock,
        slots.options.unwrap_or_else(OptionsPool::fallback),
        slots.safes,
        (!slots.priced_rounds.is_empty()).then_some(slots.priced_rounds),
        None,
    );

    let metadata = ImportMetadata::new(
        company_hint(company_name),
        Utc::now(),
        ImportSource::Documents,
        Some(confidence),
    );

    CapTableImportDocument::new(
        SchemaVersion::V1_0,
        metadata,
        cap_table,
        (!notes.is_empty()).then_some(notes),
    )
    .map_err(ExtractError::AssemblyDefect)
}

/// Blank hints count as no hint.
fn company_hint(company_name: Option<&str>) -> Option<String> {
    company_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
