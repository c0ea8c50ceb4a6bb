//! Cap Table Extraction Library
//!
//! Turns the text of legal and financial documents (SAFE agreements, stock
//! purchase agreements, board consents, term sheets) into a normalized,
//! confidence-scored cap table import document.
//!
//! # Design
//!
//! - Four independent extraction tasks: SAFEs, common stockholders, the option
//!   pool and priced rounds
//! - Each task calls a black-box [`Inference`] capability with instructions and a
//!   target JSON schema; the answer is validated into immutable entities
//! - A failed task lowers confidence and leaves a note; it never fails the run
//! - The option pool always has a value: a failed task falls back to
//!   `{ issued: 0, unissued: 0, targetPoolPercentage: 10 }`
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use captable::{Extractor, ExtractorConfig, review};
//! use captable::ai::OpenAIInference;
//!
//! let extractor = Extractor::new(Arc::new(OpenAIInference::from_env()?))
//!     .with_config(ExtractorConfig::new().with_task_timeout(Duration::from_secs(60)));
//!
//! let document = extractor.extract_from_text(&text, Some("Acme, Inc.")).await?;
//! let findings = review(&document);
//! ```
//!
//! # Modules
//!
//! - [`schema`] - Validated cap table entities
//! - [`traits`] - The inference and document preprocessing seams
//! - [`tasks`] - The four extraction tasks
//! - [`orchestrator`] - Runs the tasks and assembles the document
//! - [`review`] - Import findings for an assembled document
//! - [`preprocess`] - PDF text extraction
//! - [`ai`] - OpenAI binding (feature `openai`)
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod error;
pub mod orchestrator;
pub mod preprocess;
pub mod review;
pub mod schema;
pub mod tasks;
pub mod testing;
pub mod traits;

pub use error::{
    ExtractError, InferenceError, PreprocessError, Result, SchemaResult, SchemaViolation,
    TaskFailure,
};
pub use orchestrator::{Extractor, ExtractorConfig, DEFAULT_TASK_TIMEOUT};
pub use preprocess::PdfTextPreprocessor;
pub use review::{review, ImportReview, ReviewFinding, ReviewSummary, Severity};
pub use schema::{
    AdditionalTerms, CapTable, CapTableImportDocument, CommonStockHolder, ConversionType,
    ExtractionConfidence, ImportMetadata, ImportSource, OptionsPool, ParticipationRights,
    PricedRound, SafeInvestment, SchemaVersion, SeriesInvestor, SideLetter, TaskKind,
    VestingSchedule,
};
pub use tasks::{ExtractionTask, Extracted, TaskOutcome};
pub use traits::{DocumentPreprocessor, Inference, InferenceRequest};
