//! Typed errors for the cap table library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell an
//! ordinary extraction shortfall apart from an internal defect.

use std::time::Duration;

use thiserror::Error;

/// A structured value failed one of its invariants.
///
/// Always fatal to constructing that one entity; values are never coerced.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("schema violation at `{field}`: {rule}")]
pub struct SchemaViolation {
    /// Dotted path of the offending field (e.g. `investors[1].investmentAmount`)
    pub field: String,

    /// The rule that was violated
    pub rule: String,
}

impl SchemaViolation {
    pub fn new(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
        }
    }

    /// Prefix the field path with the enclosing field.
    pub fn within(mut self, parent: impl AsRef<str>) -> Self {
        self.field = format!("{}.{}", parent.as_ref(), self.field);
        self
    }

    /// Prefix the field path with an indexed enclosing field.
    pub fn at_index(self, parent: &str, index: usize) -> Self {
        self.within(format!("{}[{}]", parent, index))
    }
}

/// Errors raised by an inference capability binding.
///
/// The core treats these as opaque: any of them turns into a task failure.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Configuration error (missing API key, invalid settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, reset)
    #[error("network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, refusal)
    #[error("API error: {0}")]
    Api(String),

    /// Parse error (response was not the JSON we asked for)
    #[error("parse error: {0}")]
    Parse(String),
}

/// Why a single extraction task produced no structured value.
#[derive(Debug, Error)]
pub enum TaskFailure {
    /// The inference call errored
    #[error("{0}")]
    Inference(#[from] InferenceError),

    /// The inference call did not finish within the task timeout
    #[error("timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),

    /// The target schema could not be encoded as JSON
    #[error("target schema could not be encoded: {0}")]
    SchemaEncoding(#[source] serde_json::Error),

    /// The returned JSON did not match the target shape
    #[error("response did not match the target shape: {0}")]
    Decode(#[from] serde_json::Error),

    /// The returned value broke an entity invariant
    #[error("{0}")]
    Schema(#[from] SchemaViolation),
}

/// Errors surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The merged task outcomes could not be assembled into a valid document.
    ///
    /// Unreachable while the fallback and absence rules hold; treat as an internal error.
    #[error("assembly defect: {0}")]
    AssemblyDefect(#[source] SchemaViolation),

    /// The document bytes could not be turned into text
    #[error("preprocess error: {0}")]
    Preprocess(#[from] PreprocessError),
}

/// Errors from turning a binary document into text.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// The bytes are not a document we can read
    #[error("unreadable document: {0}")]
    Unreadable(String),
}

/// Result type alias for schema construction.
pub type SchemaResult<T> = std::result::Result<T, SchemaViolation>;

/// Result type alias for orchestrator operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
