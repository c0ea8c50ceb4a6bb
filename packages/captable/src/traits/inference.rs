//! Inference trait for text-to-structure calls.
//!
//! The inference capability is the only long-latency, unreliable dependency of
//! the pipeline. Given an instruction block, a target JSON schema and the
//! document text, it returns a best-effort JSON value or fails.
//!
//! Implementations must be shareable across concurrently running tasks; they
//! are built once and passed by reference, never mutated by a task.

use async_trait::async_trait;

use crate::error::InferenceError;
use crate::schema::TaskKind;

/// One call into the inference capability.
#[derive(Debug, Clone, Copy)]
pub struct InferenceRequest<'a> {
    /// Which extraction task is asking (for routing, logging and test doubles)
    pub task: TaskKind,

    /// Task-specific instructions and domain heuristics
    pub instructions: &'a str,

    /// JSON schema the answer must conform to (always an object at the root)
    pub schema: &'a serde_json::Value,

    /// The full document text
    pub input: &'a str,
}

/// Inference trait for structured extraction.
///
/// No determinism or idempotence is assumed across repeated calls.
#[async_trait]
pub trait Inference: Send + Sync {
    /// Produce a JSON value conforming to `request.schema`.
    async fn infer(&self, request: InferenceRequest<'_>) -> Result<serde_json::Value, InferenceError>;
}

#[async_trait]
impl<T: Inference + ?Sized> Inference for std::sync::Arc<T> {
    async fn infer(&self, request: InferenceRequest<'_>) -> Result<serde_json::Value, InferenceError> {
        (**self).infer(request).await
    }
}
