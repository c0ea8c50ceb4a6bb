//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the cap table library
//! without making real inference calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{InferenceError, PreprocessError};
use crate::schema::TaskKind;
use crate::traits::{DocumentPreprocessor, Inference, InferenceRequest};

/// A mock inference capability for testing.
///
/// Returns configured JSON per task kind. Tasks without a configured response
/// get an empty answer of the right shape (`{"items": []}` or `{"value": null}`).
#[derive(Default, Clone)]
pub struct MockInference {
    /// Predefined answers by task
    responses: Arc<RwLock<HashMap<TaskKind, serde_json::Value>>>,

    /// Tasks that fail, with the error message
    failures: Arc<RwLock<HashMap<TaskKind, String>>>,

    /// Artificial latency by task
    delays: Arc<RwLock<HashMap<TaskKind, Duration>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockInferenceCall>>>,
}

/// Record of a call made to the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct MockInferenceCall {
    pub task: TaskKind,
    pub input_len: usize,
    pub schema: serde_json::Value,
}

impl MockInference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `task` with `answer`.
    pub fn with_response(self, task: TaskKind, answer: serde_json::Value) -> Self {
        self.responses.write().unwrap().insert(task, answer);
        self
    }

    /// Make `task` fail with an API error carrying `message`.
    pub fn with_failure(self, task: TaskKind, message: impl Into<String>) -> Self {
        self.failures.write().unwrap().insert(task, message.into());
        self
    }

    /// Delay the answer to `task`.
    pub fn with_delay(self, task: TaskKind, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(task, delay);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockInferenceCall> {
        self.calls.read().unwrap().clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    fn empty_answer(task: TaskKind) -> serde_json::Value {
        match task {
            TaskKind::Options => serde_json::json!({ "value": null }),
            _ => serde_json::json!({ "items": [] }),
        }
    }
}

#[async_trait]
impl Inference for MockInference {
    async fn infer(&self, request: InferenceRequest<'_>) -> Result<serde_json::Value, InferenceError> {
        self.calls.write().unwrap().push(MockInferenceCall {
            task: request.task,
            input_len: request.input.len(),
            schema: request.schema.clone(),
        });

        let delay = self.delays.read().unwrap().get(&request.task).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failures.read().unwrap().get(&request.task) {
            return Err(InferenceError::Api(message.clone()));
        }

        Ok(self
            .responses
            .read()
            .unwrap()
            .get(&request.task)
            .cloned()
            .unwrap_or_else(|| Self::empty_answer(request.task)))
    }
}

/// A preprocessor that returns fixed text, or fails when built with [`MockPreprocessor::unreadable`].
#[derive(Debug, Clone, Default)]
pub struct MockPreprocessor {
    text: Option<String>,
}

impl MockPreprocessor {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn unreadable() -> Self {
        Self { text: None }
    }
}

impl DocumentPreprocessor for MockPreprocessor {
    fn extract_text(&self, _bytes: &[u8]) -> Result<String, PreprocessError> {
        self.text
            .clone()
            .ok_or_else(|| PreprocessError::Unreadable("mock document is unreadable".into()))
    }
}
