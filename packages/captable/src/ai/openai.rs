//! OpenAI implementation of the Inference trait.
//!
//! Uses chat completions with strict JSON-schema structured outputs.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use captable::{ai::OpenAIInference, Extractor};
//!
//! let inference = OpenAIInference::from_env()?.with_model("gpt-4.1");
//! let extractor = Extractor::new(Arc::new(inference));
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::strict_schema::to_strict_schema;
use crate::error::InferenceError;
use crate::traits::{Inference, InferenceRequest};

/// Chat model used unless [`OpenAIInference::with_model`] says otherwise.
pub const DEFAULT_MODEL: &str = "gpt-4.1";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-backed inference.
#[derive(Clone)]
pub struct OpenAIInference {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for OpenAIInference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIInference")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAIInference {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self, InferenceError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| InferenceError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: gpt-4.1).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(&self, request: &InferenceRequest<'_>) -> StructuredRequest {
        StructuredRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.instructions.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.input.to_string(),
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: format!("{}_extraction", request.task.as_str()),
                    strict: true,
                    schema: to_strict_schema(request.schema),
                },
            },
        }
    }
}

#[async_trait]
impl Inference for OpenAIInference {
    async fn infer(
        &self,
        request: InferenceRequest<'_>,
    ) -> Result<serde_json::Value, InferenceError> {
        let body = self.build_request(&request);

        debug!(
            task = %request.task,
            model = %self.model,
            input_len = request.input.len(),
            "Sending structured output request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api(format!(
                "OpenAI returned {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(e.to_string()))?;

        let message = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| InferenceError::Api("No response from OpenAI".into()))?;

        if let Some(refusal) = message.refusal {
            return Err(InferenceError::Api(format!("model refused: {}", refusal)));
        }

        let content = message
            .content
            .ok_or_else(|| InferenceError::Api("Empty response from OpenAI".into()))?;

        serde_json::from_str(&content).map_err(|e| InferenceError::Parse(e.to_string()))
    }
}

#[derive(Serialize)]
struct StructuredRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}
