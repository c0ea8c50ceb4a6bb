//! Inference implementations.
//!
//! This module provides a reference implementation of the [`Inference`](crate::Inference)
//! trait. Users can use it directly or implement their own.

#[cfg(feature = "openai")]
mod openai;
pub mod strict_schema;

#[cfg(feature = "openai")]
pub use openai::{OpenAIInference, DEFAULT_MODEL};
pub use strict_schema::to_strict_schema;
