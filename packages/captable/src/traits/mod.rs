//! Core trait abstractions for the extraction pipeline.

pub mod inference;
pub mod preprocessor;

pub use inference::{Inference, InferenceRequest};
pub use preprocessor::DocumentPreprocessor;
