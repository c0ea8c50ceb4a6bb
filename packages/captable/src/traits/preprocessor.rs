//! Document preprocessor trait.

use crate::error::PreprocessError;

/// Turns a binary document into plain text.
///
/// Pages are concatenated with a blank line between them. A document with no
/// extractable text yields an empty string, not an error; errors are reserved
/// for bytes that are not a readable document at all.
pub trait DocumentPreprocessor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, PreprocessError>;
}
