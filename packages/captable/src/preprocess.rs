//! PDF text extraction.

use tracing::debug;

use crate::error::PreprocessError;
use crate::traits::DocumentPreprocessor;

/// Separator placed between the text of consecutive pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Extracts the embedded text layer of digital PDFs using `pdf-extract`.
///
/// Scanned PDFs without a text layer produce an empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextPreprocessor;

impl PdfTextPreprocessor {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentPreprocessor for PdfTextPreprocessor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, PreprocessError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| PreprocessError::Unreadable(e.to_string()))?;

        let page_count = pages.len();
        let text = join_pages(pages);

        debug!(
            page_count = page_count,
            text_len = text.len(),
            "Extracted text from PDF"
        );

        Ok(text)
    }
}

/// Join page texts with a blank line, dropping pages with no text.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .filter_map(|page| {
            let page = page.as_ref().trim();
            (!page.is_empty()).then(|| page.to_string())
        })
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}
