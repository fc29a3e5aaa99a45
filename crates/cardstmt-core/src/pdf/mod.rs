//! PDF processing module.
//!
//! Statements enter the core as page-ordered text through the
//! [`PageTextProvider`] trait; [`PdfFileProvider`] is the implementation
//! backed by lopdf and pdf-extract.

mod extractor;

pub use extractor::{PdfContent, PdfExtractor, PdfFileProvider, PdfPage};

use crate::error::PdfError;

/// Minimum characters of text for a document to count as text-bearing.
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 50;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// Contains only images (scanned document).
    Image,
    /// Contains both text and images.
    Hybrid,
    /// Empty or unreadable.
    Empty,
}

impl PdfType {
    /// Classify from total text length and image count.
    pub fn classify(text_len: usize, images: usize, min_text_length: usize) -> Self {
        match (text_len >= min_text_length, images > 0) {
            (true, false) => PdfType::Text,
            (false, true) => PdfType::Image,
            (true, true) => PdfType::Hybrid,
            (false, false) => PdfType::Empty,
        }
    }

    pub fn has_text(&self) -> bool {
        matches!(self, PdfType::Text | PdfType::Hybrid)
    }
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes, decrypting it if needed.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Analyze the PDF to determine its type.
    fn analyze(&self) -> PdfType;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Extract text from every page, in page order.
    fn extract_pages(&self) -> Result<Vec<String>>;
}

/// Source of page-ordered document text.
///
/// Implementations are shared across batch worker threads.
pub trait PageTextProvider: Sync {
    /// Return the text of each page of the referenced document.
    fn page_texts(&self, source_reference: &str) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(PdfType::classify(120, 0, 50), PdfType::Text);
        assert_eq!(PdfType::classify(3, 2, 50), PdfType::Image);
        assert_eq!(PdfType::classify(120, 1, 50), PdfType::Hybrid);
        assert_eq!(PdfType::classify(0, 0, 50), PdfType::Empty);
        assert!(!PdfType::classify(49, 0, 50).has_text());
    }
}
