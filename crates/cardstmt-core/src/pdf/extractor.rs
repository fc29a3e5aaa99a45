//! PDF text extraction using lopdf and pdf-extract.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use lopdf::{Document, Object};
use tracing::{debug, trace, warn};

use super::{DEFAULT_MIN_TEXT_LENGTH, PageTextProvider, PdfProcessor, PdfType, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    password: Option<String>,
    min_text_length: usize,
}

/// Extracted content from a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Type of PDF content.
    pub pdf_type: PdfType,
    /// Pages with their content.
    pub pages: Vec<PdfPage>,
    /// Image XObjects found in the document.
    pub image_count: usize,
}

impl PdfContent {
    /// Page texts in page order.
    pub fn page_texts(&self) -> Vec<String> {
        self.pages.iter().map(|p| p.text.clone()).collect()
    }

    /// Total characters of extracted text.
    pub fn text_len(&self) -> usize {
        self.pages.iter().map(|p| p.text.trim().chars().count()).sum()
    }
}

/// Content from a single PDF page.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            password: None,
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
        }
    }

    /// Password tried after the empty password on encrypted documents.
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password.filter(|p| !p.is_empty());
        self
    }

    /// Set the text length below which a document is not text-bearing.
    pub fn with_min_text_length(mut self, min_text_length: usize) -> Self {
        self.min_text_length = min_text_length;
        self
    }

    /// Extract every page and classify the document.
    pub fn extract_all(&self) -> Result<PdfContent> {
        let mut pages = self
            .extract_pages()?
            .into_iter()
            .zip(1u32..)
            .map(|(text, number)| PdfPage { number, text })
            .collect::<Vec<_>>();

        let per_page_len: usize = pages.iter().map(|p| p.text.trim().chars().count()).sum();
        if per_page_len < self.min_text_length {
            // Some encodings defeat lopdf's per-page extraction; pdf-extract
            // handles more fonts but only yields the whole document.
            match self.extract_text() {
                Ok(text) if text.trim().chars().count() > per_page_len => {
                    debug!("Using pdf-extract text ({} chars) over per-page text", text.len());
                    pages = vec![PdfPage { number: 1, text }];
                }
                Ok(_) => {}
                Err(e) => debug!("pdf-extract fallback failed: {}", e),
            }
        }

        let image_count = self.count_images();
        let content = PdfContent {
            pdf_type: PdfType::Empty,
            pages,
            image_count,
        };
        let pdf_type = PdfType::classify(content.text_len(), image_count, self.min_text_length);

        debug!(
            "PDF analysis: {} pages, {} chars text, {} images -> {:?}",
            self.page_count(),
            content.text_len(),
            image_count,
            pdf_type
        );

        Ok(PdfContent { pdf_type, ..content })
    }

    /// Whole-document text via pdf-extract.
    pub fn extract_text(&self) -> Result<String> {
        // pdf-extract panics on some malformed fonts; keep that inside this document
        catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(&self.raw_data)))
            .map_err(|_| PdfError::TextExtraction("pdf-extract panicked".to_string()))?
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Count image XObjects without decoding them.
    fn count_images(&self) -> usize {
        let Some(doc) = self.document.as_ref() else {
            return 0;
        };

        doc.objects
            .values()
            .filter(|object| match object {
                Object::Stream(stream) => stream
                    .dict
                    .get(b"Subtype")
                    .and_then(|s| s.as_name())
                    .is_ok_and(|name| name == b"Image"),
                _ => false,
            })
            .count()
    }

    /// Parse the document, decrypting it if needed. The flag reports whether it was encrypted.
    fn decrypt(&self, data: &[u8]) -> Result<(Document, bool)> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;
        if !doc.is_encrypted() {
            return Ok((doc, false));
        }

        if doc.decrypt("").is_ok() {
            debug!("Decrypted PDF with empty password");
            return Ok((doc, true));
        }

        let Some(password) = self.password.as_deref() else {
            return Err(PdfError::Encrypted);
        };

        // Start from a fresh parse; a failed attempt may leave objects half decrypted
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;
        doc.decrypt(password).map_err(|e| {
            trace!("Password rejected: {}", e);
            PdfError::InvalidPassword
        })?;
        debug!("Decrypted PDF with configured password");
        Ok((doc, true))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let (mut doc, was_encrypted) = self.decrypt(data)?;

        if was_encrypted {
            // Save decrypted document to raw_data for pdf_extract
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn analyze(&self) -> PdfType {
        self.extract_all()
            .map(|content| content.pdf_type)
            .unwrap_or(PdfType::Empty)
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))?;

        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(format!("page {}: {}", page, e)))
    }

    fn extract_pages(&self) -> Result<Vec<String>> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))?;

        let pages = doc
            .get_pages()
            .keys()
            .map(|&page| {
                self.extract_page_text(page).unwrap_or_else(|e| {
                    warn!("{}", e);
                    String::new()
                })
            })
            .collect();
        Ok(pages)
    }
}

/// Reads statement PDFs from the filesystem.
#[derive(Debug, Clone)]
pub struct PdfFileProvider {
    password: Option<String>,
    min_text_length: usize,
}

impl PdfFileProvider {
    pub fn new() -> Self {
        Self {
            password: None,
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
        }
    }

    /// Password for encrypted statements.
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    pub fn with_min_text_length(mut self, min_text_length: usize) -> Self {
        self.min_text_length = min_text_length;
        self
    }

    /// Load and analyze a PDF from memory.
    pub fn load_bytes(&self, data: &[u8]) -> Result<PdfContent> {
        let mut extractor = PdfExtractor::new()
            .with_password(self.password.clone())
            .with_min_text_length(self.min_text_length);
        extractor.load(data)?;
        extractor.extract_all()
    }
}

impl Default for PdfFileProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTextProvider for PdfFileProvider {
    fn page_texts(&self, source_reference: &str) -> Result<Vec<String>> {
        let data = std::fs::read(Path::new(source_reference))?;
        let content = self.load_bytes(&data)?;

        if content.pdf_type.has_text() {
            return Ok(content.page_texts());
        }
        if content.image_count > 0 {
            Err(PdfError::ImageOnly {
                images: content.image_count,
                chars: content.text_len(),
            })
        } else {
            Err(PdfError::TextExtraction(format!(
                "only {} characters of text extracted",
                content.text_len()
            )))
        }
    }
}
