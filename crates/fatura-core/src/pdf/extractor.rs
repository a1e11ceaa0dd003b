//! PDF text extraction using lopdf and pdf-extract.

use lopdf::{Document, Object};
use tracing::{debug, trace, warn};

use super::{PdfProcessor, PdfType, Result};
use crate::error::PdfError;

/// PDF text extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    min_text_length: usize,
}

/// Extracted content from a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Type of PDF content.
    pub pdf_type: PdfType,
    /// Extracted text of the whole document.
    pub text: String,
    /// Pages with their text.
    pub pages: Vec<PdfPage>,
}

/// Text of a single PDF page.
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
            min_text_length: 50,
        }
    }

    /// Minimum number of text characters for a PDF to count as text-based.
    pub fn with_min_text_length(mut self, min: usize) -> Self {
        self.min_text_length = min;
        self
    }

    /// Extract the text of the whole document and of every page.
    pub fn extract_all(&self) -> Result<PdfContent> {
        let page_count = self.page_count();
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let pages: Vec<PdfPage> = (1..=page_count)
            .map(|number| PdfPage {
                number,
                text: self.extract_page_text(number).unwrap_or_else(|e| {
                    warn!("No text for page {}: {}", number, e);
                    String::new()
                }),
            })
            .collect();

        // pdf-extract keeps the reading order better than the per-page
        // operator walk, so it is preferred for the document text
        let text = match self.extract_text() {
            Ok(text) if !text.trim().is_empty() => text,
            _ => pages
                .iter()
                .map(|p| p.text.as_str())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        };

        let pdf_type = self.classify(text.trim().len());
        debug!(
            "PDF analysis: {} pages, {} chars text -> {:?}",
            page_count,
            text.len(),
            pdf_type
        );

        Ok(PdfContent {
            pdf_type,
            text,
            pages,
        })
    }

    fn classify(&self, text_len: usize) -> PdfType {
        if text_len > self.min_text_length {
            PdfType::Text
        } else if self.count_images() > 0 {
            PdfType::Image
        } else {
            PdfType::Empty
        }
    }

    /// Number of image XObjects in the document.
    fn count_images(&self) -> usize {
        let Some(doc) = self.document.as_ref() else {
            return 0;
        };

        let count = doc
            .objects
            .values()
            .filter(|object| match object {
                Object::Stream(stream) => stream
                    .dict
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .map(|name| name == b"Image")
                    .unwrap_or(false),
                _ => false,
            })
            .count();

        trace!("Found {} image objects", count);
        count
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Utility bills are often "protected" with an empty user password
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
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
        let text_len = self
            .extract_text()
            .map(|text| text.trim().len())
            .unwrap_or(0);
        self.classify(text_len)
    }

    fn extract_text(&self) -> Result<String> {
        if self.raw_data.is_empty() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))?;

        if !doc.get_pages().contains_key(&page) {
            return Err(PdfError::InvalidPage(page));
        }

        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}
