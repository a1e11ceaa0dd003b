//! PDF processing module.

mod extractor;

pub use extractor::{PdfContent, PdfExtractor, PdfPage};

use crate::error::PdfError;
use crate::models::bill::SourceType;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains an extractable text layer.
    Text,
    /// Contains only images (scanned document).
    Image,
    /// Empty or unreadable.
    Empty,
}

impl PdfType {
    /// Whether the bill pipeline can run on this document.
    pub fn has_text(&self) -> bool {
        matches!(self, PdfType::Text)
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            PdfType::Text => SourceType::TextPdf,
            PdfType::Image | PdfType::Empty => SourceType::Unknown,
        }
    }
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Analyze the PDF to determine its type.
    fn analyze(&self) -> PdfType;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract text from a specific page.
    fn extract_page_text(&self, page: u32) -> Result<String>;
}
