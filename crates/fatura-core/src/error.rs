//! Error types for the fatura-core library.

use std::time::Duration;

use thiserror::Error;

/// Main error type for the fatura library.
#[derive(Error, Debug)]
pub enum FaturaError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Bill extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to bill field extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The text carries none of the fields that identify a bill.
    #[error("unreadable document: {0}")]
    UnreadableDocument(String),

    /// A field was present but its value is not a locale number.
    #[error("failed to parse {field}: {value:?}")]
    Parse { field: String, value: String },

    /// A catalog pattern could not be compiled.
    #[error("invalid pattern for {field}: {reason}")]
    InvalidPattern { field: String, reason: String },
}

/// Reasons a single name strategy could not produce a candidate.
///
/// These never leave the resolver: the chain moves on to the next strategy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The entity-recognition call did not answer in time.
    #[error("entity recognition timed out after {0:?}")]
    Timeout(Duration),

    /// The entity-recognition service failed.
    #[error("entity recognition failed: {0}")]
    Service(String),

    /// The service answered but returned no person entity.
    #[error("no person entity returned")]
    NoEntity,

    /// The pattern strategy found no candidate line.
    #[error("no candidate line near anchor")]
    NoCandidate,
}

/// Result type for the fatura library.
pub type Result<T> = std::result::Result<T, FaturaError>;
