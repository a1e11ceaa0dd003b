//! Core library for Brazilian electricity bill extraction.
//!
//! This crate provides:
//! - PDF text-layer extraction
//! - A pattern catalog for bill fields and an energy table scanner
//! - Locale number parsing ("1.234,56") with typed failures
//! - Customer name resolution through an ordered strategy chain
//! - Derived metrics and the final bill record

pub mod bill;
pub mod error;
pub mod models;
pub mod pdf;

pub use bill::{
    BillParser, BillText, Entity, EntityRecognizer, ExtractionResult, NameResolver, NameStrategy,
};
pub use error::{ExtractionError, FaturaError, NameError, PdfError, Result};
pub use models::bill::{BillField, BillRecord, ExtractionMetadata, FieldStatus, SourceType};
pub use models::config::FaturaConfig;
pub use pdf::{PdfContent, PdfProcessor, PdfType};
