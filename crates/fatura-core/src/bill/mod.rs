//! Electricity bill field extraction module.

mod assembler;
mod metrics;
pub mod names;
mod parser;
pub mod rules;
pub mod text;

#[cfg(test)]
pub(crate) mod fixtures;

pub use assembler::{AssemblyInput, RecordAssembler};
pub use metrics::{total_without_gd, DerivedMetrics};
pub use names::{
    DistributorMatcher, Entity, EntityRecognitionStrategy, EntityRecognizer, LegalSuffixStrategy,
    NameResolver, NameStrategy, ResolvedName, ResolvedNames,
};
pub use parser::{BillParser, ExtractionResult};
pub use text::BillText;

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
