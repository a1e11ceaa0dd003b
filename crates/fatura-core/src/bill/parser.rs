//! Bill parser running the full extraction pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::bill::{BillRecord, MonetaryAmounts, RawFieldMap, SourceType};
use crate::models::config::FaturaConfig;

use super::assembler::{AssemblyInput, RecordAssembler};
use super::metrics::DerivedMetrics;
use super::names::{
    DistributorMatcher, EntityRecognitionStrategy, EntityRecognizer, LegalSuffixStrategy,
    NameResolver, ResolvedNames,
};
use super::rules::{MonetaryLineScanner, ParsedFields, PatternCatalog};
use super::text::BillText;
use super::Result;

/// Result of bill extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted bill record.
    pub record: BillRecord,
    /// Raw field strings as located by the catalog.
    pub raw_fields: RawFieldMap,
    /// Energy table amounts in document order.
    pub amounts: MonetaryAmounts,
    /// Field-level parse failures.
    pub field_errors: Vec<ExtractionError>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Electricity bill parser.
///
/// Holds only immutable configuration and shared strategies, so one
/// instance can serve concurrent documents behind an `Arc`.
#[derive(Debug, Clone)]
pub struct BillParser {
    catalog: PatternCatalog,
    scanner: MonetaryLineScanner,
    names: NameResolver,
    distributors: DistributorMatcher,
    assembler: RecordAssembler,
}

impl BillParser {
    /// Parser with the built-in catalog and the legal-suffix name fallback.
    pub fn new() -> Self {
        let config = FaturaConfig::default();
        let distributors = DistributorMatcher::new();

        Self {
            catalog: PatternCatalog::energy_bill(),
            scanner: MonetaryLineScanner::new(),
            names: NameResolver::new().with_strategy(Arc::new(suffix_strategy(
                &config,
                &distributors,
            ))),
            distributors,
            assembler: RecordAssembler::new(),
        }
    }

    /// Parser built from configuration.
    ///
    /// When a recognizer is given it runs first in the name chain, bounded
    /// by `ner.timeout_ms`; the legal-suffix search is always the fallback.
    pub fn from_config(
        config: &FaturaConfig,
        recognizer: Option<Arc<dyn EntityRecognizer>>,
    ) -> Result<Self> {
        let catalog = PatternCatalog::energy_bill().with_specs(&config.extraction.extra_patterns)?;
        let distributors =
            DistributorMatcher::new().extend(config.names.extra_distributors.iter().cloned());

        let mut names = NameResolver::new();
        if let Some(recognizer) = recognizer {
            let strategy = EntityRecognitionStrategy::new(
                recognizer,
                config.ner.language.clone(),
                Duration::from_millis(config.ner.timeout_ms),
                config.names.anchors.clone(),
                config.names.neighborhood_radius,
            )
            .with_snippet_lines(config.ner.snippet_lines);
            names = names.with_strategy(Arc::new(strategy));
        }
        names = names.with_strategy(Arc::new(suffix_strategy(config, &distributors)));

        debug!(
            "Parser configured: {} catalog entries, {} name strategies",
            catalog.entries().len(),
            names.len()
        );

        Ok(Self {
            catalog,
            scanner: MonetaryLineScanner::new(),
            names,
            distributors,
            assembler: RecordAssembler::new()
                .with_short_amount_warnings(config.extraction.warn_on_short_amounts),
        })
    }

    /// Replace the pattern catalog.
    pub fn with_catalog(mut self, catalog: PatternCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the customer name strategy chain.
    pub fn with_name_resolver(mut self, names: NameResolver) -> Self {
        self.names = names;
        self
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Parse bill text of unknown origin.
    pub async fn parse(&self, text: &str) -> Result<ExtractionResult> {
        self.parse_with_source(text, SourceType::PlainText).await
    }

    /// Parse bill text, recording where it came from.
    pub async fn parse_with_source(
        &self,
        text: &str,
        source_type: SourceType,
    ) -> Result<ExtractionResult> {
        let start = Instant::now();

        info!("Parsing bill from {} characters of text", text.len());

        let text = BillText::new(text);
        if text.is_blank() {
            return Err(ExtractionError::UnreadableDocument(
                "document text is empty".to_string(),
            ));
        }

        let raw_fields = self.catalog.extract(&text);
        let amounts = self.scanner.scan(&text);
        let parsed = ParsedFields::from_raw(&raw_fields);

        let names = ResolvedNames {
            customer: self.names.resolve(&text).await,
            distributor: self.distributors.find(&text),
        };

        let metrics = DerivedMetrics::compute(&amounts, &parsed);
        debug!("Derived metrics: {:?}", metrics);

        let record = self.assembler.assemble(AssemblyInput {
            text: &text,
            raw: &raw_fields,
            parsed: &parsed,
            amounts: &amounts,
            metrics,
            names,
            source_type,
            started: start,
        })?;

        info!(
            "Extracted bill {} for {} with confidence {:.2}",
            record.account_number, record.month, record.metadata.confidence
        );

        Ok(ExtractionResult {
            warnings: record.metadata.warnings.clone(),
            field_errors: parsed.errors().to_vec(),
            record,
            raw_fields,
            amounts,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl Default for BillParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Legal-suffix fallback that ignores the utility letterhead.
fn suffix_strategy(config: &FaturaConfig, distributors: &DistributorMatcher) -> LegalSuffixStrategy {
    LegalSuffixStrategy::new(
        config.names.anchors.clone(),
        config.names.neighborhood_radius,
    )
    .with_exclusions(distributors.clone())
}
