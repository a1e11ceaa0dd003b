//! Amount column of the energy table rows.
//!
//! Rows are not labelled here: the amounts are returned in document order
//! and their meaning comes from position (electric energy, compensation
//! system charge, compensated energy credit).

use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::bill::text::BillText;
use crate::models::bill::MonetaryAmounts;

use super::numbers::parse_locale_number;
use super::patterns::ENERGY_ROW;
use super::{ExtractionMatch, FieldExtractor};

/// Scanner for the energy table amount column.
#[derive(Debug, Clone)]
pub struct MonetaryLineScanner {
    row: Regex,
}

impl MonetaryLineScanner {
    pub fn new() -> Self {
        Self {
            row: ENERGY_ROW.clone(),
        }
    }

    /// Use a different row pattern; its first capture group is the amount.
    pub fn with_pattern(mut self, row: Regex) -> Self {
        self.row = row;
        self
    }

    /// Amounts of every matching row, in document order.
    pub fn scan(&self, text: &BillText) -> MonetaryAmounts {
        let values: Vec<Decimal> = self
            .extract_all(text.as_str())
            .into_iter()
            .map(|m| m.value)
            .collect();

        debug!("Scanned {} energy table rows", values.len());
        MonetaryAmounts::new(values)
    }
}

impl Default for MonetaryLineScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for MonetaryLineScanner {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in self.row.captures_iter(text) {
            let (Some(row), Some(amount)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            match parse_locale_number(amount.as_str()) {
                Ok(value) => results.push(
                    ExtractionMatch::new(value, 0.9, row.as_str())
                        .with_position(row.start(), row.end()),
                ),
                Err(e) => warn!("Skipping energy row '{}': {}", row.as_str(), e),
            }
        }

        results
    }
}
