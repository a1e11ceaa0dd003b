//! Locale number parsing for Brazilian-formatted values ("1.234,56").

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::ExtractionError;
use crate::models::bill::{BillField, RawFieldMap};

/// Parse a locale-formatted number.
///
/// Dots are thousands separators, the comma is the decimal marker and a
/// leading minus is kept. Blank input is zero; anything else that does not
/// parse is an error so corrupted values never pass as zero.
pub fn parse_locale_number(s: &str) -> Result<Decimal, ExtractionError> {
    parse_as("value", s)
}

/// Parse the raw value of a field; an absent value is zero.
pub fn parse_field(field: BillField, raw: Option<&str>) -> Result<Decimal, ExtractionError> {
    match raw {
        Some(s) => parse_as(field.as_str(), s),
        None => Ok(Decimal::ZERO),
    }
}

fn parse_as(field: &str, s: &str) -> Result<Decimal, ExtractionError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let normalized = trimmed.replace('.', "").replace(',', ".");

    Decimal::from_str(&normalized).map_err(|_| ExtractionError::Parse {
        field: field.to_string(),
        value: s.to_string(),
    })
}

/// Format an amount in Brazilian style (1.234,56).
pub fn format_locale_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some(parts) => parts,
        None => return s,
    };

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{},{}", sign, formatted, decimal_part)
}

/// Numeric catalog fields after locale parsing.
#[derive(Debug, Clone, Default)]
pub struct ParsedFields {
    values: BTreeMap<BillField, Decimal>,
    errors: Vec<ExtractionError>,
    corrupted: Vec<BillField>,
}

impl ParsedFields {
    /// Parse every numeric field of the raw map.
    pub fn from_raw(raw: &RawFieldMap) -> Self {
        let mut parsed = Self::default();

        for field in BillField::ALL.into_iter().filter(BillField::is_numeric) {
            match parse_field(field, raw.value(field)) {
                Ok(value) => {
                    parsed.values.insert(field, value);
                }
                Err(e) => {
                    parsed.errors.push(e);
                    parsed.corrupted.push(field);
                }
            }
        }

        parsed
    }

    /// Parsed value; `None` when the field was corrupted.
    pub fn get(&self, field: BillField) -> Option<Decimal> {
        self.values.get(&field).copied()
    }

    pub fn value_or_zero(&self, field: BillField) -> Decimal {
        self.get(field).unwrap_or(Decimal::ZERO)
    }

    pub fn is_corrupted(&self, field: BillField) -> bool {
        self.corrupted.contains(&field)
    }

    pub fn corrupted(&self) -> &[BillField] {
        &self.corrupted
    }

    pub fn errors(&self) -> &[ExtractionError] {
        &self.errors
    }
}
