//! Table of named field patterns.
//!
//! Each entry names the field it fills, the layout fragment it targets and
//! its regex. Several entries may share a field; the first one that
//! matches wins. A field nothing matches gets its documented default, so a
//! layout deviation on one field never aborts the others. New layouts are
//! supported by adding entries, not by changing the extraction loop.

use regex::Regex;
use tracing::{debug, trace};

use crate::bill::text::BillText;
use crate::error::ExtractionError;
use crate::models::bill::{BillField, FieldDefault, RawField, RawFieldMap};
use crate::models::config::PatternSpec;

use super::patterns::*;

/// One catalog entry.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    /// Field the entry fills.
    pub field: BillField,
    /// Layout fragment the pattern targets.
    pub target: String,
    /// Pattern whose first capture group is the value.
    pub pattern: Regex,
    /// Value used when nothing matches.
    pub default: FieldDefault,
}

impl FieldPattern {
    pub fn new(field: BillField, target: impl Into<String>, pattern: Regex) -> Self {
        Self {
            field,
            target: target.into(),
            pattern,
            default: documented_default(field),
        }
    }

    /// First capture group of the first match, trimmed; blank captures
    /// count as misses.
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
    }
}

/// Default substituted for a field when no catalog entry matches.
pub fn documented_default(field: BillField) -> FieldDefault {
    match field {
        BillField::AccountNumber | BillField::Month => FieldDefault::Unknown,
        BillField::InstallationNumber | BillField::Year | BillField::DueDate => {
            FieldDefault::Absent
        }
        BillField::TotalValue
        | BillField::KwhConsumption
        | BillField::SceeeEnergy
        | BillField::CompensatedEnergyQuantity
        | BillField::PublicLightingContribution => FieldDefault::Zero,
    }
}

/// Ordered list of field patterns.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    entries: Vec<FieldPattern>,
}

impl PatternCatalog {
    /// A catalog with no entries; every field gets its default.
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Built-in catalog for the supported electricity bill layouts.
    pub fn energy_bill() -> Self {
        Self::empty()
            .with_entry(FieldPattern::new(
                BillField::AccountNumber,
                "account/installation header row, first number",
                ACCOUNT_NUMBER.clone(),
            ))
            .with_entry(FieldPattern::new(
                BillField::InstallationNumber,
                "account/installation header row, second number",
                INSTALLATION_NUMBER.clone(),
            ))
            .with_entry(FieldPattern::new(
                BillField::Month,
                "reference month under the 'Referente a' header",
                REFERENCE_MONTH.clone(),
            ))
            .with_entry(FieldPattern::new(
                BillField::Year,
                "'Ano de referência' label",
                REFERENCE_YEAR.clone(),
            ))
            .with_entry(FieldPattern::new(
                BillField::DueDate,
                "date following the reference month",
                DUE_DATE.clone(),
            ))
            .with_entry(FieldPattern::new(
                BillField::TotalValue,
                "amount after reference month and due date",
                TOTAL_AFTER_DUE_DATE.clone(),
            ))
            .with_entry(FieldPattern::new(
                BillField::TotalValue,
                "amount column adjacent to a due date",
                TOTAL_NEXT_TO_DATE.clone(),
            ))
            .with_entry(FieldPattern::new(
                BillField::KwhConsumption,
                "electric energy row quantity",
                KWH_CONSUMPTION.clone(),
            ))
            .with_entry(FieldPattern::new(
                BillField::SceeeEnergy,
                "compensation-system energy row quantity",
                SCEEE_ENERGY.clone(),
            ))
            .with_entry(FieldPattern::new(
                BillField::CompensatedEnergyQuantity,
                "compensated energy row quantity",
                COMPENSATED_ENERGY.clone(),
            ))
            .with_entry(FieldPattern::new(
                BillField::PublicLightingContribution,
                "public lighting contribution line",
                PUBLIC_LIGHTING.clone(),
            ))
    }

    /// Append an entry; it is tried after existing entries for its field.
    pub fn with_entry(mut self, entry: FieldPattern) -> Self {
        self.entries.push(entry);
        self
    }

    /// Append entries compiled from configuration.
    pub fn with_specs(mut self, specs: &[PatternSpec]) -> Result<Self, ExtractionError> {
        for spec in specs {
            let pattern = Regex::new(&spec.pattern).map_err(|e| ExtractionError::InvalidPattern {
                field: spec.field.to_string(),
                reason: e.to_string(),
            })?;

            if pattern.captures_len() < 2 {
                return Err(ExtractionError::InvalidPattern {
                    field: spec.field.to_string(),
                    reason: "pattern has no capture group".to_string(),
                });
            }

            let target = if spec.target.is_empty() {
                "configured pattern".to_string()
            } else {
                spec.target.clone()
            };
            self.entries.push(FieldPattern::new(spec.field, target, pattern));
        }
        Ok(self)
    }

    pub fn entries(&self) -> &[FieldPattern] {
        &self.entries
    }

    /// Entries for one field, in the order they are tried.
    pub fn entries_for(&self, field: BillField) -> impl Iterator<Item = &FieldPattern> {
        self.entries.iter().filter(move |e| e.field == field)
    }

    /// Run every field through the catalog.
    pub fn extract(&self, text: &BillText) -> RawFieldMap {
        let mut raw = RawFieldMap::new();

        for field in BillField::ALL {
            let hit = self.entries_for(field).find_map(|entry| {
                let value = entry.capture(text.as_str())?;
                trace!("{} matched '{}' via {}", field, value, entry.target);
                Some(value)
            });

            match hit {
                Some(value) => raw.insert(field, RawField::matched(value)),
                None => {
                    debug!("{} not found, using default", field);
                    raw.insert(field, RawField::defaulted(documented_default(field)));
                }
            }
        }

        raw
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::energy_bill()
    }
}
