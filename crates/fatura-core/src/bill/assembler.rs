//! Final stage: turns the intermediate results into a [`BillRecord`].

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, warn};

use crate::bill::metrics::DerivedMetrics;
use crate::bill::names::ResolvedNames;
use crate::bill::rules::{month_number, parse_due_date, resolve_year, ParsedFields};
use crate::bill::rules::patterns::MONTH_TOKEN;
use crate::bill::text::BillText;
use crate::error::ExtractionError;
use crate::models::bill::{
    BillField, BillRecord, ExtractionMetadata, FieldStatus, MonetaryAmounts, RawFieldMap,
    SourceType,
};

/// Fields whose absence lowers confidence the most.
const KEY_FIELDS: [BillField; 4] = [
    BillField::AccountNumber,
    BillField::Month,
    BillField::DueDate,
    BillField::TotalValue,
];

/// Everything the assembler consumes for one document.
pub struct AssemblyInput<'a> {
    pub text: &'a BillText,
    pub raw: &'a RawFieldMap,
    pub parsed: &'a ParsedFields,
    pub amounts: &'a MonetaryAmounts,
    pub metrics: DerivedMetrics,
    pub names: ResolvedNames,
    pub source_type: SourceType,
    pub started: Instant,
}

/// Builds the record, its metadata and the confidence score.
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    warn_on_short_amounts: bool,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self {
            warn_on_short_amounts: true,
        }
    }

    /// Warn when fewer than three energy rows were scanned.
    pub fn with_short_amount_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_short_amounts = enabled;
        self
    }

    /// Assemble the record, or fail when the document carries no usable data.
    pub fn assemble(&self, input: AssemblyInput<'_>) -> Result<BillRecord, ExtractionError> {
        let AssemblyInput {
            text,
            raw,
            parsed,
            amounts,
            metrics,
            names,
            source_type,
            started,
        } = input;

        if text.is_blank() {
            return Err(ExtractionError::UnreadableDocument(
                "document text is empty".to_string(),
            ));
        }

        let has_account = raw.is_matched(BillField::AccountNumber);
        let has_money = !amounts.is_empty() || raw.is_matched(BillField::TotalValue);
        if !has_account && !has_money {
            return Err(ExtractionError::UnreadableDocument(
                "no account number and no monetary amount found".to_string(),
            ));
        }

        let mut warnings = Vec::new();
        let mut field_status: BTreeMap<BillField, FieldStatus> = BillField::ALL
            .into_iter()
            .map(|field| (field, raw.status(field)))
            .collect();

        for (field, error) in parsed.corrupted().iter().zip(parsed.errors()) {
            field_status.insert(*field, FieldStatus::Corrupted);
            warnings.push(error.to_string());
        }

        let month = match raw.value(BillField::Month) {
            Some(m) if raw.is_matched(BillField::Month) => m.trim().to_uppercase(),
            Some(m) => m.to_string(),
            None => "Unknown".to_string(),
        };
        if raw.is_matched(BillField::Month) && !is_known_month(&month) {
            warnings.push(format!("Unrecognized reference month '{}'", month));
        }

        let year = resolve_year(raw.value(BillField::Year), &month);

        let due_date = match raw.value(BillField::DueDate) {
            Some(value) => {
                let date = parse_due_date(value);
                if date.is_none() {
                    field_status.insert(BillField::DueDate, FieldStatus::Corrupted);
                    warnings.push(format!("Could not parse due date '{}'", value));
                }
                date
            }
            None => None,
        };

        if amounts.is_empty() {
            warnings.push("No energy table rows found".to_string());
        } else if self.warn_on_short_amounts && !amounts.has_compensation() {
            warnings.push(format!(
                "Only {} energy table row(s) found, compensation metrics omitted",
                amounts.len()
            ));
        }

        if names.customer.is_none() {
            warnings.push("Could not resolve customer name".to_string());
        }

        let missing_fields: Vec<String> = field_status
            .iter()
            .filter(|(_, status)| **status == FieldStatus::Defaulted)
            .filter(|(field, _)| !(**field == BillField::Year && year.is_some()))
            .map(|(field, _)| field.as_str().to_string())
            .collect();

        let confidence = confidence_score(&field_status, amounts, names.customer.is_some());

        let (customer_name, name_source) = match names.customer {
            Some(resolved) => (Some(resolved.name), Some(resolved.source)),
            None => (None, None),
        };

        let mut record = BillRecord {
            account_number: raw
                .value(BillField::AccountNumber)
                .unwrap_or("Unknown")
                .to_string(),
            installation_number: raw.value(BillField::InstallationNumber).map(str::to_string),
            distributor: names.distributor,
            customer_name,
            month,
            year,
            due_date,
            total_value: parsed.value_or_zero(BillField::TotalValue),
            total_value_without_gd: metrics.total_value_without_gd,
            kwh_consumption: parsed.value_or_zero(BillField::KwhConsumption),
            sceee_energy: parsed.value_or_zero(BillField::SceeeEnergy),
            electric_energy_consumption: metrics.electric_energy_consumption,
            compensated_energy_quantity: parsed.value_or_zero(BillField::CompensatedEnergyQuantity),
            compensated_energy_money: metrics.compensated_energy_money,
            public_lighting_contribution: parsed
                .value_or_zero(BillField::PublicLightingContribution),
            metadata: ExtractionMetadata::default(),
        };

        let issues = record.validate();
        for issue in &issues {
            warn!("Bill {}: {}", record.account_number, issue);
        }
        warnings.extend(issues);

        record.metadata = ExtractionMetadata {
            confidence,
            source_type,
            processing_time_ms: Some(started.elapsed().as_millis() as u64),
            name_source,
            monetary_rows: amounts.len(),
            field_status,
            missing_fields,
            warnings,
        };

        debug!(
            "Assembled bill {} ({}) with confidence {:.2}",
            record.account_number, record.month, record.metadata.confidence
        );

        Ok(record)
    }
}

impl Default for RecordAssembler {
    fn default() -> Self {
        Self::new()
    }
}

fn is_known_month(month: &str) -> bool {
    MONTH_TOKEN
        .captures(month)
        .and_then(|caps| month_number(&caps[1]))
        .is_some()
}

fn confidence_score(
    field_status: &BTreeMap<BillField, FieldStatus>,
    amounts: &MonetaryAmounts,
    has_customer: bool,
) -> f32 {
    let mut confidence = 1.0f32;

    for field in KEY_FIELDS {
        if field_status.get(&field) == Some(&FieldStatus::Defaulted) {
            confidence -= 0.15;
        }
    }

    let corrupted = field_status
        .values()
        .filter(|status| **status == FieldStatus::Corrupted)
        .count();
    confidence -= 0.1 * corrupted as f32;

    if amounts.is_empty() {
        confidence -= 0.15;
    }
    if !has_customer {
        confidence -= 0.1;
    }

    confidence.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::names::ResolvedName;
    use crate::models::bill::{NameSource, RawField};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn raw_map(entries: &[(BillField, &str)]) -> RawFieldMap {
        let mut raw = RawFieldMap::new();
        for (field, value) in entries {
            raw.insert(*field, RawField::matched(*value));
        }
        raw
    }

    fn assemble(
        text: &str,
        raw: &RawFieldMap,
        amounts: &MonetaryAmounts,
        names: ResolvedNames,
    ) -> Result<BillRecord, ExtractionError> {
        let text = BillText::new(text);
        let parsed = ParsedFields::from_raw(raw);
        let metrics = DerivedMetrics::compute(amounts, &parsed);
        RecordAssembler::new().assemble(AssemblyInput {
            text: &text,
            raw,
            parsed: &parsed,
            amounts,
            metrics,
            names,
            source_type: SourceType::PlainText,
            started: Instant::now(),
        })
    }

    fn customer() -> ResolvedNames {
        ResolvedNames {
            customer: Some(ResolvedName {
                name: "ACME LTDA".to_string(),
                source: NameSource::LegalSuffix,
            }),
            distributor: Some("CEMIG".to_string()),
        }
    }

    #[test]
    fn test_blank_text_is_unreadable() {
        let err = assemble(" \n ", &RawFieldMap::new(), &MonetaryAmounts::default(), ResolvedNames::default())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::UnreadableDocument(_)));
    }

    #[test]
    fn test_no_account_and_no_money_is_unreadable() {
        let raw = raw_map(&[(BillField::Month, "JAN/2024")]);
        let err = assemble("some text", &raw, &MonetaryAmounts::default(), customer()).unwrap_err();
        assert!(matches!(err, ExtractionError::UnreadableDocument(_)));
    }

    #[test]
    fn test_money_without_account_is_best_effort() {
        let raw = raw_map(&[(BillField::TotalValue, "10,00")]);
        let record = assemble("some text", &raw, &MonetaryAmounts::default(), customer()).unwrap();

        assert_eq!(record.account_number, "Unknown");
        assert_eq!(record.month, "Unknown");
        assert_eq!(record.total_value, Decimal::new(1000, 2));
        assert!(record.metadata.missing_fields.contains(&"accountNumber".to_string()));
    }

    #[test]
    fn test_month_year_and_due_date() {
        let raw = raw_map(&[
            (BillField::AccountNumber, "1"),
            (BillField::Month, "fev/2023"),
            (BillField::DueDate, "10/03/2023"),
        ]);
        let record = assemble("x", &raw, &MonetaryAmounts::default(), customer()).unwrap();

        assert_eq!(record.month, "FEV/2023");
        assert_eq!(record.year, Some(2023));
        assert_eq!(record.due_date, NaiveDate::from_ymd_opt(2023, 3, 10));
        assert!(!record.metadata.missing_fields.contains(&"year".to_string()));
    }

    #[test]
    fn test_explicit_year_wins() {
        let raw = raw_map(&[
            (BillField::AccountNumber, "1"),
            (BillField::Month, "DEZ/2023"),
            (BillField::Year, "2024"),
        ]);
        let record = assemble("x", &raw, &MonetaryAmounts::default(), customer()).unwrap();
        assert_eq!(record.year, Some(2024));
    }

    #[test]
    fn test_unrecognized_month_and_bad_due_date_warn() {
        let raw = raw_map(&[
            (BillField::AccountNumber, "1"),
            (BillField::Month, "XYZ/2024"),
            (BillField::DueDate, "31/02/2024"),
        ]);
        let record = assemble("x", &raw, &MonetaryAmounts::default(), customer()).unwrap();

        assert_eq!(record.due_date, None);
        assert_eq!(
            record.metadata.field_status[&BillField::DueDate],
            FieldStatus::Corrupted
        );
        let warnings = record.metadata.warnings.join("\n");
        assert!(warnings.contains("XYZ/2024"));
        assert!(warnings.contains("31/02/2024"));
    }

    #[test]
    fn test_corrupted_field_is_flagged() {
        let raw = raw_map(&[
            (BillField::AccountNumber, "1"),
            (BillField::KwhConsumption, "5O"),
        ]);
        let record = assemble("x", &raw, &MonetaryAmounts::default(), customer()).unwrap();

        assert_eq!(
            record.metadata.field_status[&BillField::KwhConsumption],
            FieldStatus::Corrupted
        );
        assert_eq!(record.electric_energy_consumption, None);
        assert_eq!(record.kwh_consumption, Decimal::ZERO);
    }

    #[test]
    fn test_confidence_deductions() {
        let full = raw_map(&[
            (BillField::AccountNumber, "1"),
            (BillField::Month, "JAN/2024"),
            (BillField::DueDate, "12/02/2024"),
            (BillField::TotalValue, "1,00"),
        ]);
        let amounts = MonetaryAmounts::new(vec![Decimal::ONE, Decimal::ONE, Decimal::NEGATIVE_ONE]);

        let record = assemble("x", &full, &amounts, customer()).unwrap();
        assert_eq!(record.metadata.confidence, 1.0);
        assert_eq!(record.metadata.name_source, Some(NameSource::LegalSuffix));

        let record = assemble("x", &full, &amounts, ResolvedNames::default()).unwrap();
        assert!(record.metadata.confidence < 1.0);
        assert_eq!(record.customer_name, None);

        let sparse = raw_map(&[(BillField::AccountNumber, "1")]);
        let record = assemble("x", &sparse, &MonetaryAmounts::default(), ResolvedNames::default()).unwrap();
        assert!(record.metadata.confidence < 0.4);
    }
}
