//! Electricity bill data models.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fields located by the pattern catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BillField {
    /// Billing account identifier (Nº DO CLIENTE).
    AccountNumber,
    /// Physical connection point identifier (Nº DA INSTALAÇÃO).
    InstallationNumber,
    /// Reference month, `MMM/YYYY`.
    Month,
    /// Reference year, when a layout prints it on its own.
    Year,
    /// Payment due date.
    DueDate,
    /// Amount to pay.
    TotalValue,
    /// Electric energy consumed, in kWh.
    KwhConsumption,
    /// Energy billed under the compensation system, in kWh.
    SceeeEnergy,
    /// Energy credited by distributed generation, in kWh.
    CompensatedEnergyQuantity,
    /// Municipal public lighting contribution.
    PublicLightingContribution,
}

impl BillField {
    /// Every catalog field, in extraction order.
    pub const ALL: [BillField; 10] = [
        BillField::AccountNumber,
        BillField::InstallationNumber,
        BillField::Month,
        BillField::Year,
        BillField::DueDate,
        BillField::TotalValue,
        BillField::KwhConsumption,
        BillField::SceeeEnergy,
        BillField::CompensatedEnergyQuantity,
        BillField::PublicLightingContribution,
    ];

    /// Field name as it appears in serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            BillField::AccountNumber => "accountNumber",
            BillField::InstallationNumber => "installationNumber",
            BillField::Month => "month",
            BillField::Year => "year",
            BillField::DueDate => "dueDate",
            BillField::TotalValue => "totalValue",
            BillField::KwhConsumption => "kwhConsumption",
            BillField::SceeeEnergy => "sceeeEnergy",
            BillField::CompensatedEnergyQuantity => "compensatedEnergyQuantity",
            BillField::PublicLightingContribution => "publicLightingContribution",
        }
    }

    /// Whether the raw value goes through the locale number parser.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            BillField::TotalValue
                | BillField::KwhConsumption
                | BillField::SceeeEnergy
                | BillField::CompensatedEnergyQuantity
                | BillField::PublicLightingContribution
        )
    }
}

/// A name that is not one of the catalog fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown bill field: {0}")]
pub struct UnknownField(pub String);

/// Accepts camelCase or snake_case names.
impl FromStr for BillField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.trim().chars().filter(|c| *c != '_').collect();
        BillField::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(&key))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

impl fmt::Display for BillField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value substituted when a catalog pattern finds nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDefault {
    /// The literal string "Unknown".
    Unknown,
    /// The literal string "0".
    Zero,
    /// No value at all.
    Absent,
}

impl FieldDefault {
    /// The raw value this default stands for.
    pub fn value(&self) -> Option<String> {
        match self {
            FieldDefault::Unknown => Some("Unknown".to_string()),
            FieldDefault::Zero => Some("0".to_string()),
            FieldDefault::Absent => None,
        }
    }
}

/// How a field's value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// A catalog pattern matched the document.
    Matched,
    /// Nothing matched; the documented default was used.
    Defaulted,
    /// Something matched but could not be parsed.
    Corrupted,
}

/// A raw field string as located in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    /// Matched string or documented default.
    pub value: Option<String>,
    /// Whether the value came from the document.
    pub status: FieldStatus,
}

impl RawField {
    pub fn matched(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            status: FieldStatus::Matched,
        }
    }

    pub fn defaulted(default: FieldDefault) -> Self {
        Self {
            value: default.value(),
            status: FieldStatus::Defaulted,
        }
    }
}

/// Raw field strings keyed by catalog field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawFieldMap(BTreeMap<BillField, RawField>);

impl RawFieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: BillField, raw: RawField) {
        self.0.insert(field, raw);
    }

    pub fn get(&self, field: BillField) -> Option<&RawField> {
        self.0.get(&field)
    }

    /// Raw string for a field, if any.
    pub fn value(&self, field: BillField) -> Option<&str> {
        self.0.get(&field).and_then(|r| r.value.as_deref())
    }

    /// Status for a field; fields the catalog never covered count as defaulted.
    pub fn status(&self, field: BillField) -> FieldStatus {
        self.0
            .get(&field)
            .map(|r| r.status)
            .unwrap_or(FieldStatus::Defaulted)
    }

    pub fn is_matched(&self, field: BillField) -> bool {
        self.status(field) == FieldStatus::Matched
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BillField, &RawField)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Amounts scanned from the energy table rows, in document order.
///
/// Position carries the meaning: 0 is the electric energy charge, 1 the
/// compensation-system charge, 2 the compensated energy credit (negative).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonetaryAmounts(Vec<Decimal>);

impl MonetaryAmounts {
    pub fn new(values: Vec<Decimal>) -> Self {
        Self(values)
    }

    pub fn electric_energy(&self) -> Option<Decimal> {
        self.0.first().copied()
    }

    pub fn compensation_charge(&self) -> Option<Decimal> {
        self.0.get(1).copied()
    }

    pub fn compensated_credit(&self) -> Option<Decimal> {
        self.0.get(2).copied()
    }

    /// True when all three canonical rows were found.
    pub fn has_compensation(&self) -> bool {
        self.0.len() >= 3
    }

    pub fn as_slice(&self) -> &[Decimal] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Strategy that produced the customer name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    /// External named-entity recognition.
    EntityRecognition,
    /// Legal-entity suffix line near an anchor phrase.
    LegalSuffix,
}

/// Source document type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Text layer of a PDF.
    TextPdf,
    /// Text supplied directly.
    PlainText,
    /// Unknown source.
    #[default]
    Unknown,
}

/// Metadata about the extraction process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    /// Overall extraction confidence (0.0 - 1.0).
    pub confidence: f32,

    /// Source document type.
    pub source_type: SourceType,

    /// Processing time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,

    /// Strategy that resolved the customer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_source: Option<NameSource>,

    /// Number of energy table rows the scanner found.
    pub monetary_rows: usize,

    /// Per-field extraction status.
    #[serde(default)]
    pub field_status: BTreeMap<BillField, FieldStatus>,

    /// Fields that fell back to their default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,

    /// Warnings or issues encountered during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// One extracted electricity bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    /// Billing account identifier.
    pub account_number: String,

    /// Installation (connection point) identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_number: Option<String>,

    /// Distribution utility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributor: Option<String>,

    /// Consumer unit holder.
    #[serde(alias = "ucName", skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,

    /// Reference month (`MMM/YYYY`).
    pub month: String,

    /// Reference year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Payment due date.
    pub due_date: Option<NaiveDate>,

    /// Amount to pay.
    pub total_value: Decimal,

    /// Energy charges plus lighting contribution, without the generation credit.
    #[serde(rename = "totalValueWithoutGD", skip_serializing_if = "Option::is_none")]
    pub total_value_without_gd: Option<Decimal>,

    /// Consumed energy in kWh.
    pub kwh_consumption: Decimal,

    /// Energy billed under the compensation system in kWh.
    pub sceee_energy: Decimal,

    /// `kwh_consumption + sceee_energy`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electric_energy_consumption: Option<Decimal>,

    /// Energy credited by distributed generation in kWh.
    pub compensated_energy_quantity: Decimal,

    /// Absolute value of the compensated energy credit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compensated_energy_money: Option<Decimal>,

    /// Municipal public lighting contribution.
    pub public_lighting_contribution: Decimal,

    /// Extraction metadata.
    pub metadata: ExtractionMetadata,
}

impl BillRecord {
    /// Check the numeric invariants and return any issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.account_number.is_empty() || self.account_number == "Unknown" {
            issues.push("Missing account number".to_string());
        }

        if self.month == "Unknown" {
            issues.push("Missing reference month".to_string());
        }

        let non_negative = [
            ("totalValue", Some(self.total_value)),
            ("totalValueWithoutGD", self.total_value_without_gd),
            ("kwhConsumption", Some(self.kwh_consumption)),
            ("sceeeEnergy", Some(self.sceee_energy)),
            ("electricEnergyConsumption", self.electric_energy_consumption),
            ("compensatedEnergyQuantity", Some(self.compensated_energy_quantity)),
            ("compensatedEnergyMoney", self.compensated_energy_money),
            ("publicLightingContribution", Some(self.public_lighting_contribution)),
        ];
        for (name, value) in non_negative {
            if let Some(value) = value {
                if value.is_sign_negative() && !value.is_zero() {
                    issues.push(format!("{} is negative ({})", name, value));
                }
            }
        }

        if let Some(total) = self.electric_energy_consumption {
            match self.kwh_consumption.checked_add(self.sceee_energy) {
                Some(expected) if expected == total => {}
                Some(expected) => issues.push(format!(
                    "Electric energy consumption ({}) differs from kWh + SCEE ({})",
                    total, expected
                )),
                None => issues.push(format!(
                    "Electric energy consumption ({}) cannot be checked, kWh + SCEE overflows",
                    total
                )),
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> BillRecord {
        BillRecord {
            account_number: "7204076116".to_string(),
            installation_number: Some("3001116735".to_string()),
            distributor: Some("CEMIG".to_string()),
            customer_name: None,
            month: "JAN/2024".to_string(),
            year: Some(2024),
            due_date: NaiveDate::from_ymd_opt(2024, 2, 12),
            total_value: Decimal::new(10789, 2),
            total_value_without_gd: Some(Decimal::new(49321, 2)),
            kwh_consumption: Decimal::from(50),
            sceee_energy: Decimal::from(456),
            electric_energy_consumption: Some(Decimal::from(506)),
            compensated_energy_quantity: Decimal::from(456),
            compensated_energy_money: Some(Decimal::new(22245, 2)),
            public_lighting_contribution: Decimal::new(4940, 2),
            metadata: ExtractionMetadata::default(),
        }
    }

    #[test]
    fn test_bill_field_names() {
        assert_eq!("accountNumber".parse(), Ok(BillField::AccountNumber));
        assert_eq!("kwh_consumption".parse(), Ok(BillField::KwhConsumption));
        assert_eq!(
            "nope".parse::<BillField>(),
            Err(UnknownField("nope".to_string()))
        );
        assert!(BillField::TotalValue.is_numeric());
        assert!(!BillField::DueDate.is_numeric());
    }

    #[test]
    fn test_field_defaults() {
        assert_eq!(FieldDefault::Unknown.value().as_deref(), Some("Unknown"));
        assert_eq!(FieldDefault::Zero.value().as_deref(), Some("0"));
        assert_eq!(FieldDefault::Absent.value(), None);
    }

    #[test]
    fn test_monetary_positions() {
        let amounts = MonetaryAmounts::new(vec![
            Decimal::new(4781, 2),
            Decimal::new(39600, 2),
            Decimal::new(-22245, 2),
        ]);
        assert_eq!(amounts.electric_energy(), Some(Decimal::new(4781, 2)));
        assert_eq!(amounts.compensated_credit(), Some(Decimal::new(-22245, 2)));
        assert!(amounts.has_compensation());

        let short = MonetaryAmounts::new(vec![Decimal::ONE]);
        assert_eq!(short.compensation_charge(), None);
        assert!(!short.has_compensation());
    }

    #[test]
    fn test_validate_clean_record() {
        assert!(record().validate().is_empty());
    }

    #[test]
    fn test_validate_flags_negative_and_mismatch() {
        let mut bill = record();
        bill.public_lighting_contribution = Decimal::new(-100, 2);
        bill.electric_energy_consumption = Some(Decimal::from(1));

        let issues = bill.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].contains("publicLightingContribution"));
    }

    #[test]
    fn test_validate_reports_overflowing_consumption() {
        let mut bill = record();
        bill.kwh_consumption = Decimal::MAX;
        bill.sceee_energy = Decimal::MAX;

        let issues = bill.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("overflows"));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["accountNumber"], "7204076116");
        assert_eq!(json["dueDate"], "2024-02-12");
        assert!(json.get("totalValueWithoutGD").is_some());
        assert!(json.get("customerName").is_none());
    }
}
