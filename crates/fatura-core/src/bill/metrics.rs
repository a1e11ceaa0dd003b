//! Metrics derived from the scanned amounts and parsed fields.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::bill::rules::ParsedFields;
use crate::models::bill::{BillField, MonetaryAmounts};

/// Derived metrics; each one is omitted when its inputs are missing,
/// corrupted or too large to add, rather than computed from zero defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedMetrics {
    /// `round(amounts[0] + amounts[1] + lighting, 2)`.
    pub total_value_without_gd: Option<Decimal>,
    /// `kwh + sceee`.
    pub electric_energy_consumption: Option<Decimal>,
    /// `abs(amounts[2])`.
    pub compensated_energy_money: Option<Decimal>,
}

impl DerivedMetrics {
    pub fn compute(amounts: &MonetaryAmounts, parsed: &ParsedFields) -> Self {
        let lighting = parsed.get(BillField::PublicLightingContribution);

        let total_value_without_gd = match (
            amounts.electric_energy(),
            amounts.compensation_charge(),
            lighting,
        ) {
            (Some(energy), Some(compensation), Some(lighting)) => {
                let total = total_without_gd(energy, compensation, lighting);
                if total.is_none() {
                    warn!("Energy table amounts overflow; totalValueWithoutGD omitted");
                }
                total
            }
            _ => None,
        };

        let electric_energy_consumption = match (
            parsed.get(BillField::KwhConsumption),
            parsed.get(BillField::SceeeEnergy),
        ) {
            (Some(kwh), Some(sceee)) => {
                let sum = kwh.checked_add(sceee);
                if sum.is_none() {
                    warn!("kWh quantities overflow; electricEnergyConsumption omitted");
                }
                sum
            }
            _ => None,
        };

        Self {
            total_value_without_gd,
            electric_energy_consumption,
            compensated_energy_money: amounts.compensated_credit().map(|c| c.abs()),
        }
    }
}

/// Bill total without the distributed generation credit, rounded half away
/// from zero to cents. `None` when the sum does not fit in a `Decimal`.
pub fn total_without_gd(
    energy: Decimal,
    compensation: Decimal,
    lighting: Decimal,
) -> Option<Decimal> {
    energy
        .checked_add(compensation)?
        .checked_add(lighting)
        .map(|total| total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bill::{RawField, RawFieldMap};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn parsed(kwh: &str, sceee: &str, lighting: &str) -> ParsedFields {
        let mut raw = RawFieldMap::new();
        raw.insert(BillField::KwhConsumption, RawField::matched(kwh));
        raw.insert(BillField::SceeeEnergy, RawField::matched(sceee));
        raw.insert(BillField::PublicLightingContribution, RawField::matched(lighting));
        ParsedFields::from_raw(&raw)
    }

    #[test]
    fn test_full_triple() {
        let amounts = MonetaryAmounts::new(vec![dec("47.81"), dec("297.83"), dec("-222.45")]);
        let metrics = DerivedMetrics::compute(&amounts, &parsed("50", "456", "49,40"));

        assert_eq!(metrics.total_value_without_gd, Some(dec("395.04")));
        assert_eq!(metrics.electric_energy_consumption, Some(dec("506")));
        assert_eq!(metrics.compensated_energy_money, Some(dec("222.45")));
    }

    #[test]
    fn test_total_without_gd_matches_rounded_sum() {
        let triples = [
            ("0.005", "0", "0"),
            ("10.125", "5.0", "1.10"),
            ("1234.56", "0.01", "99.999"),
            ("0", "0", "0"),
        ];
        for (a, b, p) in triples {
            let expected = (dec(a) + dec(b) + dec(p))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            assert_eq!(total_without_gd(dec(a), dec(b), dec(p)), Some(expected));
        }
        assert_eq!(
            total_without_gd(dec("0.005"), Decimal::ZERO, Decimal::ZERO),
            Some(dec("0.01"))
        );
    }

    #[test]
    fn test_credit_sign_is_normalized() {
        for credit in ["-222.45", "222.45"] {
            let amounts = MonetaryAmounts::new(vec![Decimal::ONE, Decimal::ONE, dec(credit)]);
            let metrics = DerivedMetrics::compute(&amounts, &parsed("0", "0", "0"));
            assert_eq!(metrics.compensated_energy_money, Some(dec("222.45")));
        }
    }

    #[test]
    fn test_missing_rows_omit_totals() {
        let metrics = DerivedMetrics::compute(&MonetaryAmounts::default(), &parsed("50", "0", "49,40"));
        assert_eq!(metrics.total_value_without_gd, None);
        assert_eq!(metrics.compensated_energy_money, None);
        assert_eq!(metrics.electric_energy_consumption, Some(dec("50")));

        let one_row = MonetaryAmounts::new(vec![dec("1099.07")]);
        let metrics = DerivedMetrics::compute(&one_row, &parsed("1200", "0", "48,08"));
        assert_eq!(metrics.total_value_without_gd, None);
    }

    #[test]
    fn test_overflowing_inputs_omit_metrics() {
        let max = Decimal::MAX.to_string();
        let amounts = MonetaryAmounts::new(vec![Decimal::MAX, Decimal::MAX, Decimal::ONE]);
        let metrics = DerivedMetrics::compute(&amounts, &parsed(&max, &max, "1,00"));

        assert_eq!(metrics.electric_energy_consumption, None);
        assert_eq!(metrics.total_value_without_gd, None);
        assert_eq!(metrics.compensated_energy_money, Some(Decimal::ONE));
        assert_eq!(total_without_gd(Decimal::ONE, Decimal::ONE, Decimal::MAX), None);
    }

    #[test]
    fn test_corrupted_inputs_omit_metrics() {
        let amounts = MonetaryAmounts::new(vec![Decimal::ONE, Decimal::ONE]);
        let metrics = DerivedMetrics::compute(&amounts, &parsed("5O", "456", "x,y"));

        assert_eq!(metrics.electric_energy_consumption, None);
        assert_eq!(metrics.total_value_without_gd, None);
    }
}
