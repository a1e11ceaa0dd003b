//! Regex patterns for Brazilian electricity bill layouts.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Header row: "Nº DO CLIENTE  Nº DA INSTALAÇÃO" followed by both numbers
    pub static ref ACCOUNT_NUMBER: Regex = Regex::new(
        r"N[º°o]\.?\s*DO\s+CLIENTE\s+N[º°o]\.?\s*DA\s+INSTALA[ÇC][ÃA]O\s+(\d+)"
    ).unwrap();

    pub static ref INSTALLATION_NUMBER: Regex = Regex::new(
        r"N[º°o]\.?\s*DO\s+CLIENTE\s+N[º°o]\.?\s*DA\s+INSTALA[ÇC][ÃA]O\s+\d+\s+(\d+)"
    ).unwrap();

    // "Referente a  Vencimento  Valor a pagar (R$)" then "JAN/2024  12/02/2024  172,59"
    pub static ref REFERENCE_MONTH: Regex = Regex::new(
        r"Referente\s+a\s+Vencimento\s+Valor\s+a\s+pagar\s+\(R\$\)\s+([A-Z]{3}/\d{4})"
    ).unwrap();

    pub static ref DUE_DATE: Regex = Regex::new(
        r"[A-Z]{3}/\d{4}\s+(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    pub static ref TOTAL_AFTER_DUE_DATE: Regex = Regex::new(
        r"[A-Z]{3}/\d{4}\s+\d{2}/\d{2}/\d{4}\s+(\d+(?:\.\d{3})*,\d{2})\b"
    ).unwrap();

    pub static ref TOTAL_NEXT_TO_DATE: Regex = Regex::new(
        r"\d{2}/\d{2}/\d{4}\s+(\d+(?:\.\d{3})*,\d{2})\b"
    ).unwrap();

    // Older layouts print the year on its own
    pub static ref REFERENCE_YEAR: Regex = Regex::new(
        r"(?i)ano\s+de\s+refer[êe]ncia[\s:]+(\d{4})\b"
    ).unwrap();

    // Energy table rows; the label is glued to the unit in the text layer
    pub static ref KWH_CONSUMPTION: Regex = Regex::new(
        r"Energia\s+El[ée]trica\s*kWh\s+(\d+(?:\.\d{3})*)"
    ).unwrap();

    pub static ref SCEEE_ENERGY: Regex = Regex::new(
        r"Energia\s+SCEE\s+s/\s*ICMS\s*kWh\s+(\d+(?:\.\d{3})*)"
    ).unwrap();

    pub static ref COMPENSATED_ENERGY: Regex = Regex::new(
        r"Energia\s+compensada\s+GD\s+I\s*kWh\s+(\d+(?:\.\d{3})*)"
    ).unwrap();

    pub static ref PUBLIC_LIGHTING: Regex = Regex::new(
        r"Contrib\s+Ilum\s+Publica\s+Municipal\s+(\d+(?:\.\d{3})*,\d+)"
    ).unwrap();

    // Generic energy row: unit, quantity, unit price, amount
    pub static ref ENERGY_ROW: Regex = Regex::new(
        r"kWh\s+\d+(?:\.\d{3})*\s+-?\d+,\d+\s+(-?\d+(?:\.\d{3})*,\d{2})\b"
    ).unwrap();

    // Legal-entity suffix at the end of a line
    pub static ref LEGAL_SUFFIX: Regex = Regex::new(
        r"(?:\b(?i:ltda|eireli)|\b(?:EPP|ME|S\.?\s?/?\s?A))\.?\s*$"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b"
    ).unwrap();

    pub static ref MONTH_TOKEN: Regex = Regex::new(
        r"^([A-Za-z]{3})/(\d{4})$"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_row_amount() {
        let caps = ENERGY_ROW
            .captures("Energia compensada GD IkWh 456 0,48783000 -222,45 0,50958000")
            .unwrap();
        assert_eq!(&caps[1], "-222,45");

        let caps = ENERGY_ROW
            .captures("Energia ElétricakWh 1.050 0,95628700 1.004,11 0,74906000")
            .unwrap();
        assert_eq!(&caps[1], "1.004,11");
    }

    #[test]
    fn test_legal_suffix() {
        assert!(LEGAL_SUFFIX.is_match("SELFWAY TREINAMENTO PERSONALIZADO LTDA"));
        assert!(LEGAL_SUFFIX.is_match("PADARIA BOM PAO Ltda."));
        assert!(LEGAL_SUFFIX.is_match("MERCADO CENTRAL S.A."));
        assert!(LEGAL_SUFFIX.is_match("MERCADO CENTRAL S/A"));
        assert!(LEGAL_SUFFIX.is_match("JOAO DA SILVA ME"));
        assert!(LEGAL_SUFFIX.is_match("OFICINA DO ZE EPP"));
        assert!(!LEGAL_SUFFIX.is_match("RUA HERCULANO DE FREITAS 215"));
        assert!(!LEGAL_SUFFIX.is_match("SEU NOME"));
    }

    #[test]
    fn test_header_numbers() {
        let text = "Nº DO CLIENTE      Nº DA INSTALAÇÃO\n   7204076116     3001116735\n";
        assert_eq!(&ACCOUNT_NUMBER.captures(text).unwrap()[1], "7204076116");
        assert_eq!(&INSTALLATION_NUMBER.captures(text).unwrap()[1], "3001116735");
    }
}
