//! Customer name from a legal-entity suffix line near an anchor phrase.

use async_trait::async_trait;

use crate::bill::rules::patterns::LEGAL_SUFFIX;
use crate::bill::text::BillText;
use crate::error::NameError;
use crate::models::bill::NameSource;

use super::{DistributorMatcher, NameStrategy};

/// Picks the line closest to the first anchor phrase that ends in a
/// company suffix (LTDA, S.A., ME, EPP, EIRELI).
pub struct LegalSuffixStrategy {
    anchors: Vec<String>,
    radius: usize,
    exclusions: Option<DistributorMatcher>,
}

impl LegalSuffixStrategy {
    pub fn new(anchors: Vec<String>, radius: usize) -> Self {
        Self {
            anchors,
            radius,
            exclusions: None,
        }
    }

    /// Skip lines naming a distributor (the utility's own letterhead
    /// usually ends in S.A.).
    pub fn with_exclusions(mut self, exclusions: DistributorMatcher) -> Self {
        self.exclusions = Some(exclusions);
        self
    }

    fn is_excluded(&self, line: &str) -> bool {
        self.exclusions
            .as_ref()
            .is_some_and(|matcher| matcher.matches_line(line))
    }

    fn find(&self, text: &BillText) -> Option<String> {
        let center = self
            .anchors
            .iter()
            .find_map(|anchor| text.find_line(anchor))?;

        text.neighborhood(center, self.radius)
            .into_iter()
            .map(|(_, line)| line.trim())
            .filter(|line| line.len() > 3)
            .filter(|line| !self.anchors.iter().any(|a| line.contains(a.as_str())))
            .filter(|line| !self.is_excluded(line))
            .find(|line| LEGAL_SUFFIX.is_match(line))
            .map(str::to_string)
    }
}

#[async_trait]
impl NameStrategy for LegalSuffixStrategy {
    fn source(&self) -> NameSource {
        NameSource::LegalSuffix
    }

    async fn resolve(&self, text: &BillText) -> Result<String, NameError> {
        self.find(text).ok_or(NameError::NoCandidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(radius: usize) -> LegalSuffixStrategy {
        LegalSuffixStrategy::new(vec!["Nº DO CLIENTE".to_string()], radius)
    }

    #[test]
    fn test_nearest_suffix_line_wins() {
        let text = BillText::new(
            "FAR AWAY COMERCIO LTDA\nfiller\nPADARIA BOM PAO EPP\nNº DO CLIENTE\n123",
        );
        assert_eq!(strategy(5).find(&text).as_deref(), Some("PADARIA BOM PAO EPP"));
    }

    #[test]
    fn test_radius_bounds_the_search() {
        let text = BillText::new("ACME LTDA\na\nb\nc\nNº DO CLIENTE");
        assert_eq!(strategy(2).find(&text), None);
        assert_eq!(strategy(4).find(&text).as_deref(), Some("ACME LTDA"));
    }

    #[test]
    fn test_exclusions_skip_letterhead() {
        let text = BillText::new("CEMIG DISTRIBUIÇÃO S.A.\nNº DO CLIENTE\nMERCADO DO BAIRRO ME");
        let s = strategy(3).with_exclusions(DistributorMatcher::with_names(["CEMIG"]));
        assert_eq!(s.find(&text).as_deref(), Some("MERCADO DO BAIRRO ME"));

        let text = BillText::new("CEMIG DISTRIBUIÇÃO S.A.\nNº DO CLIENTE");
        assert_eq!(s.find(&text), None);
    }

    #[test]
    fn test_exclusions_match_whole_words() {
        let s = strategy(3).with_exclusions(DistributorMatcher::new());

        let text = BillText::new("PENELOPE MODAS LTDA\nNº DO CLIENTE");
        assert_eq!(s.find(&text).as_deref(), Some("PENELOPE MODAS LTDA"));

        let text = BillText::new("ENEL DISTRIBUIÇÃO S.A.\nNº DO CLIENTE\nDELIGHT DOCES LTDA");
        assert_eq!(s.find(&text).as_deref(), Some("DELIGHT DOCES LTDA"));
    }

    #[test]
    fn test_no_anchor_no_candidate() {
        let text = BillText::new("ACME LTDA");
        assert_eq!(strategy(10).find(&text), None);
    }

    #[tokio::test]
    async fn test_resolve_reports_no_candidate() {
        let result = strategy(3).resolve(&BillText::new("Nº DO CLIENTE\n42")).await;
        assert_eq!(result, Err(NameError::NoCandidate));
    }
}
