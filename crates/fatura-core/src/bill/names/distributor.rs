//! Distributor identification from a fixed dictionary.

use regex::Regex;
use tracing::debug;

use crate::bill::text::BillText;

/// Distribution utilities recognized out of the box.
pub const KNOWN_DISTRIBUTORS: &[&str] = &[
    "CEMIG",
    "ENEL",
    "LIGHT",
    "COPEL",
    "CPFL",
    "ENERGISA",
    "EQUATORIAL",
    "CELESC",
    "COELBA",
    "NEOENERGIA",
    "ELEKTRO",
    "CEEE",
];

/// Matches known distributor identifiers as whole words.
#[derive(Debug, Clone)]
pub struct DistributorMatcher {
    names: Vec<(String, Regex)>,
}

impl DistributorMatcher {
    pub fn new() -> Self {
        Self::with_names(KNOWN_DISTRIBUTORS.iter().copied())
    }

    /// Matcher over an explicit dictionary.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let names = names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .filter_map(|name| {
                let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(name))).ok()?;
                Some((name.to_string(), pattern))
            })
            .collect();
        Self { names }
    }

    /// Add identifiers to the dictionary.
    pub fn extend<I, S>(self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all: Vec<String> = self.names.into_iter().map(|(name, _)| name).collect();
        all.extend(extra.into_iter().map(Into::into));
        Self::with_names(all)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|(name, _)| name.as_str())
    }

    /// Whether any dictionary entry occurs in `line` as a whole word.
    pub fn matches_line(&self, line: &str) -> bool {
        self.names.iter().any(|(_, pattern)| pattern.is_match(line))
    }

    /// The dictionary entry that occurs earliest in the text.
    pub fn find(&self, text: &BillText) -> Option<String> {
        let found = self
            .names
            .iter()
            .filter_map(|(name, pattern)| pattern.find(text.as_str()).map(|m| (m.start(), name)))
            .min_by_key(|(start, _)| *start)
            .map(|(_, name)| name.clone());

        debug!("Distributor: {:?}", found);
        found
    }
}

impl Default for DistributorMatcher {
    fn default() -> Self {
        Self::new()
    }
}
