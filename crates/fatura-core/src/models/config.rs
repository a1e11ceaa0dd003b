//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::models::bill::BillField;

/// Main configuration for the fatura pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaturaConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Name resolution configuration.
    pub names: NamesConfig,

    /// Entity recognition service configuration.
    pub ner: NerConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,
}

/// An additional catalog entry supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    /// Field the pattern fills.
    pub field: BillField,

    /// Layout fragment the pattern targets.
    #[serde(default)]
    pub target: String,

    /// Regular expression; the first capture group is the value.
    pub pattern: String,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extra patterns tried after the built-in ones for the same field.
    pub extra_patterns: Vec<PatternSpec>,

    /// Record a warning when the scanner finds fewer than three energy rows.
    pub warn_on_short_amounts: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            extra_patterns: Vec::new(),
            warn_on_short_amounts: true,
        }
    }
}

/// Name resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    /// Phrases the customer name is expected to sit near.
    pub anchors: Vec<String>,

    /// How many lines around an anchor are searched.
    pub neighborhood_radius: usize,

    /// Distributor identifiers added to the built-in dictionary.
    pub extra_distributors: Vec<String>,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            anchors: vec!["Nº DO CLIENTE".to_string(), "DADOS DO CLIENTE".to_string()],
            neighborhood_radius: 8,
            extra_distributors: Vec::new(),
        }
    }
}

/// Entity recognition service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    /// Whether the service is called at all.
    pub enabled: bool,

    /// Service endpoint.
    pub endpoint: Option<String>,

    /// Language code sent with each request.
    pub language: String,

    /// Upper bound for one call, in milliseconds.
    pub timeout_ms: u64,

    /// Lines sent when no anchor phrase is found.
    pub snippet_lines: usize,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            language: "pt".to_string(),
            timeout_ms: 3000,
            snippet_lines: 40,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text length to consider a PDF text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 50 }
    }
}

impl FaturaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
