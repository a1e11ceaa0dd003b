//! Process command - extract data from a single bill file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use fatura_core::bill::BillParser;
use fatura_core::bill::rules::format_locale_amount;
use fatura_core::models::bill::{BillRecord, SourceType};
use fatura_core::models::config::FaturaConfig;
use fatura_core::pdf::{PdfExtractor, PdfProcessor, PdfType};

use super::config::load_config;
use super::ner::recognizer_from_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print the document text and stop before field extraction
    #[arg(long)]
    text_only: bool,

    /// Show extraction confidence scores
    #[arg(long)]
    show_confidence: bool,

    /// Validate extracted data
    #[arg(long)]
    validate: bool,

    /// Entity recognition endpoint (enables the service for this run)
    #[arg(long)]
    ner_endpoint: Option<String>,

    /// Entity recognition timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(endpoint) = &args.ner_endpoint {
        config.ner.enabled = true;
        config.ner.endpoint = Some(endpoint.clone());
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.ner.timeout_ms = timeout_ms;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Reading document...");
    pb.set_position(10);
    let (text, source_type) = load_text(&args.input, &config)?;

    if args.text_only {
        pb.finish_and_clear();
        return write_output(args.output.as_deref(), &text);
    }

    pb.set_message("Extracting bill data...");
    pb.set_position(50);

    let parser = build_parser(&config)?;
    let result = parser.parse_with_source(&text, source_type).await?;
    let record = result.record;

    pb.set_position(100);
    pb.finish_with_message("Done");

    if args.validate {
        let issues = record.validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
        for error in &result.field_errors {
            eprintln!("  - {}", error);
        }
    }

    let output = format_record(&record, args.format)?;
    write_output(args.output.as_deref(), &output)?;

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.1}%",
            style("ℹ").blue(),
            record.metadata.confidence * 100.0
        );
        if !record.metadata.missing_fields.is_empty() {
            println!(
                "{} Missing fields: {}",
                style("ℹ").blue(),
                record.metadata.missing_fields.join(", ")
            );
        }
        if let Some(time_ms) = record.metadata.processing_time_ms {
            println!("{} Processing time: {}ms", style("ℹ").blue(), time_ms);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Parser for the configuration, with the entity recognizer when enabled.
pub fn build_parser(config: &FaturaConfig) -> anyhow::Result<BillParser> {
    let recognizer = recognizer_from_config(&config.ner)?;
    Ok(BillParser::from_config(config, recognizer)?)
}

/// Document text and its source type.
pub fn load_text(path: &Path, config: &FaturaConfig) -> anyhow::Result<(String, SourceType)> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            let mut extractor =
                PdfExtractor::new().with_min_text_length(config.pdf.min_text_length);
            extractor.load(&data)?;
            debug!("PDF has {} pages", extractor.page_count());

            let content = extractor.extract_all()?;
            match content.pdf_type {
                PdfType::Text => Ok((content.text, content.pdf_type.source_type())),
                PdfType::Image => anyhow::bail!(
                    "PDF is image-based (scanned); only bills with a text layer are supported"
                ),
                PdfType::Empty => anyhow::bail!("PDF appears to be empty"),
            }
        }
        "txt" | "text" => Ok((fs::read_to_string(path)?, SourceType::PlainText)),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

fn write_output(path: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content)?;
            println!("{} Output written to {}", style("✓").green(), path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

pub fn format_record(record: &BillRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

const CSV_HEADER: [&str; 16] = [
    "account_number",
    "installation_number",
    "distributor",
    "customer_name",
    "month",
    "year",
    "due_date",
    "total_value",
    "total_value_without_gd",
    "kwh_consumption",
    "sceee_energy",
    "electric_energy_consumption",
    "compensated_energy_quantity",
    "compensated_energy_money",
    "public_lighting_contribution",
    "confidence",
];

fn csv_row(record: &BillRecord) -> Vec<String> {
    let opt = |value: Option<rust_decimal::Decimal>| value.map(|v| v.to_string()).unwrap_or_default();

    vec![
        record.account_number.clone(),
        record.installation_number.clone().unwrap_or_default(),
        record.distributor.clone().unwrap_or_default(),
        record.customer_name.clone().unwrap_or_default(),
        record.month.clone(),
        record.year.map(|y| y.to_string()).unwrap_or_default(),
        record.due_date.map(|d| d.to_string()).unwrap_or_default(),
        record.total_value.to_string(),
        opt(record.total_value_without_gd),
        record.kwh_consumption.to_string(),
        record.sceee_energy.to_string(),
        opt(record.electric_energy_consumption),
        record.compensated_energy_quantity.to_string(),
        opt(record.compensated_energy_money),
        record.public_lighting_contribution.to_string(),
        format!("{:.2}", record.metadata.confidence),
    ]
}

fn format_csv(record: &BillRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    wtr.write_record(csv_row(record))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &BillRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Account: {}\n", record.account_number));
    if let Some(installation) = &record.installation_number {
        output.push_str(&format!("Installation: {}\n", installation));
    }
    if let Some(distributor) = &record.distributor {
        output.push_str(&format!("Distributor: {}\n", distributor));
    }
    if let Some(name) = &record.customer_name {
        output.push_str(&format!("Customer: {}\n", name));
    }
    output.push_str(&format!("Reference: {}\n", record.month));
    if let Some(due_date) = record.due_date {
        output.push_str(&format!("Due: {}\n", due_date.format("%d/%m/%Y")));
    }
    output.push('\n');

    output.push_str("Energy:\n");
    output.push_str(&format!("  Consumption:  {} kWh\n", record.kwh_consumption));
    output.push_str(&format!("  SCEE:         {} kWh\n", record.sceee_energy));
    if let Some(total) = record.electric_energy_consumption {
        output.push_str(&format!("  Total:        {} kWh\n", total));
    }
    output.push_str(&format!(
        "  Compensated:  {} kWh\n",
        record.compensated_energy_quantity
    ));
    output.push('\n');

    output.push_str("Amounts:\n");
    output.push_str(&format!(
        "  To pay:          R$ {}\n",
        format_locale_amount(record.total_value)
    ));
    if let Some(value) = record.total_value_without_gd {
        output.push_str(&format!(
            "  Without GD:      R$ {}\n",
            format_locale_amount(value)
        ));
    }
    if let Some(value) = record.compensated_energy_money {
        output.push_str(&format!(
            "  GD credit:       R$ {}\n",
            format_locale_amount(value)
        ));
    }
    output.push_str(&format!(
        "  Public lighting: R$ {}\n",
        format_locale_amount(record.public_lighting_contribution)
    ));

    output
}

/// Shared by the batch command for its summary file.
pub fn summary_row(path: &Path, record: Option<&BillRecord>, error: Option<&str>, time_ms: u64) -> Vec<String> {
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string();

    match record {
        Some(record) => {
            let mut row = vec![filename, "success".to_string()];
            row.extend(csv_row(record));
            row.push(time_ms.to_string());
            row.push(String::new());
            row
        }
        None => {
            let mut row = vec![filename, "error".to_string()];
            row.extend(std::iter::repeat_n(String::new(), CSV_HEADER.len()));
            row.push(time_ms.to_string());
            row.push(error.unwrap_or("unknown error").to_string());
            row
        }
    }
}

pub fn summary_header() -> Vec<&'static str> {
    let mut header = vec!["filename", "status"];
    header.extend(CSV_HEADER);
    header.extend(["processing_time_ms", "error"]);
    header
}

/// A parser handle that can be shared across batch workers.
pub fn shared_parser(config: &FaturaConfig) -> anyhow::Result<Arc<BillParser>> {
    Ok(Arc::new(build_parser(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatura_core::models::bill::ExtractionMetadata;
    use rust_decimal::Decimal;

    fn record() -> BillRecord {
        BillRecord {
            account_number: "7204076116".to_string(),
            installation_number: Some("3001116735".to_string()),
            distributor: Some("CEMIG".to_string()),
            customer_name: Some("ACME LTDA".to_string()),
            month: "JAN/2024".to_string(),
            year: Some(2024),
            due_date: chrono::NaiveDate::from_ymd_opt(2024, 2, 12),
            total_value: Decimal::new(17259, 2),
            total_value_without_gd: Some(Decimal::new(39504, 2)),
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
    fn test_csv_output() {
        let csv = format_record(&record(), OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert!(lines
            .next()
            .unwrap()
            .starts_with("account_number,installation_number,distributor,customer_name,month,year,due_date"));
        assert!(lines
            .next()
            .unwrap()
            .starts_with("7204076116,3001116735,CEMIG,ACME LTDA,JAN/2024,2024,2024-02-12,172.59,395.04"));

        let mut without_year = record();
        without_year.year = None;
        let csv = format_record(&without_year, OutputFormat::Csv).unwrap();
        assert!(csv.contains(",JAN/2024,,2024-02-12,"));
    }

    #[test]
    fn test_text_output_uses_locale_amounts() {
        let text = format_record(&record(), OutputFormat::Text).unwrap();
        assert!(text.contains("Due: 12/02/2024"));
        assert!(text.contains("R$ 395,04"));
        assert!(text.contains("Total:        506 kWh"));
    }

    #[test]
    fn test_summary_rows_match_header() {
        let header = summary_header();
        let ok = summary_row(Path::new("/tmp/a.pdf"), Some(&record()), None, 12);
        let failed = summary_row(Path::new("b.pdf"), None, Some("boom"), 3);

        assert_eq!(ok.len(), header.len());
        assert_eq!(failed.len(), header.len());
        assert_eq!(ok[0], "a.pdf");
        assert_eq!(failed.last().map(String::as_str), Some("boom"));
    }

    #[test]
    fn test_load_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bill.txt");
        std::fs::write(&path, "Nº DO CLIENTE").unwrap();

        let (text, source) = load_text(&path, &FaturaConfig::default()).unwrap();
        assert_eq!(text, "Nº DO CLIENTE");
        assert_eq!(source, SourceType::PlainText);

        assert!(load_text(&dir.path().join("bill.png"), &FaturaConfig::default()).is_err());
    }
}
