//! `fatura`: reads Brazilian electricity bills (text-layer PDFs or text
//! dumps) and writes the billing record as JSON, CSV or a text summary.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use commands::{batch, config, process};

/// Extract account, consumption and compensation figures from energy bills
#[derive(Parser)]
#[command(name = "fatura")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (default: the per-user fatura config)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one bill
    Process(process::ProcessArgs),

    /// Extract every bill matching a glob, concurrently
    Batch(batch::BatchArgs),

    /// Inspect or edit the configuration file
    Config(config::ConfigArgs),
}

fn verbosity_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Logs go to stderr so stdout stays clean for the extracted record.
fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_level(verbose).as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Config(args) => config::run(args).await,
    }
}
