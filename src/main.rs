use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use histfx::core::log::init_logging;
use histfx::input::parse_past_date;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Historical date for the conversion, YYYY-MM-DD (must be in the past)
    #[arg(value_parser = parse_past_date)]
    date: NaiveDate,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long)]
    config_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = histfx::run(cli.date, cli.config_path.as_deref()).await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
