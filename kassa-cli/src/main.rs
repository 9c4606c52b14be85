mod config;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kassa_core::{build_journal, Journal, Source};
use kassa_ingest::{CsvStatementParser, StatementParser};

#[derive(Parser)]
#[command(name = "kassa", version, about = "Multi-currency bank statement journal")]
struct Cli {
    /// Path to the YAML configuration
    #[arg(short, long, default_value = "kassa.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dump the journal entries as JSON
    Journal,
    /// Print monthly expense/income totals per category
    Report,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let app = config::load_config(&cli.config)?;
    let journal = load_journal(&app)?;

    match cli.command {
        Command::Journal => println!("{}", serde_json::to_string_pretty(&journal.entries)?),
        Command::Report => print!("{}", report::render_monthly(&journal)),
    }
    Ok(())
}

fn load_journal(app: &config::AppConfig) -> Result<Journal> {
    let mut transactions = Vec::new();
    for spec in &app.statements {
        let source = Source {
            tag: spec.tag.clone(),
            file: spec.path.display().to_string(),
            account_number: spec.account_number.clone(),
            account_currency: spec.account_currency.clone(),
        };
        let parser = CsvStatementParser::new(spec.layout.clone(), source);
        let mut parsed = parser.parse(&spec.path)?;
        tracing::info!(file = %spec.path.display(), rows = parsed.len(), "statement parsed");
        transactions.append(&mut parsed);
    }

    build_journal(transactions, &app.journal).context("building the journal")
}
