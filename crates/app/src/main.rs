use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use csv2qif_core::{month_start, AccountKind};
use csv2qif_import::{decode, load_rules, CategoryRuleEngine, Converter};

/// Credit Suisse online banking CSV to QIF converter.
#[derive(Parser)]
#[command(name = "csv2qif", version, about)]
struct Cli {
    /// Input CSV containing the exported transactions.
    #[arg(long)]
    filein: PathBuf,

    /// Output file in the QIF format.
    #[arg(long, default_value = "export.qif")]
    fileout: PathBuf,

    /// The file to convert is a credit card export.
    #[arg(long)]
    cc: bool,

    /// Start date for analysis, format YYYYMMDD. Transactions before it
    /// are dropped. Defaults to the first day of the current month.
    #[arg(long, value_parser = parse_start_date)]
    start_date: Option<NaiveDate>,

    /// Logging verbosity (error, warn, info, debug, trace).
    #[arg(long, default_value = "error")]
    log_level: tracing::Level,
}

fn parse_start_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, "%Y%m%d")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_string())),
        )
        .init();

    let kind = if cli.cc {
        AccountKind::CreditCard
    } else {
        AccountKind::Deposit
    };
    let today = chrono::Local::now().date_naive();
    let start_date = cli.start_date.unwrap_or_else(|| month_start(today));

    tracing::info!(
        "run parameters: {}, {}, {:?}, {}",
        cli.filein.display(),
        cli.fileout.display(),
        kind,
        start_date
    );

    let rules = match directories::ProjectDirs::from("", "", "csv2qif") {
        Some(dirs) => load_rules(&dirs.config_dir().join("categories.json"))?,
        None => {
            tracing::warn!("could not determine a config directory; no categories loaded");
            Vec::new()
        }
    };
    let engine = CategoryRuleEngine::new(rules)?;

    tracing::debug!("opening {}", cli.filein.display());
    let raw = std::fs::read(&cli.filein)
        .with_context(|| format!("failed to read {}", cli.filein.display()))?;
    let text = decode(&raw);

    tracing::debug!("opening {}", cli.fileout.display());
    let out = File::create(&cli.fileout)
        .with_context(|| format!("failed to create {}", cli.fileout.display()))?;
    let mut out = BufWriter::new(out);

    let transactions = Converter::new(kind, start_date, engine)
        .with_today(today)
        .convert(text.as_bytes(), &mut out)?;
    out.flush()
        .with_context(|| format!("failed to write {}", cli.fileout.display()))?;

    tracing::info!(
        "wrote {} transactions to {}",
        transactions.len(),
        cli.fileout.display()
    );
    Ok(())
}
