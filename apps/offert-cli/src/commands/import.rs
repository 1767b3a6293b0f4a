//! `offert import`: reads a spreadsheet article list into an estimate file.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use offert_core::Estimate;
use offert_transfer::import::Field;
use offert_transfer::{import_csv, ImportReport};
use tracing::{info, warn};

use crate::config::OffertConfig;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// CSV file (export from Excel with "CSV UTF-8").
    pub file: PathBuf,

    /// Where to write the estimate JSON. Prints to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Field separator, overrides `[import] delimiter`.
    #[arg(short, long)]
    pub delimiter: Option<char>,
}

const FIELDS: [Field; 6] = [
    Field::Name,
    Field::Quantity,
    Field::Unit,
    Field::UnitPrice,
    Field::Hours,
    Field::Category,
];

fn log_mapping(report: &ImportReport) {
    for field in FIELDS {
        match report.mapping.column(field) {
            Some(column) => {
                let header = report.headers.get(column).map(String::as_str).unwrap_or("");
                info!(%field, column, header, "Column matched");
            }
            None => info!(%field, "No column for field"),
        }
    }
}

/// Builds an estimate titled after the file, enforcing the row limit.
fn into_estimate(report: ImportReport, source: &Path, config: &OffertConfig) -> Result<Estimate> {
    let title = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut estimate = Estimate::new(title)
        .with_global_markup(config.global_markup())
        .with_policy(config.policy());
    for item in report.items {
        estimate.add_item(item)?;
    }
    Ok(estimate)
}

pub fn run(args: ImportArgs, config: &OffertConfig) -> Result<()> {
    let mut options = config.import_options();
    if let Some(delimiter) = args.delimiter {
        anyhow::ensure!(delimiter.is_ascii(), "Delimiter must be an ASCII character");
        options.delimiter = delimiter as u8;
    }

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let report = import_csv(file, &options)
        .with_context(|| format!("Failed to import {}", args.file.display()))?;

    log_mapping(&report);
    for skipped in &report.skipped {
        warn!(line = skipped.line, reason = %skipped.reason, "Row skipped");
    }

    let estimate = into_estimate(report, &args.file, config)?;
    let json = serde_json::to_string_pretty(&estimate)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), items = estimate.item_count(), "Estimate written");
        }
        None => println!("{}", json),
    }

    Ok(())
}
