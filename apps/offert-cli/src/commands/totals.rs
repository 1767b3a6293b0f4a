//! `offert totals`: prints the figures for an estimate file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use offert_core::validation::validate_line_item;
use offert_core::{Addon, Estimate, LineItem, Percent, TaxDeductionPolicy};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::OffertConfig;

#[derive(Args, Debug)]
pub struct TotalsArgs {
    /// Estimate JSON file.
    pub estimate: PathBuf,

    /// Print the full totals as JSON instead of the summary table.
    #[arg(long)]
    pub json: bool,
}

/// Estimate file as written by the editor. Policy and markup may be missing;
/// config fills them in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EstimateFile {
    #[serde(default)]
    title: String,
    #[serde(default)]
    items: Vec<LineItem>,
    #[serde(default)]
    addons: Vec<Addon>,
    policy: Option<TaxDeductionPolicy>,
    global_markup_percent: Option<Percent>,
}

impl EstimateFile {
    fn into_estimate(self, config: &OffertConfig) -> Estimate {
        Estimate {
            title: self.title,
            items: self.items,
            addons: self.addons,
            policy: self.policy.unwrap_or_else(|| config.policy()),
            global_markup_percent: self
                .global_markup_percent
                .unwrap_or_else(|| config.global_markup()),
        }
    }
}

pub fn read_estimate(path: &Path, config: &OffertConfig) -> Result<Estimate> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file: EstimateFile = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid estimate file", path.display()))?;
    Ok(file.into_estimate(config))
}

pub fn run(args: TotalsArgs, config: &OffertConfig) -> Result<()> {
    let estimate = read_estimate(&args.estimate, config)?;

    // Pricing never rejects input; surface what the editor would have flagged
    for item in &estimate.items {
        if let Err(e) = validate_line_item(item) {
            warn!(item = %item.name(), error = %e, "Line item fails validation");
        }
    }

    let totals = estimate.totals();
    info!(
        items = estimate.item_count(),
        total_incl_vat = %totals.total_incl_vat,
        amount_to_pay = %totals.amount_to_pay,
        "Estimate computed"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&totals)?);
    } else {
        if !estimate.title.is_empty() {
            println!("{}\n", estimate.title);
        }
        print!("{}", estimate.summary().render_text());
    }

    Ok(())
}
