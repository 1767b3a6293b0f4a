//! `offert payroll`: exports a time report as PAXml.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use offert_transfer::{export_paxml, ExportHeader, PayrollSystem, TimeReport};
use tracing::info;

use crate::config::OffertConfig;

#[derive(Args, Debug)]
pub struct PayrollArgs {
    /// Time report JSON file.
    pub report: PathBuf,

    /// Target payroll system (fortnox or visma); defaults to `[payroll] system`.
    #[arg(short, long)]
    pub system: Option<PayrollSystem>,

    /// Where to write the XML. Prints to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Company fields in the report win over config.
fn export_header(report: &TimeReport, config: &OffertConfig) -> ExportHeader {
    ExportHeader {
        company_name: report
            .company_name
            .clone()
            .or_else(|| config.payroll.company_name.clone()),
        org_number: report
            .org_number
            .clone()
            .or_else(|| config.payroll.org_number.clone()),
        created: Local::now().naive_local(),
    }
}

pub fn run(args: PayrollArgs, config: &OffertConfig) -> Result<()> {
    let contents = std::fs::read_to_string(&args.report)
        .with_context(|| format!("Failed to read {}", args.report.display()))?;
    let report: TimeReport = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid time report", args.report.display()))?;

    let system = args.system.unwrap_or(config.payroll.system);
    let xml = export_paxml(&report.entries, system, &export_header(&report, config))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, xml)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), %system, "Payroll file written");
        }
        None => print!("{}", xml),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_company_wins_over_config() {
        let report = TimeReport {
            company_name: Some("Rapport AB".to_string()),
            ..Default::default()
        };
        let mut config = OffertConfig::default();
        config.payroll.company_name = Some("Config AB".to_string());
        config.payroll.org_number = Some("556677-8899".to_string());

        let header = export_header(&report, &config);
        assert_eq!(header.company_name.as_deref(), Some("Rapport AB"));
        assert_eq!(header.org_number.as_deref(), Some("556677-8899"));
    }
}
