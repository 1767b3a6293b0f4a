//! # Estimate Summary
//!
//! Turns [`Totals`] into the labelled rows printed at the bottom of a quote.
//! Renderers (PDF, Word, preview, CLI) only lay the rows out; they never
//! do arithmetic of their own.
//!
//! ```text
//! Arbetskostnad                    5 000,00 kr
//! Påslag 10 %                        500,00 kr
//! Summa exkl. moms                 5 500,00 kr
//! Moms 25 %                        1 375,00 kr
//! Totalt inkl. moms                6 875,00 kr
//! ROT-avdrag 30 %                 -1 875,00 kr
//! Att betala                       5 000,00 kr
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::{MarkupSource, Totals};
use crate::types::{ItemKind, Percent, TaxDeductionPolicy};

/// How a renderer should treat a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RowStyle {
    /// Ordinary cost line.
    Line,
    /// Shown for information; already included in the lines above.
    Info,
    /// Bold sum line.
    Total,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SummaryRow {
    pub label: String,
    /// Rounded to whole öre.
    pub amount: Money,
    pub style: RowStyle,
}

impl SummaryRow {
    fn new(label: impl Into<String>, amount: Money, style: RowStyle) -> Self {
        SummaryRow {
            label: label.into(),
            amount: amount.round_ore(),
            style,
        }
    }
}

/// Labelled figures for a quote document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EstimateSummary {
    pub rows: Vec<SummaryRow>,
    /// Cap warnings, already phrased for the customer.
    pub notes: Vec<String>,
}

impl EstimateSummary {
    /// Builds the summary rows from computed totals.
    ///
    /// Zero cost buckets are left out. The three sum lines (excl. moms,
    /// incl. moms, att betala) are always present.
    pub fn new(totals: &Totals, policy: &TaxDeductionPolicy, global_markup: Percent) -> Self {
        let mut rows = Vec::new();

        for kind in ItemKind::ALL {
            let cost = totals.cost_for(kind);
            if !cost.is_zero() {
                rows.push(SummaryRow::new(kind.label(), cost, RowStyle::Line));
            }
        }
        if !totals.addons_cost.is_zero() {
            rows.push(SummaryRow::new("Tillval", totals.addons_cost, RowStyle::Line));
        }

        match totals.markup_source {
            MarkupSource::Global => rows.push(SummaryRow::new(
                format!("Påslag {}", global_markup),
                totals.markup,
                RowStyle::Line,
            )),
            MarkupSource::PerItem => {
                rows.push(SummaryRow::new("varav påslag", totals.markup, RowStyle::Info))
            }
            MarkupSource::None => {}
        }

        rows.push(SummaryRow::new(
            "Summa exkl. moms",
            totals.total_excl_vat,
            RowStyle::Total,
        ));
        rows.push(SummaryRow::new(
            format!("Moms {}", Percent::VAT),
            totals.vat,
            RowStyle::Line,
        ));
        rows.push(SummaryRow::new(
            "Totalt inkl. moms",
            totals.total_incl_vat,
            RowStyle::Total,
        ));

        if !totals.rot_amount.is_zero() {
            rows.push(SummaryRow::new(
                format!("ROT-avdrag {}", policy.rot_percent),
                -totals.rot_amount,
                RowStyle::Line,
            ));
        }
        if !totals.rut_amount.is_zero() {
            rows.push(SummaryRow::new(
                format!("RUT-avdrag {}", policy.rut_percent()),
                -totals.rut_amount,
                RowStyle::Line,
            ));
        }

        // Combined ceiling: give back what the two rows above over-subtract
        let listed = totals.rot_amount + totals.rut_amount;
        if listed > totals.combined_deduction {
            rows.push(SummaryRow::new(
                "Begränsning av avdrag",
                listed - totals.combined_deduction,
                RowStyle::Line,
            ));
        }

        rows.push(SummaryRow::new(
            "Att betala",
            totals.amount_to_pay,
            RowStyle::Total,
        ));

        EstimateSummary {
            rows,
            notes: totals.warnings.iter().map(|w| w.message()).collect(),
        }
    }

    /// Looks up a row by label.
    pub fn row(&self, label: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|row| row.label == label)
    }

    /// Plain-text table, amounts right-aligned.
    pub fn render_text(&self) -> String {
        let amounts: Vec<String> = self.rows.iter().map(|row| row.amount.to_string()).collect();
        let label_width = self
            .rows
            .iter()
            .map(|row| row.label.chars().count())
            .max()
            .unwrap_or(0);
        let amount_width = amounts.iter().map(|a| a.chars().count()).max().unwrap_or(0);

        let mut out = String::new();
        for (row, amount) in self.rows.iter().zip(&amounts) {
            if row.style == RowStyle::Total {
                out.push_str(&"-".repeat(label_width + amount_width + 2));
                out.push('\n');
            }
            let label_pad = label_width - row.label.chars().count();
            let amount_pad = amount_width - amount.chars().count();
            out.push_str(&row.label);
            out.push_str(&" ".repeat(label_pad + amount_pad + 2));
            out.push_str(amount);
            out.push('\n');
        }
        for note in &self.notes {
            out.push_str("! ");
            out.push_str(note);
            out.push('\n');
        }
        out
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
