//! # offert-core: Pure Pricing Logic for Offert
//!
//! This crate computes every figure on a Swedish construction quote: row
//! subtotals, cost buckets, markup, moms and the ROT/RUT tax deductions.
//! It has no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Offert Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    offert-cli (binary)                          │   │
//! │  │    totals ──► import ──► payroll ──► config                     │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │                 │              ┌───────────────▼───────────────────┐   │
//! │                 │              │   offert-transfer                 │   │
//! │                 │              │   CSV import, PAXml export        │   │
//! │                 │              └───────────────┬───────────────────┘   │
//! │  ┌──────────────▼──────────────────────────────▼───────────────────┐   │
//! │  │               ★ offert-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  pricing  │  │ deduction │  │ estimate  │  │   │
//! │  │   │ LineItem  │  │  Totals   │  │  ROT/RUT  │  │ Estimate  │  │   │
//! │  │   │   Addon   │  │  markup   │  │   caps    │  │  summary  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FLOATS • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Line items, addons, percentages, deduction policy
//! - [`money`] - Exact decimal money in kronor
//! - [`pricing`] - Row subtotals and quote totals
//! - [`deduction`] - ROT/RUT amounts and ceilings
//! - [`estimate`] - Editable quote aggregate
//! - [`summary`] - Labelled rows for documents
//! - [`category`] - Spreadsheet category → item kind
//! - [`validation`] - Form-level input checks
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **One engine**: every surface gets its figures from [`compute_totals`]
//! 2. **Exact money**: decimal arithmetic, rounded to öre only for display
//! 3. **Lenient input**: missing or malformed numbers count as zero
//! 4. **Explicit errors**: editing operations return typed errors, never panic
//!
//! ## Example Usage
//!
//! ```rust
//! use offert_core::{Estimate, LineItem, Money, Percent, TaxDeductionPolicy};
//! use rust_decimal::Decimal;
//!
//! let mut estimate = Estimate::new("Badrum")
//!     .with_global_markup(Percent::from_whole(10))
//!     .with_policy(TaxDeductionPolicy::rot(Percent::from_whole(30)));
//!
//! estimate
//!     .add_item(LineItem::labor("Plattsättning", Decimal::from(10), Money::from_kronor(500)).with_rot())
//!     .unwrap();
//!
//! let totals = estimate.totals();
//! assert_eq!(totals.total_incl_vat, Money::from_kronor(6_875));
//! assert_eq!(totals.amount_to_pay, Money::from_kronor(5_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod category;
pub mod deduction;
pub mod error;
pub mod estimate;
pub mod money;
pub mod pricing;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use deduction::{compute_deductions, DeductionBreakdown, DeductionWarning};
pub use error::{CoreError, CoreResult, ValidationError};
pub use estimate::Estimate;
pub use money::Money;
pub use pricing::{compute_item_subtotal, compute_totals, MarkupSource, Totals};
pub use summary::{EstimateSummary, RowStyle, SummaryRow};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Unit marking a fixed-price row: subtotal is the unit price, whatever the
/// quantity or hours say.
pub const KLUMP_UNIT: &str = "klump";

/// Maximum rows in a single estimate.
pub const MAX_ESTIMATE_ITEMS: usize = 500;

/// Highest markup percentage the editor accepts.
pub const MAX_MARKUP_PERCENT: i64 = 1000;
