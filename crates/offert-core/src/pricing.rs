//! # Pricing Engine
//!
//! The single source of truth for every figure on a quote.
//!
//! ## Who Calls This
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       One Engine, Many Surfaces                         │
//! │                                                                         │
//! │  Table editor ───────► compute_item_subtotal()   (every field edit)    │
//! │  Totals panel ───────► compute_totals()          (every render)        │
//! │  Tax panel ──────────► compute_deductions()      (ROT/RUT part only)   │
//! │  Document export ────► compute_totals()          (once, at export)     │
//! │  Live preview ───────► compute_totals()          (reactively)          │
//! │                                                                         │
//! │  Same inputs ⇒ same Totals, on every surface.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals Pipeline
//! ```text
//! items ──► partition by kind ──► labor │ material │ UE
//!                                    │
//! addons (selected) ─────────────────┤
//!                                    ▼
//!                               subtotal_all
//!                                    │
//!             per-item markup set? ──┼── yes: markup already in subtotals
//!                                    └── no:  subtotal_all × global %
//!                                    ▼
//!                             total excl. moms ──► × 25 % ──► moms
//!                                    ▼
//!                             total incl. moms ──► − ROT/RUT ──► att betala
//! ```
//!
//! Nothing here fails. Missing numbers count as zero, negative prices pass
//! through untouched, and capped deductions come back with warnings.
//! Figures too large for a `Decimal` saturate at its bounds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::deduction::{compute_deductions, DeductionWarning};
use crate::money::Money;
use crate::types::{Addon, ItemKind, LineItem, Percent, TaxDeductionPolicy};

// =============================================================================
// Item Level
// =============================================================================

/// Returns the pre-markup amount of a row.
///
/// - `unit = "klump"` → `unit_price`
/// - labor → `hours × unit_price`
/// - otherwise → `quantity × unit_price`
pub fn item_base(item: &LineItem) -> Money {
    if item.is_lump_sum() {
        return item.unit_price();
    }

    let factor = if item.kind().is_labor() {
        item.hours()
    } else {
        item.quantity()
    };

    item.unit_price().scale(factor.unwrap_or(Decimal::ZERO))
}

/// Returns the row's own markup amount, zero when markup is off.
pub fn item_markup(item: &LineItem) -> Money {
    match item.effective_markup() {
        Some(percent) => item_base(item).percent_of(percent),
        None => Money::zero(),
    }
}

/// Computes a row's subtotal: base plus its own markup.
///
/// ## Example
/// ```rust
/// use offert_core::pricing::compute_item_subtotal;
/// use offert_core::{LineItem, Money, Percent};
/// use rust_decimal::Decimal;
///
/// let tiles = LineItem::material("Kakel", Decimal::from(20), "m2", Money::from_kronor(250))
///     .with_markup(Percent::from_whole(15));
///
/// // 20 × 250 = 5000, + 15 % = 5750
/// assert_eq!(compute_item_subtotal(&tiles), Money::from_kronor(5_750));
/// ```
pub fn compute_item_subtotal(item: &LineItem) -> Money {
    item_base(item) + item_markup(item)
}

// =============================================================================
// Totals
// =============================================================================

/// Where the markup figure on a quote came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MarkupSource {
    /// At least one row has its own markup; the global percent is ignored.
    PerItem,
    /// No row has its own markup; the global percent applies to everything.
    Global,
    /// No markup at all.
    #[default]
    None,
}

/// Snapshot of every figure on a quote.
///
/// Pure view of the inputs: recompute instead of storing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Totals {
    pub labor_cost: Money,
    pub material_cost: Money,
    pub subcontractor_cost: Money,
    pub addons_cost: Money,
    /// labor + material + subcontractor + addons.
    pub subtotal_all: Money,
    pub markup: Money,
    pub markup_source: MarkupSource,
    pub total_excl_vat: Money,
    pub vat: Money,
    pub total_incl_vat: Money,
    pub rot_eligible_labor_cost: Money,
    pub rut_eligible_labor_cost: Money,
    pub rot_amount: Money,
    pub rut_amount: Money,
    pub combined_deduction: Money,
    pub amount_to_pay: Money,
    pub warnings: Vec<DeductionWarning>,
}

impl Totals {
    /// Cost bucket for a kind.
    pub fn cost_for(&self, kind: ItemKind) -> Money {
        match kind {
            ItemKind::Labor => self.labor_cost,
            ItemKind::Material => self.material_cost,
            ItemKind::Subcontractor => self.subcontractor_cost,
        }
    }

    /// True if any deduction ceiling was hit.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Computes every figure for a quote.
///
/// ## Markup Precedence
/// Per-item markup wins outright: if any row has markup enabled with a
/// positive percent, the global percent is ignored and the markup figure is
/// the sum of the rows' own markup (already inside their subtotals, so it is
/// not added a second time). Otherwise the global percent is applied to
/// `subtotal_all`.
///
/// ## Example
/// ```rust
/// use offert_core::pricing::compute_totals;
/// use offert_core::{LineItem, Money, Percent, TaxDeductionPolicy};
/// use rust_decimal::Decimal;
///
/// let floor = LineItem::labor("Golvläggning", Decimal::from(10), Money::from_kronor(500)).with_rot();
/// let policy = TaxDeductionPolicy::rot(Percent::from_whole(30));
///
/// let totals = compute_totals(&[floor], &[], &policy, Percent::from_whole(10));
/// assert_eq!(totals.markup, Money::from_kronor(500));
/// assert_eq!(totals.total_incl_vat, Money::from_kronor(6_875));
/// assert_eq!(totals.rot_amount, Money::from_kronor(1_875));
/// assert_eq!(totals.amount_to_pay, Money::from_kronor(5_000));
/// ```
pub fn compute_totals(
    items: &[LineItem],
    addons: &[Addon],
    policy: &TaxDeductionPolicy,
    global_markup: Percent,
) -> Totals {
    let cost_of = |kind: ItemKind| -> Money {
        items
            .iter()
            .filter(|item| item.kind() == kind)
            .map(LineItem::subtotal)
            .sum()
    };
    let labor_cost = cost_of(ItemKind::Labor);
    let material_cost = cost_of(ItemKind::Material);
    let subcontractor_cost = cost_of(ItemKind::Subcontractor);

    let addons_cost: Money = addons
        .iter()
        .filter(|addon| addon.is_selected)
        .map(|addon| addon.price)
        .sum();

    let subtotal_all = labor_cost + material_cost + subcontractor_cost + addons_cost;

    let per_item: Vec<&LineItem> = items
        .iter()
        .filter(|item| item.effective_markup().is_some_and(|p| p.is_positive()))
        .collect();

    let (markup, markup_source, total_excl_vat) = if !per_item.is_empty() {
        let markup: Money = per_item.into_iter().map(item_markup).sum();
        (markup, MarkupSource::PerItem, subtotal_all)
    } else if global_markup.is_zero() {
        (Money::zero(), MarkupSource::None, subtotal_all)
    } else {
        let markup = subtotal_all.percent_of(global_markup);
        (markup, MarkupSource::Global, subtotal_all + markup)
    };

    let vat = total_excl_vat.percent_of(Percent::VAT);
    let total_incl_vat = total_excl_vat + vat;

    let deductions = compute_deductions(items, policy);
    let amount_to_pay = total_incl_vat - deductions.combined_deduction;

    Totals {
        labor_cost,
        material_cost,
        subcontractor_cost,
        addons_cost,
        subtotal_all,
        markup,
        markup_source,
        total_excl_vat,
        vat,
        total_incl_vat,
        rot_eligible_labor_cost: deductions.rot_eligible_labor_cost,
        rut_eligible_labor_cost: deductions.rut_eligible_labor_cost,
        rot_amount: deductions.rot_amount,
        rut_amount: deductions.rut_amount,
        combined_deduction: deductions.combined_deduction,
        amount_to_pay,
        warnings: deductions.warnings,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
