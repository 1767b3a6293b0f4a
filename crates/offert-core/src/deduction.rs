//! # ROT/RUT Deductions
//!
//! Swedish tax deductions on labor: ROT (repairs, conversion, extension)
//! and RUT (cleaning, maintenance, household services).
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Deduction Calculation                               │
//! │                                                                         │
//! │  labor rows flagged ROT ──► Σ subtotal ──► × 1.25 (moms) ──► × rot %   │
//! │                                                      │                  │
//! │                                                      ▼                  │
//! │                                          min(raw, 50 000 kr) = ROT     │
//! │                                                                         │
//! │  labor rows flagged RUT ──► Σ subtotal ──► × 1.25 (moms) ──► × 50 %    │
//! │                                                      │                  │
//! │                                                      ▼                  │
//! │                                          min(raw, 75 000 kr) = RUT     │
//! │                                                                         │
//! │  Combined mode:   deduction = min(ROT + RUT, 75 000 kr)                │
//! │  Exclusive mode:  deduction = ROT if ROT is on, else RUT               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deductions are computed on the eligible rows only. Material, addons and
//! the global markup never count.
//!
//! ## Cap Handling
//! Exceeding a ceiling is not an error: the capped amount is returned and a
//! [`DeductionWarning`] is attached so the tax panel can flag it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{DeductionMode, LineItem, Percent, TaxDeductionPolicy};

/// Statutory ROT ceiling per person and year.
pub const ROT_CAP: Money = Money::new(Decimal::from_parts(50_000, 0, 0, false, 0));

/// Statutory RUT ceiling per person and year.
pub const RUT_CAP: Money = Money::new(Decimal::from_parts(75_000, 0, 0, false, 0));

/// Ceiling for ROT and RUT together.
pub const COMBINED_CAP: Money = Money::new(Decimal::from_parts(75_000, 0, 0, false, 0));

// =============================================================================
// Warnings
// =============================================================================

/// A ceiling was hit; the figure shown is the capped one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum DeductionWarning {
    RotCapExceeded { raw: Money, cap: Money },
    RutCapExceeded { raw: Money, cap: Money },
    CombinedCapExceeded { raw: Money, cap: Money },
}

impl DeductionWarning {
    /// Swedish message for the tax panel.
    pub fn message(&self) -> String {
        match self {
            DeductionWarning::RotCapExceeded { raw, cap } => format!(
                "ROT-avdraget ({}) överstiger taket och begränsas till {}",
                raw, cap
            ),
            DeductionWarning::RutCapExceeded { raw, cap } => format!(
                "RUT-avdraget ({}) överstiger taket och begränsas till {}",
                raw, cap
            ),
            DeductionWarning::CombinedCapExceeded { raw, cap } => format!(
                "ROT och RUT tillsammans ({}) överstiger taket och begränsas till {}",
                raw, cap
            ),
        }
    }
}

// =============================================================================
// Breakdown
// =============================================================================

/// Everything the tax-deduction panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeductionBreakdown {
    /// Σ subtotal of labor rows flagged ROT (excl. moms).
    pub rot_eligible_labor_cost: Money,
    /// Σ subtotal of labor rows flagged RUT (excl. moms).
    pub rut_eligible_labor_cost: Money,
    pub rot_eligible_with_vat: Money,
    pub rut_eligible_with_vat: Money,
    /// ROT before the ceiling.
    pub rot_raw: Money,
    /// RUT before the ceiling.
    pub rut_raw: Money,
    pub rot_amount: Money,
    pub rut_amount: Money,
    /// What is actually subtracted from the customer's total.
    pub combined_deduction: Money,
    pub warnings: Vec<DeductionWarning>,
}

/// Adds Swedish VAT on top of a net amount.
pub(crate) fn with_vat(net: Money) -> Money {
    net + net.percent_of(Percent::VAT)
}

/// Computes the ROT/RUT figures for a set of rows.
///
/// ## Example
/// ```rust
/// use offert_core::deduction::{compute_deductions, ROT_CAP};
/// use offert_core::{LineItem, Money, Percent, TaxDeductionPolicy};
///
/// let big_job = LineItem::lump_sum("Takbyte", offert_core::ItemKind::Labor, Money::from_kronor(200_000))
///     .with_rot();
/// let policy = TaxDeductionPolicy::rot(Percent::from_whole(30));
///
/// let breakdown = compute_deductions(&[big_job], &policy);
/// assert_eq!(breakdown.rot_raw, Money::from_kronor(75_000));
/// assert_eq!(breakdown.rot_amount, ROT_CAP);
/// assert_eq!(breakdown.warnings.len(), 1);
/// ```
pub fn compute_deductions(items: &[LineItem], policy: &TaxDeductionPolicy) -> DeductionBreakdown {
    let labor = || items.iter().filter(|item| item.kind().is_labor());
    let rot_eligible_labor_cost: Money = labor()
        .filter(|item| item.rot_eligible())
        .map(LineItem::subtotal)
        .sum();
    let rut_eligible_labor_cost: Money = labor()
        .filter(|item| item.rut_eligible())
        .map(LineItem::subtotal)
        .sum();

    let rot_eligible_with_vat = with_vat(rot_eligible_labor_cost);
    let rut_eligible_with_vat = with_vat(rut_eligible_labor_cost);

    // In exclusive mode ROT wins if a stored policy has both switched on
    let (rot_active, rut_active) = match policy.mode {
        DeductionMode::Combined => (policy.rot_enabled, policy.rut_enabled),
        DeductionMode::Exclusive => (policy.rot_enabled, policy.rut_enabled && !policy.rot_enabled),
    };

    let mut warnings = Vec::new();

    let rot_raw = if rot_active {
        rot_eligible_with_vat.percent_of(policy.rot_percent)
    } else {
        Money::zero()
    };
    let rot_amount = rot_raw.capped_at(ROT_CAP);
    if rot_raw > ROT_CAP {
        warnings.push(DeductionWarning::RotCapExceeded {
            raw: rot_raw,
            cap: ROT_CAP,
        });
    }

    let rut_raw = if rut_active {
        rut_eligible_with_vat.percent_of(policy.rut_percent())
    } else {
        Money::zero()
    };
    let rut_amount = rut_raw.capped_at(RUT_CAP);
    if rut_raw > RUT_CAP {
        warnings.push(DeductionWarning::RutCapExceeded {
            raw: rut_raw,
            cap: RUT_CAP,
        });
    }

    let combined_deduction = match policy.mode {
        DeductionMode::Combined => {
            let sum = rot_amount + rut_amount;
            if sum > COMBINED_CAP {
                warnings.push(DeductionWarning::CombinedCapExceeded {
                    raw: sum,
                    cap: COMBINED_CAP,
                });
            }
            sum.capped_at(COMBINED_CAP)
        }
        DeductionMode::Exclusive => {
            if rot_active {
                rot_amount
            } else {
                rut_amount
            }
        }
    };

    DeductionBreakdown {
        rot_eligible_labor_cost,
        rut_eligible_labor_cost,
        rot_eligible_with_vat,
        rut_eligible_with_vat,
        rot_raw,
        rut_raw,
        rot_amount,
        rut_amount,
        combined_deduction,
        warnings,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemKind;

    fn labor(hours: i64, rate: i64) -> LineItem {
        LineItem::labor("Arbete", Decimal::from(hours), Money::from_kronor(rate))
    }

    #[test]
    fn test_rot_basic() {
        let items = vec![labor(10, 500).with_rot()];
        let policy = TaxDeductionPolicy::rot(Percent::from_whole(30));

        let b = compute_deductions(&items, &policy);
        assert_eq!(b.rot_eligible_labor_cost, Money::from_kronor(5_000));
        assert_eq!(b.rot_eligible_with_vat, Money::from_kronor(6_250));
        assert_eq!(b.rot_amount, Money::from_kronor(1_875));
        assert_eq!(b.combined_deduction, Money::from_kronor(1_875));
        assert!(b.warnings.is_empty());
    }

    #[test]
    fn test_rot_cap_at_50000() {
        let items = vec![LineItem::lump_sum("Tak", ItemKind::Labor, Money::from_kronor(200_000)).with_rot()];
        let policy = TaxDeductionPolicy::rot(Percent::from_whole(30));

        let b = compute_deductions(&items, &policy);
        assert_eq!(b.rot_raw, Money::from_kronor(75_000));
        assert_eq!(b.rot_amount, Money::from_kronor(50_000));
        assert_eq!(
            b.warnings,
            vec![DeductionWarning::RotCapExceeded {
                raw: Money::from_kronor(75_000),
                cap: ROT_CAP,
            }]
        );
    }

    #[test]
    fn test_rut_is_always_fifty_percent() {
        let items = vec![labor(10, 400).with_rut()];
        let mut policy = TaxDeductionPolicy::rut();
        policy.rot_percent = Percent::from_whole(15);

        let b = compute_deductions(&items, &policy);
        // 4000 × 1.25 × 0.5
        assert_eq!(b.rut_amount, Money::from_kronor(2_500));
        assert_eq!(b.rot_amount, Money::zero());
    }

    #[test]
    fn test_rut_cap_at_75000() {
        let items = vec![LineItem::lump_sum("Städ", ItemKind::Labor, Money::from_kronor(160_000)).with_rut()];
        let b = compute_deductions(&items, &TaxDeductionPolicy::rut());
        assert_eq!(b.rut_raw, Money::from_kronor(100_000));
        assert_eq!(b.rut_amount, RUT_CAP);
        assert!(matches!(b.warnings[0], DeductionWarning::RutCapExceeded { .. }));
    }

    #[test]
    fn test_combined_cap() {
        let items = vec![
            LineItem::lump_sum("Renovering", ItemKind::Labor, Money::from_kronor(200_000)).with_rot(),
            LineItem::lump_sum("Trädgård", ItemKind::Labor, Money::from_kronor(64_000)).with_rut(),
        ];
        let mut policy = TaxDeductionPolicy::new(DeductionMode::Combined);
        policy.set_rot_enabled(true);
        policy.set_rut_enabled(true);

        let b = compute_deductions(&items, &policy);
        assert_eq!(b.rot_amount, Money::from_kronor(50_000));
        assert_eq!(b.rut_amount, Money::from_kronor(40_000));
        assert_eq!(b.combined_deduction, COMBINED_CAP);
        assert_eq!(b.warnings.len(), 2);
        assert!(matches!(
            b.warnings[1],
            DeductionWarning::CombinedCapExceeded { .. }
        ));
    }

    #[test]
    fn test_exclusive_mode_uses_only_active_deduction() {
        let items = vec![labor(10, 500).with_rot(), labor(10, 400).with_rut()];
        let mut policy = TaxDeductionPolicy::new(DeductionMode::Exclusive);
        policy.rot_enabled = true;
        policy.rut_enabled = true;

        let b = compute_deductions(&items, &policy);
        assert_eq!(b.rot_amount, Money::from_kronor(1_875));
        assert_eq!(b.rut_amount, Money::zero());
        assert_eq!(b.combined_deduction, Money::from_kronor(1_875));

        policy.set_rut_enabled(true);
        let b = compute_deductions(&items, &policy);
        assert_eq!(b.rot_amount, Money::zero());
        assert_eq!(b.combined_deduction, Money::from_kronor(2_500));
    }

    #[test]
    fn test_disabled_policy_yields_zero_but_reports_eligible_cost() {
        let items = vec![labor(2, 500).with_rot()];
        let b = compute_deductions(&items, &TaxDeductionPolicy::default());
        assert_eq!(b.rot_eligible_labor_cost, Money::from_kronor(1_000));
        assert_eq!(b.rot_amount, Money::zero());
        assert_eq!(b.combined_deduction, Money::zero());
    }

    #[test]
    fn test_unflagged_labor_does_not_count() {
        let items = vec![labor(10, 500), labor(4, 500).with_rot()];
        let b = compute_deductions(&items, &TaxDeductionPolicy::rot(Percent::DEFAULT_ROT));
        assert_eq!(b.rot_eligible_labor_cost, Money::from_kronor(2_000));
    }

    #[test]
    fn test_warning_message() {
        let w = DeductionWarning::RotCapExceeded {
            raw: Money::from_kronor(75_000),
            cap: ROT_CAP,
        };
        assert_eq!(
            w.message(),
            "ROT-avdraget (75 000,00 kr) överstiger taket och begränsas till 50 000,00 kr"
        );
    }
}
