//! # Estimate
//!
//! An estimate being edited: rows, addons, deduction policy and the global
//! markup. Every read of a figure goes through the pricing engine.
//!
//! ## Editing Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Estimate Operations                                  │
//! │                                                                         │
//! │  Editor Action            Method                  Effect                │
//! │  ─────────────            ──────                  ──────                │
//! │                                                                         │
//! │  Add row ────────────────► add_item() ──────────► items.push(item)     │
//! │                                                                         │
//! │  Edit a cell ────────────► update_item() ───────► subtotal recomputed  │
//! │                                                                         │
//! │  Tick ROT / RUT ─────────► set_rot_eligible() ──► other flag cleared   │
//! │                                                                         │
//! │  Delete row ─────────────► remove_item() ───────► items.remove(i)      │
//! │                                                                         │
//! │  Pick an addon ──────────► toggle_addon() ──────► is_selected flipped  │
//! │                                                                         │
//! │  Any render ─────────────► totals() ────────────► fresh Totals         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::deduction::{compute_deductions, DeductionBreakdown};
use crate::error::{CoreError, CoreResult};
use crate::pricing::{compute_totals, Totals};
use crate::summary::EstimateSummary;
use crate::types::{Addon, LineItem, LineItemPatch, Percent, TaxDeductionPolicy};
use crate::validation::validate_estimate_size;

/// A quote under construction.
///
/// ## Invariants
/// - Row ids are unique (new rows get a fresh UUID)
/// - At most [`MAX_ESTIMATE_ITEMS`](crate::MAX_ESTIMATE_ITEMS) rows
/// - Totals are never stored; [`Estimate::totals`] recomputes them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Estimate {
    pub title: String,
    pub items: Vec<LineItem>,
    pub addons: Vec<Addon>,
    pub policy: TaxDeductionPolicy,
    pub global_markup_percent: Percent,
}

impl Estimate {
    /// Creates an empty estimate.
    pub fn new(title: impl Into<String>) -> Self {
        Estimate {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Sets the global markup used when no row has its own.
    pub fn with_global_markup(mut self, percent: Percent) -> Self {
        self.global_markup_percent = percent;
        self
    }

    pub fn with_policy(mut self, policy: TaxDeductionPolicy) -> Self {
        self.policy = policy;
        self
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    /// Appends a row.
    pub fn add_item(&mut self, item: LineItem) -> CoreResult<&LineItem> {
        validate_estimate_size(self.items.len()).map_err(|_| CoreError::TooManyItems {
            max: crate::MAX_ESTIMATE_ITEMS,
        })?;

        self.items.push(item);
        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    /// Looks a row up by id.
    pub fn item(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn item_mut(&mut self, id: &str) -> CoreResult<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))
    }

    /// Applies a partial edit to a row; its subtotal is recomputed.
    pub fn update_item(&mut self, id: &str, patch: LineItemPatch) -> CoreResult<&LineItem> {
        let item = self.item_mut(id)?;
        item.apply(patch);
        Ok(item)
    }

    /// Removes a row.
    pub fn remove_item(&mut self, id: &str) -> CoreResult<LineItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))?;
        Ok(self.items.remove(index))
    }

    /// Ticks or unticks ROT on a row. Ticking ROT unticks RUT.
    ///
    /// ## Errors
    /// - `ItemNotFound` for unknown ids
    /// - `NotEligible` when ticking a row that is not labor
    pub fn set_rot_eligible(&mut self, id: &str, eligible: bool) -> CoreResult<()> {
        let item = self.item_mut(id)?;
        if item.set_rot_eligible(eligible) != eligible {
            return Err(CoreError::NotEligible {
                item_id: id.to_string(),
                deduction: "ROT",
            });
        }
        Ok(())
    }

    /// Ticks or unticks RUT on a row. Ticking RUT unticks ROT.
    pub fn set_rut_eligible(&mut self, id: &str, eligible: bool) -> CoreResult<()> {
        let item = self.item_mut(id)?;
        if item.set_rut_eligible(eligible) != eligible {
            return Err(CoreError::NotEligible {
                item_id: id.to_string(),
                deduction: "RUT",
            });
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Addons
    // -------------------------------------------------------------------------

    pub fn add_addon(&mut self, addon: Addon) -> &Addon {
        self.addons.push(addon);
        let index = self.addons.len() - 1;
        &self.addons[index]
    }

    /// Selects or deselects an addon.
    pub fn toggle_addon(&mut self, id: &str, selected: bool) -> CoreResult<()> {
        let addon = self
            .addons
            .iter_mut()
            .find(|addon| addon.id == id)
            .ok_or_else(|| CoreError::AddonNotFound(id.to_string()))?;
        addon.is_selected = selected;
        Ok(())
    }

    pub fn remove_addon(&mut self, id: &str) -> CoreResult<Addon> {
        let index = self
            .addons
            .iter()
            .position(|addon| addon.id == id)
            .ok_or_else(|| CoreError::AddonNotFound(id.to_string()))?;
        Ok(self.addons.remove(index))
    }

    // -------------------------------------------------------------------------
    // Figures
    // -------------------------------------------------------------------------

    /// Fresh totals for the current state.
    pub fn totals(&self) -> Totals {
        compute_totals(
            &self.items,
            &self.addons,
            &self.policy,
            self.global_markup_percent,
        )
    }

    /// ROT/RUT figures for the tax panel.
    pub fn deductions(&self) -> DeductionBreakdown {
        compute_deductions(&self.items, &self.policy)
    }

    /// Labelled rows for documents and previews.
    pub fn summary(&self) -> EstimateSummary {
        EstimateSummary::new(&self.totals(), &self.policy, self.global_markup_percent)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.addons.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
