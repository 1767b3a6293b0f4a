//! # Validation Module
//!
//! Form-level validation for quote input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (this module)                                           │
//! │  ├── Rejects negative prices, empty names, percent out of range        │
//! │  └── Immediate feedback while the user types                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Estimate (estimate.rs)                                       │
//! │  ├── Row limits, unknown ids                                           │
//! │  └── ROT/RUT only on labor                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing engine (pricing.rs)                                  │
//! │  └── NEVER rejects: coerces missing numbers to zero                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use offert_core::validation::{validate_item_name, validate_rot_percent};
//! use offert_core::Percent;
//!
//! assert!(validate_item_name("Byte av golvbrunn").is_ok());
//! assert!(validate_rot_percent(Percent::from_whole(30)).is_ok());
//! assert!(validate_rot_percent(Percent::from_whole(130)).is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{LineItem, Percent};
use crate::{MAX_ESTIMATE_ITEMS, MAX_MARKUP_PERCENT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a row description.
///
/// ## Rules
/// - Must not be empty
/// - At most 300 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 300 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 300,
        });
    }

    Ok(())
}

/// Validates a unit label ("st", "m2", "tim", "klump").
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    if unit.trim().chars().count() > 20 {
        return Err(ValidationError::TooLong {
            field: "unit".to_string(),
            max: 20,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

fn non_negative(field: &str, value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn percent_in_range(field: &str, percent: Percent, max: Decimal) -> ValidationResult<()> {
    if percent.value() < Decimal::ZERO || percent.value() > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

/// Validates a unit or hourly price. Zero is allowed (free rows).
///
/// ## Example
/// ```rust
/// use offert_core::validation::validate_unit_price;
/// use offert_core::Money;
///
/// assert!(validate_unit_price(Money::from_kronor(495)).is_ok());
/// assert!(validate_unit_price(Money::zero()).is_ok());
/// assert!(validate_unit_price(Money::from_kronor(-1)).is_err());
/// ```
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    non_negative("unit_price", price.amount())
}

/// Validates a quantity. Empty is allowed (counts as zero).
pub fn validate_quantity(quantity: Option<Decimal>) -> ValidationResult<()> {
    quantity.map_or(Ok(()), |q| non_negative("quantity", q))
}

/// Validates hours. Empty is allowed (counts as zero).
pub fn validate_hours(hours: Option<Decimal>) -> ValidationResult<()> {
    hours.map_or(Ok(()), |h| non_negative("hours", h))
}

/// Validates a markup percentage (0 – 1000 %).
pub fn validate_markup_percent(percent: Percent) -> ValidationResult<()> {
    percent_in_range("markup_percent", percent, Decimal::from(MAX_MARKUP_PERCENT))
}

/// Validates the ROT percentage (0 – 100 %).
pub fn validate_rot_percent(percent: Percent) -> ValidationResult<()> {
    percent_in_range("rot_percent", percent, Decimal::ONE_HUNDRED)
}

/// Validates an addon price. Zero is allowed.
pub fn validate_addon_price(price: Money) -> ValidationResult<()> {
    non_negative("price", price.amount())
}

// =============================================================================
// Aggregate Validators
// =============================================================================

/// Validates every user-entered field of a row.
///
/// Returns the first failure, in form order.
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    validate_item_name(item.name())?;
    validate_unit(item.unit())?;
    validate_quantity(item.quantity())?;
    validate_hours(item.hours())?;
    validate_unit_price(item.unit_price())?;
    if let Some(percent) = item.markup_percent() {
        validate_markup_percent(percent)?;
    }
    Ok(())
}

/// Validates row count before adding another row.
pub fn validate_estimate_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_ESTIMATE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "line items".to_string(),
            min: "0".to_string(),
            max: MAX_ESTIMATE_ITEMS.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemKind;

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Rivning av kakel").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"å".repeat(300)).is_ok());
        assert!(validate_item_name(&"å".repeat(301)).is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_quantity(None).is_ok());
        assert!(validate_quantity(Some(Decimal::from(2))).is_ok());
        assert!(validate_quantity(Some(Decimal::from(-2))).is_err());
        assert!(validate_hours(Some(Decimal::new(75, 1))).is_ok());
        assert!(validate_hours(Some(Decimal::new(-1, 1))).is_err());
        assert!(validate_addon_price(Money::from_kronor(-5)).is_err());
    }

    #[test]
    fn test_validate_percentages() {
        assert!(validate_rot_percent(Percent::zero()).is_ok());
        assert!(validate_rot_percent(Percent::from_whole(100)).is_ok());
        assert!(validate_rot_percent(Percent::from_whole(101)).is_err());
        assert!(validate_rot_percent(Percent::from_whole(-1)).is_err());
        assert!(validate_markup_percent(Percent::from_whole(250)).is_ok());
        assert!(validate_markup_percent(Percent::from_whole(1_001)).is_err());
    }

    #[test]
    fn test_validate_line_item() {
        let ok = LineItem::labor("Målning", Decimal::from(4), Money::from_kronor(450));
        assert!(validate_line_item(&ok).is_ok());

        let unnamed = LineItem::new("", ItemKind::Material);
        assert_eq!(
            validate_line_item(&unnamed),
            Err(ValidationError::Required {
                field: "name".to_string()
            })
        );

        let negative = LineItem::material("Retur", Decimal::from(1), "st", Money::from_kronor(-10));
        assert!(matches!(
            validate_line_item(&negative),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_validate_estimate_size() {
        assert!(validate_estimate_size(0).is_ok());
        assert!(validate_estimate_size(MAX_ESTIMATE_ITEMS - 1).is_ok());
        assert!(validate_estimate_size(MAX_ESTIMATE_ITEMS).is_err());
    }
}
