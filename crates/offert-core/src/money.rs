//! # Money Module
//!
//! Provides the `Money` type for handling monetary values in Swedish kronor.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    7.5 h × 495 kr × 1.25 = 4640.624999999999  ❌ WRONG!                 │
//! │                                                                         │
//! │  Quotes mix fractional hours, fractional quantities (2,5 m²) and       │
//! │  percentages (25% moms, 30% ROT, 12,5% påslag). Integer öre would      │
//! │  force rounding at every step.                                          │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal                                          │
//! │    Every intermediate value is exact. We round to öre only when a      │
//! │    figure is shown or written to a document.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use offert_core::money::Money;
//!
//! let hourly = Money::from_kronor(495);
//! let labor = hourly.scale("7.5".parse().unwrap());
//! assert_eq!(labor, Money::from_ore(371_250));
//! assert_eq!(labor.to_string(), "3 712,50 kr");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Percent;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in Swedish kronor.
///
/// ## Design Decisions
/// - **Decimal (signed)**: exact arithmetic, negative values allowed
///   (credits, corrections). The engine never rejects them.
/// - **Single field tuple struct**: zero-cost wrapper, serializes as the
///   bare decimal string (`"5000"`, `"1375.50"`).
/// - **Saturating arithmetic**: results beyond the `Decimal` range clamp to
///   its bounds. Pasted figures like `1e20` can never make pricing panic.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  LineItem.unit_price ──► item subtotal ──► cost buckets                 │
/// │                                                │                        │
/// │  Addon.price ──────────────────────────────────┤                        │
/// │                                                ▼                        │
/// │                      markup ──► total excl. moms ──► moms ──► total     │
/// │                                                                  │      │
/// │  eligible labor ──► ROT/RUT (capped) ────────────────────► att betala  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Wraps a raw decimal amount in kronor.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from whole kronor.
    ///
    /// ## Example
    /// ```rust
    /// use offert_core::money::Money;
    ///
    /// let cap = Money::from_kronor(50_000);
    /// assert_eq!(cap.to_string(), "50 000,00 kr");
    /// ```
    #[inline]
    pub fn from_kronor(kronor: i64) -> Self {
        Money(Decimal::from(kronor))
    }

    /// Creates a Money value from öre (1/100 krona).
    ///
    /// ## Example
    /// ```rust
    /// use offert_core::money::Money;
    ///
    /// let price = Money::from_ore(12_950);
    /// assert_eq!(price, Money::from_kronor(129) + Money::from_ore(50));
    /// ```
    #[inline]
    pub fn from_ore(ore: i64) -> Self {
        Money(Decimal::new(ore, 2))
    }

    /// Returns the exact decimal amount in kronor.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero kronor.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is less than zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies by a plain factor (hours, quantity, 1.25 for moms).
    ///
    /// ## Example
    /// ```rust
    /// use offert_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let line = Money::from_kronor(500).scale(Decimal::from(10));
    /// assert_eq!(line, Money::from_kronor(5_000));
    /// ```
    #[inline]
    pub fn scale(&self, factor: Decimal) -> Self {
        Money(self.0.saturating_mul(factor))
    }

    /// Returns `percent` of this amount, unrounded.
    ///
    /// ## Example
    /// ```rust
    /// use offert_core::money::Money;
    /// use offert_core::types::Percent;
    ///
    /// let vat = Money::from_kronor(5_500).percent_of(Percent::from_whole(25));
    /// assert_eq!(vat, Money::from_kronor(1_375));
    /// ```
    #[inline]
    pub fn percent_of(&self, percent: Percent) -> Self {
        Money(self.0.saturating_mul(percent.fraction()))
    }

    /// Returns the smaller of this amount and `cap`.
    ///
    /// Used for the statutory ROT/RUT ceilings.
    #[inline]
    pub fn capped_at(self, cap: Money) -> Self {
        self.min(cap)
    }

    /// Rounds to whole öre, midpoint away from zero.
    ///
    /// ## When To Round
    /// Only at presentation boundaries (documents, summaries, exports).
    /// The engine itself keeps exact values so every consumer sees the
    /// same unrounded totals.
    ///
    /// ## Example
    /// ```rust
    /// use offert_core::money::Money;
    ///
    /// let odd: Money = Money::new("1234.565".parse().unwrap());
    /// assert_eq!(odd.round_ore(), Money::from_ore(123_457));
    /// ```
    pub fn round_ore(&self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Swedish formatting: space as thousands separator, comma as decimal mark.
///
/// `12345.5` → `"12 345,50 kr"`
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_ore().0;
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.2}", rounded.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(ch);
        }

        write!(f, "{}{},{} kr", sign, grouped, fraction)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a decimal factor (hours, quantities).
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Decimal) -> Self {
        self.scale(factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_ore_and_kronor() {
        assert_eq!(Money::from_ore(50_000), Money::from_kronor(500));
        assert_eq!(Money::from_ore(129_50).amount(), dec("129.50"));
        assert_eq!(Money::from_kronor(3), Money::from_ore(300));
    }

    #[test]
    fn test_display_swedish_format() {
        assert_eq!(Money::from_kronor(0).to_string(), "0,00 kr");
        assert_eq!(Money::from_kronor(999).to_string(), "999,00 kr");
        assert_eq!(Money::from_kronor(1_000).to_string(), "1 000,00 kr");
        assert_eq!(Money::from_ore(1_234_550).to_string(), "12 345,50 kr");
        assert_eq!(Money::from_kronor(1_234_567).to_string(), "1 234 567,00 kr");
        assert_eq!(Money::from_ore(-55_000).to_string(), "-550,00 kr");
    }

    #[test]
    fn test_display_negative_zero_has_no_sign() {
        let tiny = Money::new(dec("-0.001"));
        assert_eq!(tiny.to_string(), "0,00 kr");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_kronor(1_000);
        let b = Money::from_kronor(250);

        assert_eq!(a + b, Money::from_kronor(1_250));
        assert_eq!(a - b, Money::from_kronor(750));
        assert_eq!(a * Decimal::from(3), Money::from_kronor(3_000));
        assert_eq!(-b, Money::from_kronor(-250));

        let mut c = a;
        c += b;
        c -= Money::from_kronor(50);
        assert_eq!(c, Money::from_kronor(1_200));
    }

    #[test]
    fn test_overflow_saturates() {
        let huge = Money::new(dec("10000000000"));
        let max = Money::new(Decimal::MAX);

        assert_eq!(huge.scale(dec("100000000000000000000")), max);
        assert_eq!(huge * dec("-100000000000000000000"), Money::new(Decimal::MIN));
        assert_eq!(max + Money::from_kronor(1), max);
        assert_eq!(Money::new(Decimal::MIN) - Money::from_kronor(1), Money::new(Decimal::MIN));
        assert_eq!(max.percent_of(Percent::from_whole(1_000)), max);

        let mut total = max;
        total += max;
        assert_eq!(total, max);
        assert!(total.to_string().ends_with(",00 kr"));
    }

    #[test]
    fn test_percent_of_is_exact() {
        let amount = Money::new(dec("4640.625"));
        let quarter = amount.percent_of(Percent::from_whole(25));
        assert_eq!(quarter.amount(), dec("1160.15625"));
    }

    #[test]
    fn test_capped_at() {
        let raw = Money::from_kronor(75_000);
        assert_eq!(raw.capped_at(Money::from_kronor(50_000)), Money::from_kronor(50_000));
        let small = Money::from_kronor(1_875);
        assert_eq!(small.capped_at(Money::from_kronor(50_000)), small);
    }

    #[test]
    fn test_round_ore_midpoint_away_from_zero() {
        assert_eq!(Money::new(dec("0.005")).round_ore(), Money::from_ore(1));
        assert_eq!(Money::new(dec("-0.005")).round_ore(), Money::from_ore(-1));
        assert_eq!(Money::new(dec("10.004")).round_ore(), Money::from_ore(1_000));
    }

    #[test]
    fn test_sum() {
        let items = vec![Money::from_kronor(1), Money::from_kronor(2), Money::from_ore(50)];
        let total: Money = items.iter().sum();
        assert_eq!(total, Money::from_ore(350));
        let empty: Vec<Money> = Vec::new();
        assert_eq!(empty.into_iter().sum::<Money>(), Money::zero());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_kronor(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs(), Money::from_kronor(100));
    }

    #[test]
    fn test_serializes_as_decimal_string() {
        let json = serde_json::to_string(&Money::from_ore(137_550)).unwrap();
        assert_eq!(json, "\"1375.50\"");
        let back: Money = serde_json::from_str("1375.5").unwrap();
        assert_eq!(back, Money::from_ore(137_550));
    }
}
