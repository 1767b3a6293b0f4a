//! # Domain Types
//!
//! Core domain types for building a quote.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    LineItem     │   │     Addon       │   │ TaxDeductionPolicy  │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  kind           │   │  name           │   │  rot_enabled        │   │
//! │  │  quantity/hours │   │  price          │   │  rot_percent (30)   │   │
//! │  │  unit_price     │   │  is_selected    │   │  rut_enabled (50%)  │   │
//! │  │  markup         │   └─────────────────┘   │  mode               │   │
//! │  │  rot/rut flag   │                         └─────────────────────┘   │
//! │  │  subtotal (der.)│                                                    │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    ItemKind     │   │    Percent      │   │   DeductionMode     │   │
//! │  │  Labor          │   │  Decimal, 0-100 │   │  Combined           │   │
//! │  │  Material       │   │  25 = 25 %      │   │  Exclusive          │   │
//! │  │  Subcontractor  │   └─────────────────┘   └─────────────────────┘   │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived Subtotal
//! `LineItem::subtotal` is never set directly. Every setter that touches an
//! input of the subtotal recomputes it through
//! [`compute_item_subtotal`](crate::pricing::compute_item_subtotal), and
//! deserialization recomputes it too, so a stale value can never be read.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::category::kind_for_category;
use crate::error::ValidationError;
use crate::money::Money;
use crate::pricing::compute_item_subtotal;
use crate::KLUMP_UNIT;

// =============================================================================
// Percent
// =============================================================================

/// A percentage, stored as the human number (`25` means 25 %).
///
/// ## Why not a fraction?
/// Every percentage a user types (påslag, ROT-procent) is entered as a whole
/// or decimal percent. Keeping that form avoids a divide-by-100 at every
/// input boundary; [`Percent::fraction`] does it once at the point of use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(#[ts(type = "string")] Decimal);

impl Percent {
    /// Swedish standard VAT rate (moms).
    pub const VAT: Percent = Percent(Decimal::from_parts(25, 0, 0, false, 0));

    /// Default ROT deduction percentage.
    pub const DEFAULT_ROT: Percent = Percent(Decimal::from_parts(30, 0, 0, false, 0));

    /// RUT deduction percentage. Fixed by law, not configurable.
    pub const RUT: Percent = Percent(Decimal::from_parts(50, 0, 0, false, 0));

    /// Creates a percentage from a decimal value (`12.5` = 12,5 %).
    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Percent(value)
    }

    /// Creates a percentage from a whole number.
    #[inline]
    pub fn from_whole(value: i64) -> Self {
        Percent(Decimal::from(value))
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(Decimal::ZERO)
    }

    /// Returns the percentage as entered (`25`).
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the multiplier (`0.25`).
    #[inline]
    pub fn fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

/// Displays as `"12,5 %"`.
impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.0.normalize().to_string().replace('.', ",");
        write!(f, "{} %", text)
    }
}

// =============================================================================
// Item Kind
// =============================================================================

/// Cost bucket a line item belongs to.
///
/// Only `Labor` items can carry ROT or RUT eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Work performed by the company's own staff, priced per hour.
    Labor,
    /// Goods and materials, priced per unit.
    Material,
    /// Work bought in from an underentreprenör.
    Subcontractor,
}

impl ItemKind {
    /// All kinds, in the order totals are presented.
    pub const ALL: [ItemKind; 3] = [ItemKind::Labor, ItemKind::Material, ItemKind::Subcontractor];

    #[inline]
    pub fn is_labor(&self) -> bool {
        matches!(self, ItemKind::Labor)
    }

    /// Swedish label used on documents.
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Labor => "Arbetskostnad",
            ItemKind::Material => "Material",
            ItemKind::Subcontractor => "Underentreprenörer",
        }
    }
}

impl Default for ItemKind {
    fn default() -> Self {
        ItemKind::Material
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Labor => write!(f, "labor"),
            ItemKind::Material => write!(f, "material"),
            ItemKind::Subcontractor => write!(f, "subcontractor"),
        }
    }
}

impl FromStr for ItemKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "labor" | "labour" => Ok(ItemKind::Labor),
            "material" => Ok(ItemKind::Material),
            "subcontractor" => Ok(ItemKind::Subcontractor),
            _ => Err(ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: ItemKind::ALL.iter().map(|k| k.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Lenient Numeric Parsing
// =============================================================================

/// Parses a user-typed number, or returns `None` if it is not one.
///
/// Accepts what people paste into quote forms and spreadsheets:
/// `"1 234,50"`, `"1.234,50"`, `"1234.5"`, `"495 kr"`, `"12,5%"`.
///
/// ## Example
/// ```rust
/// use offert_core::types::parse_decimal;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_decimal("1 234,50"), Some(Decimal::new(123450, 2)));
/// assert_eq!(parse_decimal("495 kr"), Some(Decimal::from(495)));
/// assert_eq!(parse_decimal("n/a"), None);
/// ```
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let mut text: String = raw
        .trim()
        .trim_end_matches('%')
        .trim_end_matches("kr")
        .trim_end_matches("SEK")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '_')
        .collect();

    if text.is_empty() {
        return None;
    }

    // "1.234,50": dot groups thousands, comma is the decimal mark
    if text.contains(',') {
        if text.contains('.') {
            text = text.replace('.', "");
        }
        text = text.replace(',', ".");
    }

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Serde helpers that turn malformed numbers into `None` instead of errors.
pub(crate) mod lenient {
    use super::*;
    use serde_json::Value;

    fn from_value(value: Value) -> Option<Decimal> {
        match value {
            Value::Number(n) => parse_decimal(&n.to_string()),
            Value::String(s) => parse_decimal(&s),
            _ => None,
        }
    }

    pub fn decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(from_value))
    }

    pub fn money<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(decimal(deserializer)?.map(Money::new).unwrap_or_default())
    }

    /// Distinguishes a missing field (`None`) from an explicit `null`
    /// (`Some(None)`) in patches.
    pub fn clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }

    /// Accepts `"labor"` style names and spreadsheet categories (`"UE"`,
    /// `"Bygg"`); anything else becomes the default kind.
    pub fn kind<'de, D>(deserializer: D) -> Result<ItemKind, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        let kind = match value {
            Some(Value::String(s)) => s.parse::<ItemKind>().ok().or_else(|| kind_for_category(&s)),
            _ => None,
        };
        Ok(kind.unwrap_or_default())
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(matches!(value, Some(Value::Bool(true))))
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One row of a quote.
///
/// ## Field Usage by Kind
/// ```text
/// ┌──────────────────┬──────────────┬───────────────────────────────────┐
/// │ kind / unit      │ base amount  │ notes                             │
/// ├──────────────────┼──────────────┼───────────────────────────────────┤
/// │ any, unit=klump  │ unit_price   │ lump sum, quantity/hours ignored  │
/// │ labor            │ hours × pris │ quantity ignored                  │
/// │ material / UE    │ qty × pris   │ hours ignored                     │
/// └──────────────────┴──────────────┴───────────────────────────────────┘
/// subtotal = base × (1 + markup_percent/100) when markup_enabled
/// ```
///
/// ## Invariants
/// - `subtotal` always matches the inputs (recomputed by every setter)
/// - at most one of `rot_eligible` / `rut_eligible` is true
/// - non-labor items are never eligible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", from = "RawLineItem")]
#[ts(export)]
pub struct LineItem {
    id: String,
    name: String,
    kind: ItemKind,
    #[ts(type = "string | null")]
    quantity: Option<Decimal>,
    #[ts(type = "string | null")]
    hours: Option<Decimal>,
    unit_price: Money,
    unit: String,
    markup_enabled: bool,
    markup_percent: Option<Percent>,
    rot_eligible: bool,
    rut_eligible: bool,
    subtotal: Money,
}

impl LineItem {
    /// Creates an empty item of the given kind with a fresh UUID.
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        let mut item = LineItem {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            quantity: None,
            hours: None,
            unit_price: Money::zero(),
            unit: String::new(),
            markup_enabled: false,
            markup_percent: None,
            rot_eligible: false,
            rut_eligible: false,
            subtotal: Money::zero(),
        };
        item.recompute();
        item
    }

    /// Labor row: `hours` at `hourly_rate`.
    pub fn labor(name: impl Into<String>, hours: Decimal, hourly_rate: Money) -> Self {
        LineItem::new(name, ItemKind::Labor)
            .with_hours(hours)
            .with_unit_price(hourly_rate)
            .with_unit("tim")
    }

    /// Material row: `quantity` `unit` at `unit_price`.
    pub fn material(
        name: impl Into<String>,
        quantity: Decimal,
        unit: impl Into<String>,
        unit_price: Money,
    ) -> Self {
        LineItem::new(name, ItemKind::Material)
            .with_quantity(quantity)
            .with_unit(unit)
            .with_unit_price(unit_price)
    }

    /// Lump-sum row (`unit = "klump"`).
    pub fn lump_sum(name: impl Into<String>, kind: ItemKind, price: Money) -> Self {
        LineItem::new(name, kind)
            .with_unit(KLUMP_UNIT)
            .with_unit_price(price)
    }

    // -------------------------------------------------------------------------
    // Builders
    // -------------------------------------------------------------------------

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.set_quantity(Some(quantity));
        self
    }

    pub fn with_hours(mut self, hours: Decimal) -> Self {
        self.set_hours(Some(hours));
        self
    }

    pub fn with_unit_price(mut self, unit_price: Money) -> Self {
        self.set_unit_price(unit_price);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.set_unit(unit);
        self
    }

    pub fn with_markup(mut self, percent: Percent) -> Self {
        self.set_markup(true, Some(percent));
        self
    }

    pub fn with_rot(mut self) -> Self {
        self.set_rot_eligible(true);
        self
    }

    pub fn with_rut(mut self) -> Self {
        self.set_rut_eligible(true);
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn quantity(&self) -> Option<Decimal> {
        self.quantity
    }

    pub fn hours(&self) -> Option<Decimal> {
        self.hours
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn markup_enabled(&self) -> bool {
        self.markup_enabled
    }

    pub fn markup_percent(&self) -> Option<Percent> {
        self.markup_percent
    }

    /// The markup that actually applies: the item's percent when enabled.
    pub fn effective_markup(&self) -> Option<Percent> {
        if self.markup_enabled {
            Some(self.markup_percent.unwrap_or_default())
        } else {
            None
        }
    }

    pub fn rot_eligible(&self) -> bool {
        self.rot_eligible
    }

    pub fn rut_eligible(&self) -> bool {
        self.rut_eligible
    }

    /// Derived subtotal including the item's own markup.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// True for lump-sum rows.
    pub fn is_lump_sum(&self) -> bool {
        self.unit.trim().eq_ignore_ascii_case(KLUMP_UNIT)
    }

    // -------------------------------------------------------------------------
    // Setters (each recomputes the subtotal)
    // -------------------------------------------------------------------------

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Changes the kind. Leaving `Labor` clears ROT/RUT eligibility.
    pub fn set_kind(&mut self, kind: ItemKind) {
        self.kind = kind;
        if !kind.is_labor() {
            self.rot_eligible = false;
            self.rut_eligible = false;
        }
        self.recompute();
    }

    pub fn set_quantity(&mut self, quantity: Option<Decimal>) {
        self.quantity = quantity;
        self.recompute();
    }

    pub fn set_hours(&mut self, hours: Option<Decimal>) {
        self.hours = hours;
        self.recompute();
    }

    pub fn set_unit_price(&mut self, unit_price: Money) {
        self.unit_price = unit_price;
        self.recompute();
    }

    pub fn set_unit(&mut self, unit: impl Into<String>) {
        self.unit = unit.into();
        self.recompute();
    }

    pub fn set_markup(&mut self, enabled: bool, percent: Option<Percent>) {
        self.markup_enabled = enabled;
        self.markup_percent = percent;
        self.recompute();
    }

    /// Sets ROT eligibility; enabling it clears RUT.
    ///
    /// Returns the resulting flag, which stays `false` for non-labor items.
    pub fn set_rot_eligible(&mut self, eligible: bool) -> bool {
        self.rot_eligible = eligible && self.kind.is_labor();
        if self.rot_eligible {
            self.rut_eligible = false;
        }
        self.rot_eligible
    }

    /// Sets RUT eligibility; enabling it clears ROT.
    ///
    /// Returns the resulting flag, which stays `false` for non-labor items.
    pub fn set_rut_eligible(&mut self, eligible: bool) -> bool {
        self.rut_eligible = eligible && self.kind.is_labor();
        if self.rut_eligible {
            self.rot_eligible = false;
        }
        self.rut_eligible
    }

    /// Applies every field present in `patch`.
    pub fn apply(&mut self, patch: LineItemPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(kind) = patch.kind {
            self.set_kind(kind);
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(hours) = patch.hours {
            self.hours = hours;
        }
        if let Some(unit_price) = patch.unit_price {
            self.unit_price = unit_price;
        }
        if let Some(unit) = patch.unit {
            self.unit = unit;
        }
        if let Some(enabled) = patch.markup_enabled {
            self.markup_enabled = enabled;
        }
        if let Some(percent) = patch.markup_percent {
            self.markup_percent = percent;
        }
        if let Some(rot) = patch.rot_eligible {
            self.set_rot_eligible(rot);
        }
        if let Some(rut) = patch.rut_eligible {
            self.set_rut_eligible(rut);
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.subtotal = compute_item_subtotal(self);
    }
}

/// Wire shape of a line item as received from forms, files and the
/// front end. Numbers are parsed leniently and `subtotal` is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawLineItem {
    id: Option<String>,
    name: String,
    #[serde(deserialize_with = "lenient::kind")]
    kind: ItemKind,
    #[serde(deserialize_with = "lenient::decimal")]
    quantity: Option<Decimal>,
    #[serde(deserialize_with = "lenient::decimal")]
    hours: Option<Decimal>,
    #[serde(deserialize_with = "lenient::money")]
    unit_price: Money,
    unit: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    markup_enabled: bool,
    #[serde(deserialize_with = "lenient::decimal")]
    markup_percent: Option<Decimal>,
    #[serde(deserialize_with = "lenient::flag")]
    rot_eligible: bool,
    #[serde(deserialize_with = "lenient::flag")]
    rut_eligible: bool,
}

impl From<RawLineItem> for LineItem {
    fn from(raw: RawLineItem) -> Self {
        let mut item = LineItem::new(raw.name, raw.kind);
        if let Some(id) = raw.id.filter(|id| !id.trim().is_empty()) {
            item.id = id;
        }
        item.quantity = raw.quantity;
        item.hours = raw.hours;
        item.unit_price = raw.unit_price;
        item.unit = raw.unit.unwrap_or_default();
        item.markup_enabled = raw.markup_enabled;
        item.markup_percent = raw.markup_percent.map(Percent::new);
        // ROT wins if a stored row claims both
        if !item.set_rot_eligible(raw.rot_eligible) {
            item.set_rut_eligible(raw.rut_eligible);
        }
        item.recompute();
        item
    }
}

/// Partial update for a line item. `None` leaves a field untouched;
/// `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct LineItemPatch {
    pub name: Option<String>,
    pub kind: Option<ItemKind>,
    #[serde(deserialize_with = "lenient::clearable")]
    #[ts(type = "string | null")]
    pub quantity: Option<Option<Decimal>>,
    #[serde(deserialize_with = "lenient::clearable")]
    #[ts(type = "string | null")]
    pub hours: Option<Option<Decimal>>,
    pub unit_price: Option<Money>,
    pub unit: Option<String>,
    pub markup_enabled: Option<bool>,
    #[serde(deserialize_with = "lenient::clearable")]
    pub markup_percent: Option<Option<Percent>>,
    pub rot_eligible: Option<bool>,
    pub rut_eligible: Option<bool>,
}

// =============================================================================
// Addon
// =============================================================================

/// An optional extra ("tillval") the customer can pick.
///
/// Only selected addons count towards totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Addon {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::money")]
    pub price: Money,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_selected: bool,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Addon {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Addon {
            id: new_id(),
            name: name.into(),
            price,
            is_selected: false,
        }
    }

    pub fn selected(mut self) -> Self {
        self.is_selected = true;
        self
    }
}

// =============================================================================
// Tax Deduction Policy
// =============================================================================

/// How ROT and RUT relate when both are switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeductionMode {
    /// Both deductions apply to their own eligible rows; the sum is capped
    /// at the combined ceiling.
    #[default]
    Combined,
    /// Only one deduction is ever active. Enabling one disables the other.
    Exclusive,
}

impl fmt::Display for DeductionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeductionMode::Combined => write!(f, "combined"),
            DeductionMode::Exclusive => write!(f, "exclusive"),
        }
    }
}

impl FromStr for DeductionMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "combined" | "both" => Ok(DeductionMode::Combined),
            "exclusive" | "either" => Ok(DeductionMode::Exclusive),
            _ => Err(ValidationError::NotAllowed {
                field: "deduction_mode".to_string(),
                allowed: vec!["combined".to_string(), "exclusive".to_string()],
            }),
        }
    }
}

/// Per-estimate ROT/RUT settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct TaxDeductionPolicy {
    pub rot_enabled: bool,
    pub rot_percent: Percent,
    pub rut_enabled: bool,
    pub mode: DeductionMode,
}

impl TaxDeductionPolicy {
    /// Policy with both deductions off.
    pub fn new(mode: DeductionMode) -> Self {
        TaxDeductionPolicy {
            rot_enabled: false,
            rot_percent: Percent::DEFAULT_ROT,
            rut_enabled: false,
            mode,
        }
    }

    /// ROT on at `percent`.
    pub fn rot(percent: Percent) -> Self {
        let mut policy = TaxDeductionPolicy::default();
        policy.rot_percent = percent;
        policy.set_rot_enabled(true);
        policy
    }

    /// RUT on (fixed 50 %).
    pub fn rut() -> Self {
        let mut policy = TaxDeductionPolicy::default();
        policy.set_rut_enabled(true);
        policy
    }

    /// RUT percentage; always 50 %.
    #[inline]
    pub fn rut_percent(&self) -> Percent {
        Percent::RUT
    }

    /// Toggles ROT. In `Exclusive` mode enabling ROT disables RUT.
    pub fn set_rot_enabled(&mut self, enabled: bool) {
        self.rot_enabled = enabled;
        if enabled && self.mode == DeductionMode::Exclusive {
            self.rut_enabled = false;
        }
    }

    /// Toggles RUT. In `Exclusive` mode enabling RUT disables ROT.
    pub fn set_rut_enabled(&mut self, enabled: bool) {
        self.rut_enabled = enabled;
        if enabled && self.mode == DeductionMode::Exclusive {
            self.rot_enabled = false;
        }
    }

    /// True if any deduction is switched on.
    pub fn any_enabled(&self) -> bool {
        self.rot_enabled || self.rut_enabled
    }
}

impl Default for TaxDeductionPolicy {
    fn default() -> Self {
        TaxDeductionPolicy::new(DeductionMode::default())
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
    fn test_percent_fraction_and_display() {
        assert_eq!(Percent::VAT.fraction(), dec("0.25"));
        assert_eq!(Percent::from_whole(30).value(), dec("30"));
        assert_eq!(Percent::new(dec("12.5")).to_string(), "12,5 %");
        assert_eq!(Percent::RUT.to_string(), "50 %");
    }

    #[test]
    fn test_item_kind_parsing() {
        assert_eq!("labor".parse::<ItemKind>().unwrap(), ItemKind::Labor);
        assert_eq!(" Subcontractor ".parse::<ItemKind>().unwrap(), ItemKind::Subcontractor);
        assert!("bygg".parse::<ItemKind>().is_err());
    }

    #[test]
    fn test_parse_decimal_formats() {
        assert_eq!(parse_decimal("1234.5"), Some(dec("1234.5")));
        assert_eq!(parse_decimal("1 234,50"), Some(dec("1234.50")));
        assert_eq!(parse_decimal("1.234,50"), Some(dec("1234.50")));
        assert_eq!(parse_decimal("12,5%"), Some(dec("12.5")));
        assert_eq!(parse_decimal("495 kr"), Some(dec("495")));
        assert_eq!(parse_decimal("-20"), Some(dec("-20")));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("   "), None);
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn test_rot_rut_mutual_exclusion() {
        let mut item = LineItem::labor("Snickare", dec("8"), Money::from_kronor(550));

        assert!(item.set_rot_eligible(true));
        assert!(item.rot_eligible());
        assert!(!item.rut_eligible());

        assert!(item.set_rut_eligible(true));
        assert!(item.rut_eligible());
        assert!(!item.rot_eligible());

        item.set_rot_eligible(true);
        assert!(item.rot_eligible());
        assert!(!item.rut_eligible());
    }

    #[test]
    fn test_non_labor_is_never_eligible() {
        let mut item = LineItem::material("Gips", dec("10"), "st", Money::from_kronor(89));
        assert!(!item.set_rot_eligible(true));
        assert!(!item.set_rut_eligible(true));
        assert!(!item.rot_eligible() && !item.rut_eligible());
    }

    #[test]
    fn test_leaving_labor_clears_eligibility() {
        let mut item = LineItem::labor("Målare", dec("4"), Money::from_kronor(500)).with_rut();
        item.set_kind(ItemKind::Subcontractor);
        assert!(!item.rut_eligible());
        assert!(!item.rot_eligible());
    }

    #[test]
    fn test_setters_keep_subtotal_current() {
        let mut item = LineItem::labor("El", dec("2"), Money::from_kronor(600));
        assert_eq!(item.subtotal(), Money::from_kronor(1_200));

        item.set_hours(Some(dec("3")));
        assert_eq!(item.subtotal(), Money::from_kronor(1_800));

        item.set_markup(true, Some(Percent::from_whole(10)));
        assert_eq!(item.subtotal(), Money::from_kronor(1_980));

        item.set_unit(KLUMP_UNIT);
        assert_eq!(item.subtotal(), Money::from_ore(66_000));
    }

    #[test]
    fn test_apply_patch_recomputes() {
        let mut item = LineItem::material("Kakel", dec("10"), "m2", Money::from_kronor(300));
        item.apply(LineItemPatch {
            quantity: Some(Some(dec("12.5"))),
            unit_price: Some(Money::from_kronor(320)),
            ..Default::default()
        });
        assert_eq!(item.subtotal(), Money::from_kronor(4_000));

        item.apply(LineItemPatch {
            quantity: Some(None),
            ..Default::default()
        });
        assert_eq!(item.subtotal(), Money::zero());
    }

    #[test]
    fn test_patch_null_clears_missing_keeps() {
        let patch: LineItemPatch = serde_json::from_str(r#"{"hours":null}"#).unwrap();
        assert_eq!(patch.hours, Some(None));
        assert_eq!(patch.quantity, None);

        let patch: LineItemPatch = serde_json::from_str(r#"{"hours":"6"}"#).unwrap();
        assert_eq!(patch.hours, Some(Some(dec("6"))));
    }

    #[test]
    fn test_deserialize_coerces_bad_numbers() {
        let json = r#"{
            "name": "Rivning",
            "kind": "labor",
            "hours": "7,5",
            "quantity": "lots",
            "unitPrice": null,
            "markupEnabled": "yes",
            "subtotal": "999999"
        }"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.hours(), Some(dec("7.5")));
        assert_eq!(item.quantity(), None);
        assert_eq!(item.unit_price(), Money::zero());
        assert!(!item.markup_enabled());
        assert_eq!(item.subtotal(), Money::zero());
        assert!(!item.id().is_empty());
    }

    #[test]
    fn test_deserialize_kind_from_category() {
        let kind_of = |json: &str| serde_json::from_str::<LineItem>(json).unwrap().kind();

        assert_eq!(kind_of(r#"{"name":"Gips","kind":"Bygg"}"#), ItemKind::Material);
        assert_eq!(kind_of(r#"{"name":"El","kind":"UE"}"#), ItemKind::Subcontractor);
        assert_eq!(kind_of(r#"{"name":"Rivning","kind":"Arbete"}"#), ItemKind::Labor);
        assert_eq!(kind_of(r#"{"name":"Okänd","kind":null}"#), ItemKind::Material);
        assert_eq!(kind_of(r#"{"name":"Okänd","kind":"Diverse"}"#), ItemKind::Material);
        assert_eq!(kind_of(r#"{"name":"Siffra","kind":3}"#), ItemKind::Material);
    }

    #[test]
    fn test_deserialize_recomputes_subtotal() {
        let json = r#"{"id":"a1","name":"Golv","kind":"labor","hours":10,"unitPrice":500,"subtotal":1}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id(), "a1");
        assert_eq!(item.subtotal(), Money::from_kronor(5_000));
    }

    #[test]
    fn test_deserialize_both_flags_keeps_rot() {
        let json = r#"{"name":"x","kind":"labor","rotEligible":true,"rutEligible":true}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert!(item.rot_eligible());
        assert!(!item.rut_eligible());

        let json = r#"{"name":"x","kind":"material","rotEligible":true}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert!(!item.rot_eligible());
    }

    #[test]
    fn test_addon_lenient_price() {
        let addon: Addon = serde_json::from_str(r#"{"name":"Extra uttag","price":"1 200","isSelected":true}"#).unwrap();
        assert_eq!(addon.price, Money::from_kronor(1_200));
        assert!(addon.is_selected);

        let addon: Addon = serde_json::from_str(r#"{"name":"Okänt","price":{}}"#).unwrap();
        assert_eq!(addon.price, Money::zero());
        assert!(!addon.is_selected);
    }

    #[test]
    fn test_policy_exclusive_mode_toggles() {
        let mut policy = TaxDeductionPolicy::new(DeductionMode::Exclusive);
        policy.set_rot_enabled(true);
        policy.set_rut_enabled(true);
        assert!(policy.rut_enabled);
        assert!(!policy.rot_enabled);

        let mut combined = TaxDeductionPolicy::new(DeductionMode::Combined);
        combined.set_rot_enabled(true);
        combined.set_rut_enabled(true);
        assert!(combined.rot_enabled && combined.rut_enabled);
    }

    #[test]
    fn test_policy_defaults() {
        let policy: TaxDeductionPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy.rot_percent, Percent::DEFAULT_ROT);
        assert_eq!(policy.mode, DeductionMode::Combined);
        assert!(!policy.any_enabled());
        assert_eq!(policy.rut_percent(), Percent::RUT);
    }
}
