//! # Spreadsheet Import
//!
//! Reads article lists exported from Excel (CSV) into quote rows.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Import Pipeline                                  │
//! │                                                                         │
//! │  header row ──► normalize ──► match per field ──► ColumnMapping        │
//! │                                  │                                      │
//! │                                  ├── 1. exact synonym   ("antal")      │
//! │                                  ├── 2. contains, longest ("antal st") │
//! │                                  └── 3. fuzzy ≥ 0.85    ("benämnig")   │
//! │                                                                         │
//! │  data rows ──► cells by mapping ──► lenient numbers ──► LineItem       │
//! │                   │                                                     │
//! │                   ├── empty row      → ignored                          │
//! │                   └── no name        → ImportReport.skipped             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Category cells go through [`offert_core::category`]; a labor row's
//! amount column is read as hours.

use std::fmt;
use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use offert_core::category::kind_for_category;
use offert_core::types::parse_decimal;
use offert_core::{ItemKind, LineItem, Money};
use serde::Serialize;
use strsim::jaro_winkler;
use tracing::{debug, info};

use crate::error::{TransferError, TransferResult};

/// Default similarity needed for a fuzzy header match.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.85;

// =============================================================================
// Fields & Synonyms
// =============================================================================

/// A quote-row field a spreadsheet column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Quantity,
    Unit,
    UnitPrice,
    Hours,
    Category,
}

impl Field {
    /// Order for the exact and fuzzy passes. Hours before quantity so
    /// "antal timmar" lands on hours, unit price before unit so "enhetspris"
    /// lands on price.
    const MATCH_ORDER: [Field; 6] = [
        Field::Name,
        Field::Hours,
        Field::UnitPrice,
        Field::Quantity,
        Field::Unit,
        Field::Category,
    ];

    /// Known header texts, already normalized.
    fn synonyms(self) -> &'static [&'static str] {
        match self {
            Field::Name => &[
                "benämning",
                "beskrivning",
                "artikel",
                "artikelnamn",
                "namn",
                "text",
                "moment",
                "description",
                "name",
                "item",
            ],
            Field::Quantity => &["antal", "mängd", "kvantitet", "quantity", "qty", "amount"],
            Field::Unit => &["enhet", "enh", "unit"],
            Field::UnitPrice => &[
                "à pris",
                "a pris",
                "apris",
                "pris",
                "styckpris",
                "enhetspris",
                "timpris",
                "unit price",
                "price",
            ],
            Field::Hours => &["timmar", "tim", "arbetstimmar", "arbetstid", "hours"],
            Field::Category => &["kategori", "typ", "kostnadstyp", "grupp", "category", "type"],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Quantity => "quantity",
            Field::Unit => "unit",
            Field::UnitPrice => "unit_price",
            Field::Hours => "hours",
            Field::Category => "category",
        };
        write!(f, "{}", name)
    }
}

/// Lowercases, turns punctuation into spaces and collapses whitespace.
///
/// `"  À-pris (kr) "` → `"à pris kr"`
pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Column Mapping
// =============================================================================

/// Which column feeds which field. Indexes are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub name: usize,
    pub quantity: Option<usize>,
    pub unit: Option<usize>,
    pub unit_price: Option<usize>,
    pub hours: Option<usize>,
    pub category: Option<usize>,
}

impl ColumnMapping {
    /// Matches header texts to fields.
    ///
    /// Each column is claimed by at most one field. Only the name column is
    /// required.
    ///
    /// ## Example
    /// ```rust
    /// use offert_transfer::import::ColumnMapping;
    ///
    /// let headers = ["Benämning", "Antal", "Enhet", "À-pris", "Kategori"];
    /// let mapping = ColumnMapping::detect(&headers, 0.85).unwrap();
    /// assert_eq!(mapping.name, 0);
    /// assert_eq!(mapping.unit_price, Some(3));
    /// assert_eq!(mapping.hours, None);
    /// ```
    pub fn detect<S: AsRef<str>>(headers: &[S], threshold: f64) -> TransferResult<Self> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| normalize_header(h.as_ref()))
            .collect();
        let mut claimed = vec![false; normalized.len()];
        let mut found: Vec<(Field, usize)> = Vec::new();

        claim_in_field_order(&normalized, &mut claimed, &mut found, &|header: &str, synonym: &str| {
            header == synonym
        });
        claim_longest_contained(&normalized, &mut claimed, &mut found);
        claim_in_field_order(&normalized, &mut claimed, &mut found, &|header: &str, synonym: &str| {
            jaro_winkler(header, synonym) >= threshold
        });

        let column = |field: Field| {
            found
                .iter()
                .find(|(f, _)| *f == field)
                .map(|(_, index)| *index)
        };

        let name = column(Field::Name).ok_or_else(|| TransferError::NameColumnNotFound {
            headers: headers
                .iter()
                .map(|h| h.as_ref().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })?;

        Ok(ColumnMapping {
            name,
            quantity: column(Field::Quantity),
            unit: column(Field::Unit),
            unit_price: column(Field::UnitPrice),
            hours: column(Field::Hours),
            category: column(Field::Category),
        })
    }

    /// Column for a field, if mapped.
    pub fn column(&self, field: Field) -> Option<usize> {
        match field {
            Field::Name => Some(self.name),
            Field::Quantity => self.quantity,
            Field::Unit => self.unit,
            Field::UnitPrice => self.unit_price,
            Field::Hours => self.hours,
            Field::Category => self.category,
        }
    }
}

fn is_found(found: &[(Field, usize)], field: Field) -> bool {
    found.iter().any(|(f, _)| *f == field)
}

/// Gives each unmapped field the first free column `matches` accepts.
fn claim_in_field_order(
    headers: &[String],
    claimed: &mut [bool],
    found: &mut Vec<(Field, usize)>,
    matches: &dyn Fn(&str, &str) -> bool,
) {
    for field in Field::MATCH_ORDER {
        if is_found(found, field) {
            continue;
        }
        let hit = headers.iter().enumerate().position(|(index, header)| {
            !claimed[index]
                && !header.is_empty()
                && field.synonyms().iter().any(|synonym| matches(header.as_str(), *synonym))
        });
        if let Some(index) = hit {
            claimed[index] = true;
            found.push((field, index));
        }
    }
}

/// Substring matches across all fields at once, longest synonym first,
/// so "timpris kr" goes to the price ("timpris") and not to hours ("tim").
fn claim_longest_contained(headers: &[String], claimed: &mut [bool], found: &mut Vec<(Field, usize)>) {
    // (synonym length, field rank, column)
    let mut candidates: Vec<(usize, usize, usize)> = Vec::new();
    for (rank, field) in Field::MATCH_ORDER.iter().enumerate() {
        for (index, header) in headers.iter().enumerate() {
            let longest = field
                .synonyms()
                .iter()
                .filter(|synonym| synonym.chars().count() >= 3 && header.contains(**synonym))
                .map(|synonym| synonym.chars().count())
                .max();
            if let Some(len) = longest {
                candidates.push((len, rank, index));
            }
        }
    }

    candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    for (_, rank, index) in candidates {
        let field = Field::MATCH_ORDER[rank];
        if claimed[index] || is_found(found, field) {
            continue;
        }
        claimed[index] = true;
        found.push((field, index));
    }
}

// =============================================================================
// Import
// =============================================================================

/// How to read the file.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Field separator. Swedish Excel writes `;`.
    pub delimiter: u8,
    pub match_threshold: f64,
    /// Kind for rows without a recognised category.
    pub default_kind: ItemKind,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            delimiter: b';',
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            default_kind: ItemKind::Material,
        }
    }
}

/// A data row that was not imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    /// 1-based line in the file, header included.
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub headers: Vec<String>,
    pub mapping: ColumnMapping,
    pub items: Vec<LineItem>,
    pub skipped: Vec<SkippedRow>,
}

/// Reads a CSV article list.
///
/// Fails only when the file itself is unusable (no header, no name column,
/// malformed CSV). Bad rows end up in [`ImportReport::skipped`].
pub fn import_csv<R: Read>(reader: R, options: &ImportOptions) -> TransferResult<ImportReport> {
    let mut csv = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(TransferError::NoHeaders);
    }

    let mapping = ColumnMapping::detect(&headers, options.match_threshold)?;
    debug!(?mapping, "Detected column mapping");

    let mut items = Vec::new();
    let mut skipped = Vec::new();

    for (index, record) in csv.records().enumerate() {
        let record = record?;
        let line = index + 2;

        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        match parse_row(&record, &mapping, options) {
            Ok(item) => items.push(item),
            Err(reason) => {
                debug!(line, %reason, "Skipping row");
                skipped.push(SkippedRow { line, reason });
            }
        }
    }

    info!(
        imported = items.len(),
        skipped = skipped.len(),
        "Spreadsheet import finished"
    );

    Ok(ImportReport {
        headers,
        mapping,
        items,
        skipped,
    })
}

fn cell<'r>(record: &'r StringRecord, column: Option<usize>) -> Option<&'r str> {
    column
        .and_then(|index| record.get(index))
        .filter(|value| !value.is_empty())
}

fn parse_row(
    record: &StringRecord,
    mapping: &ColumnMapping,
    options: &ImportOptions,
) -> Result<LineItem, String> {
    let name = cell(record, Some(mapping.name)).ok_or_else(|| "missing item name".to_string())?;

    let kind = cell(record, mapping.category)
        .and_then(kind_for_category)
        .unwrap_or(options.default_kind);

    let mut item = LineItem::new(name, kind);

    if let Some(unit) = cell(record, mapping.unit) {
        item.set_unit(unit);
    }
    if let Some(price) = cell(record, mapping.unit_price).and_then(parse_decimal) {
        item.set_unit_price(Money::new(price));
    }

    let quantity = cell(record, mapping.quantity).and_then(parse_decimal);
    let hours = cell(record, mapping.hours).and_then(parse_decimal);

    if kind.is_labor() {
        item.set_hours(hours.or(quantity));
    } else {
        item.set_quantity(quantity);
        item.set_hours(hours);
    }

    Ok(item)
}

// =============================================================================
// Unit Tests
// =============================================================================
