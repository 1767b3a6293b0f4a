//! # Payroll Export
//!
//! Writes reported hours as PAXml 2.0, the Swedish interchange format that
//! Fortnox Lön and Visma Lön both import.
//!
//! ## Output Shape
//! ```text
//! <paxml>
//!   <header>           version, timestamp, company
//!   <tidtransaktioner>
//!     <tidtrans anstid="17">        ◄── Fortnox: employee number
//!     <tidtrans persnr="19800101…">  ◄── Visma: personal number
//!       <tidkod>ARB</tidkod>
//!       <datum>2024-03-04</datum>
//!       <timmar>8.00</timmar>
//!       <projekt>P-100</projekt>
//!     </tidtrans>
//!   </tidtransaktioner>
//! </paxml>
//! ```
//!
//! Entries are written sorted by employee, then date.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;

use crate::error::{TransferError, TransferResult};

// =============================================================================
// Time Codes
// =============================================================================

/// Kind of reported time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TimeCode {
    #[default]
    #[serde(alias = "arb")]
    Work,
    #[serde(alias = "ot1")]
    Overtime,
    #[serde(alias = "res")]
    Travel,
    #[serde(alias = "sjk")]
    Sick,
    #[serde(alias = "sem")]
    Vacation,
    #[serde(alias = "vab")]
    ChildCare,
}

impl TimeCode {
    /// PAXml `tidkod`.
    pub fn paxml_code(&self) -> &'static str {
        match self {
            TimeCode::Work => "ARB",
            TimeCode::Overtime => "ÖT1",
            TimeCode::Travel => "RES",
            TimeCode::Sick => "SJK",
            TimeCode::Vacation => "SEM",
            TimeCode::ChildCare => "VAB",
        }
    }
}

// =============================================================================
// Payroll Systems
// =============================================================================

/// Target payroll system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PayrollSystem {
    #[default]
    Fortnox,
    Visma,
}

impl PayrollSystem {
    /// Attribute naming the employee on each `tidtrans`.
    fn identifier_attribute(&self) -> &'static str {
        match self {
            PayrollSystem::Fortnox => "anstid",
            PayrollSystem::Visma => "persnr",
        }
    }

    /// [`TimeEntry`] field that must be filled in.
    fn identifier_field(&self) -> &'static str {
        match self {
            PayrollSystem::Fortnox => "employee_id",
            PayrollSystem::Visma => "personal_number",
        }
    }

    fn identifier<'e>(&self, entry: &'e TimeEntry) -> Option<&'e str> {
        let value = match self {
            PayrollSystem::Fortnox => entry.employee_id.as_deref(),
            PayrollSystem::Visma => entry.personal_number.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

impl fmt::Display for PayrollSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayrollSystem::Fortnox => write!(f, "Fortnox"),
            PayrollSystem::Visma => write!(f, "Visma"),
        }
    }
}

impl FromStr for PayrollSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fortnox" => Ok(PayrollSystem::Fortnox),
            "visma" => Ok(PayrollSystem::Visma),
            other => Err(format!(
                "unknown payroll system '{}' (expected fortnox or visma)",
                other
            )),
        }
    }
}

// =============================================================================
// Time Report
// =============================================================================

/// One day's reported time for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TimeEntry {
    /// Employee number in the payroll system (Fortnox).
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Swedish personnummer (Visma).
    #[serde(default)]
    pub personal_number: Option<String>,
    #[ts(type = "string")]
    pub date: NaiveDate,
    #[ts(type = "string")]
    pub hours: Decimal,
    #[serde(default)]
    pub code: TimeCode,
    #[serde(default)]
    pub project: Option<String>,
}

/// A time report file as read by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct TimeReport {
    pub company_name: Option<String>,
    pub org_number: Option<String>,
    pub entries: Vec<TimeEntry>,
}

/// Header fields of an export.
#[derive(Debug, Clone)]
pub struct ExportHeader {
    pub company_name: Option<String>,
    pub org_number: Option<String>,
    pub created: NaiveDateTime,
}

// =============================================================================
// Export
// =============================================================================

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn element(out: &mut String, indent: usize, name: &str, value: &str) {
    out.push_str(&" ".repeat(indent));
    out.push('<');
    out.push_str(name);
    out.push('>');
    out.push_str(&escape_xml(value));
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

fn format_hours(hours: Decimal) -> String {
    let rounded = hours.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Checks every entry before anything is written.
fn validate_entries(entries: &[TimeEntry], system: PayrollSystem) -> TransferResult<()> {
    if entries.is_empty() {
        return Err(TransferError::EmptyReport);
    }

    let max_hours = Decimal::from(24);
    for (index, entry) in entries.iter().enumerate() {
        if system.identifier(entry).is_none() {
            return Err(TransferError::MissingEmployeeIdentifier {
                index,
                field: system.identifier_field(),
                system: system.to_string(),
            });
        }
        if entry.hours < Decimal::ZERO || entry.hours > max_hours {
            return Err(TransferError::InvalidHours {
                index,
                hours: entry.hours.to_string(),
            });
        }
    }
    Ok(())
}

/// Renders a PAXml 2.0 document for the given payroll system.
///
/// ## Errors
/// - `EmptyReport` if there are no entries
/// - `MissingEmployeeIdentifier` if an entry lacks the id the system keys on
/// - `InvalidHours` for negative hours or more than 24 in a day
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use offert_transfer::payroll::{export_paxml, ExportHeader, PayrollSystem, TimeCode, TimeEntry};
/// use rust_decimal::Decimal;
///
/// let entry = TimeEntry {
///     employee_id: Some("17".to_string()),
///     personal_number: None,
///     date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
///     hours: Decimal::from(8),
///     code: TimeCode::Work,
///     project: Some("P-100".to_string()),
/// };
/// let header = ExportHeader {
///     company_name: Some("Bygg AB".to_string()),
///     org_number: None,
///     created: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap().and_hms_opt(12, 0, 0).unwrap(),
/// };
///
/// let xml = export_paxml(&[entry], PayrollSystem::Fortnox, &header).unwrap();
/// assert!(xml.contains(r#"<tidtrans anstid="17">"#));
/// assert!(xml.contains("<timmar>8.00</timmar>"));
/// ```
pub fn export_paxml(
    entries: &[TimeEntry],
    system: PayrollSystem,
    header: &ExportHeader,
) -> TransferResult<String> {
    validate_entries(entries, system)?;

    let mut sorted: Vec<(&str, &TimeEntry)> = entries
        .iter()
        .filter_map(|entry| system.identifier(entry).map(|id| (id, entry)))
        .collect();
    sorted.sort_by(|(a_id, a), (b_id, b)| a_id.cmp(b_id).then(a.date.cmp(&b.date)));

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str(
        "<paxml xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xsi:noNamespaceSchemaLocation=\"http://www.paxml.se/2.0/paxml.xsd\">\n",
    );

    out.push_str("  <header>\n");
    element(&mut out, 4, "version", "2.0");
    element(
        &mut out,
        4,
        "datum",
        &header.created.format("%Y-%m-%dT%H:%M:%S").to_string(),
    );
    if let Some(name) = &header.company_name {
        element(&mut out, 4, "foretagnamn", name);
    }
    if let Some(org) = &header.org_number {
        element(&mut out, 4, "foretagorgnr", org);
    }
    out.push_str("  </header>\n");

    out.push_str("  <tidtransaktioner>\n");
    for (id, entry) in &sorted {
        out.push_str(&format!(
            "    <tidtrans {}=\"{}\">\n",
            system.identifier_attribute(),
            escape_xml(id)
        ));
        element(&mut out, 6, "tidkod", entry.code.paxml_code());
        element(&mut out, 6, "datum", &entry.date.format("%Y-%m-%d").to_string());
        element(&mut out, 6, "timmar", &format_hours(entry.hours));
        if let Some(project) = entry.project.as_deref().filter(|p| !p.trim().is_empty()) {
            element(&mut out, 6, "projekt", project);
        }
        out.push_str("    </tidtrans>\n");
    }
    out.push_str("  </tidtransaktioner>\n");
    out.push_str("</paxml>\n");

    let employees = {
        let mut ids: Vec<&str> = sorted.iter().map(|(id, _)| *id).collect();
        ids.dedup();
        ids.len()
    };
    info!(
        system = %system,
        entries = sorted.len(),
        employees,
        "Payroll export rendered"
    );

    Ok(out)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn entry(employee: &str, personal: &str, day: u32, hours: &str) -> TimeEntry {
        TimeEntry {
            employee_id: Some(employee.to_string()),
            personal_number: Some(personal.to_string()),
            date: date(day),
            hours: hours.parse().unwrap(),
            code: TimeCode::Work,
            project: None,
        }
    }

    fn header() -> ExportHeader {
        ExportHeader {
            company_name: Some("Bygg & Måleri AB".to_string()),
            org_number: Some("556677-8899".to_string()),
            created: date(31).and_hms_opt(16, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_fortnox_uses_employee_number() {
        let xml = export_paxml(&[entry("17", "198001011234", 4, "8")], PayrollSystem::Fortnox, &header()).unwrap();
        assert!(xml.contains(r#"<tidtrans anstid="17">"#));
        assert!(!xml.contains("persnr"));
        assert!(xml.contains("<datum>2024-03-04</datum>"));
        assert!(xml.contains("<datum>2024-03-31T16:30:00</datum>"));
        assert!(xml.contains("<version>2.0</version>"));
    }

    #[test]
    fn test_visma_uses_personal_number() {
        let xml = export_paxml(&[entry("17", "198001011234", 4, "8")], PayrollSystem::Visma, &header()).unwrap();
        assert!(xml.contains(r#"<tidtrans persnr="198001011234">"#));
        assert!(!xml.contains("anstid"));
    }

    #[test]
    fn test_sorted_by_employee_then_date() {
        let entries = vec![
            entry("2", "", 5, "8"),
            entry("1", "", 6, "8"),
            entry("2", "", 4, "8"),
            entry("1", "", 4, "8"),
        ];
        let xml = export_paxml(&entries, PayrollSystem::Fortnox, &header()).unwrap();

        let order: Vec<(&str, &str)> = xml
            .lines()
            .filter(|line| line.contains("anstid=") || line.contains("<datum>2024-03-0"))
            .collect::<Vec<_>>()
            .chunks(2)
            .map(|pair| (pair[0].trim(), pair[1].trim()))
            .collect();
        assert_eq!(
            order,
            vec![
                (r#"<tidtrans anstid="1">"#, "<datum>2024-03-04</datum>"),
                (r#"<tidtrans anstid="1">"#, "<datum>2024-03-06</datum>"),
                (r#"<tidtrans anstid="2">"#, "<datum>2024-03-04</datum>"),
                (r#"<tidtrans anstid="2">"#, "<datum>2024-03-05</datum>"),
            ]
        );
    }

    #[test]
    fn test_hours_two_decimals() {
        assert_eq!(format_hours("7.5".parse().unwrap()), "7.50");
        assert_eq!(format_hours("8".parse().unwrap()), "8.00");
        assert_eq!(format_hours("2.345".parse().unwrap()), "2.35");
    }

    #[test]
    fn test_text_is_escaped() {
        let mut e = entry("7", "", 4, "3");
        e.project = Some("Kök <plan 2> & \"bad\"".to_string());
        let xml = export_paxml(&[e], PayrollSystem::Fortnox, &header()).unwrap();
        assert!(xml.contains("<foretagnamn>Bygg &amp; Måleri AB</foretagnamn>"));
        assert!(xml.contains("<projekt>Kök &lt;plan 2&gt; &amp; &quot;bad&quot;</projekt>"));
    }

    #[test]
    fn test_time_codes() {
        let mut e = entry("7", "", 4, "2");
        e.code = TimeCode::Overtime;
        let xml = export_paxml(&[e], PayrollSystem::Fortnox, &header()).unwrap();
        assert!(xml.contains("<tidkod>ÖT1</tidkod>"));
        assert_eq!(TimeCode::ChildCare.paxml_code(), "VAB");
        assert_eq!(TimeCode::Sick.paxml_code(), "SJK");
    }

    #[test]
    fn test_empty_report_rejected() {
        let err = export_paxml(&[], PayrollSystem::Visma, &header()).unwrap_err();
        assert!(matches!(err, TransferError::EmptyReport));
    }

    #[test]
    fn test_missing_identifier_rejected() {
        let entries = vec![entry("1", "198001011234", 4, "8"), entry("2", "  ", 5, "8")];
        let err = export_paxml(&entries, PayrollSystem::Visma, &header()).unwrap_err();
        assert!(matches!(
            err,
            TransferError::MissingEmployeeIdentifier { index: 1, field: "personal_number", .. }
        ));
        // Fortnox does not need the personal number
        assert!(export_paxml(&entries, PayrollSystem::Fortnox, &header()).is_ok());
    }

    #[test]
    fn test_invalid_hours_rejected() {
        let err = export_paxml(&[entry("1", "", 4, "25")], PayrollSystem::Fortnox, &header()).unwrap_err();
        assert!(matches!(err, TransferError::InvalidHours { index: 0, .. }));
    }

    #[test]
    fn test_time_report_from_json() {
        let report: TimeReport = serde_json::from_str(
            r#"{
                "companyName": "Bygg AB",
                "entries": [
                    {"employeeId": "17", "date": "2024-03-04", "hours": "7.5"},
                    {"employeeId": "17", "date": "2024-03-05", "hours": 8, "code": "vab"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].code, TimeCode::Work);
        assert_eq!(report.entries[1].code, TimeCode::ChildCare);
        assert_eq!(report.entries[0].hours, "7.5".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_payroll_system_from_str() {
        assert_eq!("Visma".parse::<PayrollSystem>(), Ok(PayrollSystem::Visma));
        assert_eq!(" fortnox ".parse::<PayrollSystem>(), Ok(PayrollSystem::Fortnox));
        assert!("hogia".parse::<PayrollSystem>().is_err());
    }
}
