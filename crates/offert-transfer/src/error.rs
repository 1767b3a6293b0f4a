//! # Transfer Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Transfer Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Import      │  │     Payroll     │  │       I/O               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  NoHeaders      │  │  EmptyReport    │  │  Csv                    │ │
//! │  │  NameColumn...  │  │  MissingEmpl... │  │  Io                     │ │
//! │  │                 │  │  InvalidHours   │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for import/export operations.
pub type TransferResult<T> = Result<T, TransferError>;

#[derive(Debug, Error)]
pub enum TransferError {
    // =========================================================================
    // Import Errors
    // =========================================================================
    /// The file has no header row.
    #[error("File has no header row")]
    NoHeaders,

    /// No column could be matched to the row description.
    #[error("No column matches the item name (headers: {headers})")]
    NameColumnNotFound { headers: String },

    /// Malformed CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // =========================================================================
    // Payroll Errors
    // =========================================================================
    /// Nothing to export.
    #[error("Time report is empty")]
    EmptyReport,

    /// An entry lacks the identifier the target system needs.
    #[error("Entry {index} has no {field} (required by {system})")]
    MissingEmployeeIdentifier {
        index: usize,
        field: &'static str,
        system: String,
    },

    /// Hours outside 0–24 for a single day.
    #[error("Entry {index} has invalid hours: {hours}")]
    InvalidHours { index: usize, hours: String },

    // =========================================================================
    // I/O
    // =========================================================================
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TransferError::MissingEmployeeIdentifier {
            index: 3,
            field: "personal_number",
            system: "Visma".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Entry 3 has no personal_number (required by Visma)"
        );
        assert_eq!(TransferError::EmptyReport.to_string(), "Time report is empty");
    }
}
