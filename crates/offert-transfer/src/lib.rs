//! # offert-transfer: Import and Export for Offert
//!
//! File formats on both sides of the pricing core.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Excel (CSV) ────► import::import_csv ────► Vec<LineItem>             │
//! │                          │                        │                     │
//! │                          ▼                        ▼                     │
//! │                   ColumnMapping            offert-core pricing         │
//! │                                                                         │
//! │   TimeReport ─────► payroll::export_paxml ─► PAXml 2.0                 │
//! │                                               (Fortnox / Visma)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`import`] - Column detection and CSV row parsing
//! - [`payroll`] - Time report export
//! - [`error`] - Transfer error types

pub mod error;
pub mod import;
pub mod payroll;

pub use error::{TransferError, TransferResult};
pub use import::{import_csv, ColumnMapping, ImportOptions, ImportReport, SkippedRow};
pub use payroll::{export_paxml, ExportHeader, PayrollSystem, TimeCode, TimeEntry, TimeReport};
