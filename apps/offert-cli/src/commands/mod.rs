//! # CLI Commands
//!
//! One module per subcommand. Each exposes a clap `Args` (or `Subcommand`)
//! type and a `run` function taking the loaded config.
//!
//! - [`totals`] - Figures for an estimate file
//! - [`import`] - Spreadsheet → estimate file
//! - [`payroll`] - Time report → PAXml
//! - [`config`] - Show or create the config file

pub mod config;
pub mod import;
pub mod payroll;
pub mod totals;
