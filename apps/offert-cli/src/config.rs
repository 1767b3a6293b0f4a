//! # Offert Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     OFFERT_GLOBAL_MARKUP=12                                            │
//! │     OFFERT_PAYROLL_SYSTEM=visma                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/offert/offert.toml (Linux)                               │
//! │     ~/Library/Application Support/se.offert.offert/offert.toml (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     no markup, ROT 30 %, combined deductions, Fortnox                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [pricing]
//! global_markup_percent = 10
//! rot_percent = 30
//! rot_enabled = true
//! rut_enabled = false
//! deduction_mode = "combined"   # combined | exclusive
//!
//! [import]
//! delimiter = ";"
//! match_threshold = 0.85
//! default_kind = "material"
//!
//! [payroll]
//! system = "fortnox"            # fortnox | visma
//! company_name = "Bygg AB"
//! org_number = "556677-8899"
//! ```
//!
//! Estimate files that carry their own policy or markup keep them; these
//! settings only fill in what a file leaves out.

use std::path::{Path, PathBuf};

use offert_core::validation::{validate_markup_percent, validate_rot_percent};
use offert_core::{DeductionMode, ItemKind, Percent, TaxDeductionPolicy};
use offert_transfer::import::DEFAULT_MATCH_THRESHOLD;
use offert_transfer::{ImportOptions, PayrollSystem};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Pricing Settings
// =============================================================================

/// Defaults for estimates that do not carry their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default)]
    pub global_markup_percent: Percent,

    #[serde(default = "default_rot_percent")]
    pub rot_percent: Percent,

    #[serde(default = "default_true")]
    pub rot_enabled: bool,

    #[serde(default)]
    pub rut_enabled: bool,

    #[serde(default)]
    pub deduction_mode: DeductionMode,
}

fn default_rot_percent() -> Percent {
    Percent::DEFAULT_ROT
}

fn default_true() -> bool {
    true
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            global_markup_percent: Percent::zero(),
            rot_percent: default_rot_percent(),
            rot_enabled: true,
            rut_enabled: false,
            deduction_mode: DeductionMode::default(),
        }
    }
}

// =============================================================================
// Import Settings
// =============================================================================

/// Spreadsheet import settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Single-character field separator.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Minimum Jaro-Winkler similarity for fuzzy header matches (0–1).
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,

    /// Kind for rows with no recognised category.
    #[serde(default)]
    pub default_kind: ItemKind,
}

fn default_delimiter() -> String {
    ";".to_string()
}

fn default_match_threshold() -> f64 {
    DEFAULT_MATCH_THRESHOLD
}

impl Default for ImportSettings {
    fn default() -> Self {
        ImportSettings {
            delimiter: default_delimiter(),
            match_threshold: default_match_threshold(),
            default_kind: ItemKind::default(),
        }
    }
}

// =============================================================================
// Payroll Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollSettings {
    #[serde(default)]
    pub system: PayrollSystem,

    #[serde(default)]
    pub company_name: Option<String>,

    #[serde(default)]
    pub org_number: Option<String>,
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OffertConfig {
    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub import: ImportSettings,

    #[serde(default)]
    pub payroll: PayrollSettings,
}

impl OffertConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (offert.toml)
    /// 3. Environment variables
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                info!(?path, "Loading config from file");
                Self::from_file(path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => {
                    info!(?path, "Loading config from file");
                    Self::from_file(&path)?
                }
                path => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file, creating parent directories.
    pub fn save(&self, config_path: Option<&Path>) -> ConfigResult<PathBuf> {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_markup_percent(self.pricing.global_markup_percent)?;
        validate_rot_percent(self.pricing.rot_percent)?;

        if self.pricing.deduction_mode == DeductionMode::Exclusive
            && self.pricing.rot_enabled
            && self.pricing.rut_enabled
        {
            return Err(ConfigError::Invalid(
                "rot_enabled and rut_enabled cannot both be set in exclusive mode".into(),
            ));
        }

        let delimiter = self.import.delimiter.as_bytes();
        if delimiter.len() != 1 {
            return Err(ConfigError::Invalid(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.import.delimiter
            )));
        }

        if !(self.import.match_threshold > 0.0 && self.import.match_threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "match_threshold must be in (0, 1], got {}",
                self.import.match_threshold
            )));
        }

        Ok(())
    }

    /// Applies `OFFERT_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup("OFFERT_GLOBAL_MARKUP") {
            match offert_core::parse_decimal(&raw) {
                Some(value) => {
                    debug!(markup = %raw, "Overriding global markup from environment");
                    self.pricing.global_markup_percent = Percent::new(value);
                }
                None => warn!(value = %raw, "Ignoring non-numeric OFFERT_GLOBAL_MARKUP"),
            }
        }

        if let Some(raw) = lookup("OFFERT_ROT_PERCENT") {
            match offert_core::parse_decimal(&raw) {
                Some(value) => self.pricing.rot_percent = Percent::new(value),
                None => warn!(value = %raw, "Ignoring non-numeric OFFERT_ROT_PERCENT"),
            }
        }

        if let Some(raw) = lookup("OFFERT_DEDUCTION_MODE") {
            match raw.parse() {
                Ok(mode) => self.pricing.deduction_mode = mode,
                Err(_) => warn!(mode = %raw, "Unknown deduction mode in environment"),
            }
        }

        if let Some(delimiter) = lookup("OFFERT_CSV_DELIMITER") {
            self.import.delimiter = delimiter;
        }

        if let Some(raw) = lookup("OFFERT_MATCH_THRESHOLD") {
            if let Ok(threshold) = raw.parse::<f64>() {
                self.import.match_threshold = threshold;
            }
        }

        if let Some(raw) = lookup("OFFERT_PAYROLL_SYSTEM") {
            match raw.parse() {
                Ok(system) => {
                    debug!(system = %raw, "Overriding payroll system from environment");
                    self.payroll.system = system;
                }
                Err(e) => warn!(error = %e, "Ignoring OFFERT_PAYROLL_SYSTEM"),
            }
        }

        if let Some(name) = lookup("OFFERT_COMPANY_NAME") {
            self.payroll.company_name = Some(name);
        }

        if let Some(org) = lookup("OFFERT_ORG_NUMBER") {
            self.payroll.org_number = Some(org);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("se", "offert", "offert")
            .map(|dirs| dirs.config_dir().join("offert.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Deduction policy for estimates that do not carry one.
    pub fn policy(&self) -> TaxDeductionPolicy {
        let mut policy = TaxDeductionPolicy::new(self.pricing.deduction_mode);
        policy.rot_percent = self.pricing.rot_percent;
        policy.set_rot_enabled(self.pricing.rot_enabled);
        policy.set_rut_enabled(self.pricing.rut_enabled);
        policy
    }

    pub fn global_markup(&self) -> Percent {
        self.pricing.global_markup_percent
    }

    /// Import options; `validate()` guarantees a one-byte delimiter.
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            delimiter: self.import.delimiter.as_bytes().first().copied().unwrap_or(b';'),
            match_threshold: self.import.match_threshold,
            default_kind: self.import.default_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = OffertConfig::default();
        assert!(config.global_markup().is_zero());
        assert_eq!(config.pricing.rot_percent, Percent::DEFAULT_ROT);
        assert_eq!(config.payroll.system, PayrollSystem::Fortnox);
        assert_eq!(config.import_options().delimiter, b';');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config: OffertConfig = toml::from_str(
            r#"
            [pricing]
            global_markup_percent = 12.5
            deduction_mode = "exclusive"
            rot_enabled = false
            rut_enabled = true

            [payroll]
            system = "visma"
            company_name = "Måleri AB"
            "#,
        )
        .unwrap();

        assert_eq!(config.global_markup(), Percent::new("12.5".parse().unwrap()));
        assert_eq!(config.pricing.rot_percent, Percent::DEFAULT_ROT);
        assert_eq!(config.payroll.system, PayrollSystem::Visma);
        assert_eq!(config.import.match_threshold, DEFAULT_MATCH_THRESHOLD);

        let policy = config.policy();
        assert_eq!(policy.mode, DeductionMode::Exclusive);
        assert!(policy.rut_enabled);
        assert!(!policy.rot_enabled);
    }

    #[test]
    fn test_config_validation() {
        let mut config = OffertConfig::default();

        config.pricing.rot_percent = Percent::from_whole(120);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.pricing.rot_percent = Percent::DEFAULT_ROT;

        config.import.delimiter = ";;".to_string();
        assert!(config.validate().is_err());
        config.import.delimiter = "\t".to_string();
        assert!(config.validate().is_ok());

        config.import.match_threshold = 0.0;
        assert!(config.validate().is_err());
        config.import.match_threshold = 1.0;
        assert!(config.validate().is_ok());

        config.pricing.deduction_mode = DeductionMode::Exclusive;
        config.pricing.rut_enabled = true;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = OffertConfig::default();
        config.apply_overrides(overrides(&[
            ("OFFERT_GLOBAL_MARKUP", "15"),
            ("OFFERT_PAYROLL_SYSTEM", "visma"),
            ("OFFERT_CSV_DELIMITER", ","),
            ("OFFERT_COMPANY_NAME", "Snickeri AB"),
            ("OFFERT_DEDUCTION_MODE", "nonsense"),
        ]));

        assert_eq!(config.global_markup(), Percent::from_whole(15));
        assert_eq!(config.payroll.system, PayrollSystem::Visma);
        assert_eq!(config.import_options().delimiter, b',');
        assert_eq!(config.payroll.company_name.as_deref(), Some("Snickeri AB"));
        // unknown values are ignored
        assert_eq!(config.pricing.deduction_mode, DeductionMode::Combined);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = OffertConfig::default();
        config.payroll.org_number = Some("556677-8899".to_string());

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[pricing]"));
        assert!(toml_str.contains("[import]"));
        assert!(toml_str.contains("[payroll]"));

        let back: OffertConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_save_and_load_explicit_path() {
        let dir = std::env::temp_dir().join(format!("offert-config-test-{}", std::process::id()));
        let path = dir.join("offert.toml");

        let mut config = OffertConfig::default();
        config.pricing.global_markup_percent = Percent::from_whole(8);
        config.save(Some(&path)).unwrap();

        let loaded = OffertConfig::from_file(&path).unwrap();
        assert_eq!(loaded.global_markup(), Percent::from_whole(8));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let path = Path::new("/nonexistent/offert/offert.toml");
        assert!(matches!(OffertConfig::load(Some(path)), Err(ConfigError::Io(_))));
    }
}
