//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/canopy/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/canopy/` (~/.config/canopy/)
//! - State/Logs: `$XDG_STATE_HOME/canopy/` (~/.local/state/canopy/)
//!
//! The `[analytics]` table holds every coefficient the forecasting and carbon
//! heuristics use, so deployments can tune them without code changes.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Forecasting and sustainability coefficients
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Coefficients for the yield forecast and carbon heuristics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyticsConfig {
    /// Expected days from planting to harvest
    #[serde(default = "default_expected_cycle_days")]
    pub expected_cycle_days: f64,

    /// Lower bound on stage progress when extrapolating a young plantation
    #[serde(default = "default_min_stage_progress")]
    pub min_stage_progress: f64,

    /// Per-tree yield used when no checkpoint exists anywhere
    #[serde(default = "default_yield_per_tree_kg")]
    pub default_yield_per_tree_kg: f64,

    /// Multiplier for the optimistic scenario (>= 1)
    #[serde(default = "default_best_case_multiplier")]
    pub best_case_multiplier: f64,

    /// Multiplier for the pessimistic scenario (<= 1)
    #[serde(default = "default_worst_case_multiplier")]
    pub worst_case_multiplier: f64,

    /// CO2 sequestered per mature tree per year, in tonnes
    #[serde(default = "default_carbon_tons_per_tree_year")]
    pub carbon_tons_per_tree_year: f64,

    /// Minimum plantation age credited for carbon, in years
    #[serde(default = "default_min_carbon_age_years")]
    pub min_carbon_age_years: f64,

    /// Canopy share credited to freshly planted saplings
    #[serde(default = "default_planted_carbon_factor")]
    pub planted_carbon_factor: f64,

    /// Planting density used to derive area from tree counts
    #[serde(default = "default_trees_per_hectare")]
    pub trees_per_hectare: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            expected_cycle_days: default_expected_cycle_days(),
            min_stage_progress: default_min_stage_progress(),
            default_yield_per_tree_kg: default_yield_per_tree_kg(),
            best_case_multiplier: default_best_case_multiplier(),
            worst_case_multiplier: default_worst_case_multiplier(),
            carbon_tons_per_tree_year: default_carbon_tons_per_tree_year(),
            min_carbon_age_years: default_min_carbon_age_years(),
            planted_carbon_factor: default_planted_carbon_factor(),
            trees_per_hectare: default_trees_per_hectare(),
        }
    }
}

impl AnalyticsConfig {
    /// Validate coefficients, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        let finite_positive = |value: f64| value.is_finite() && value > 0.0;

        if !finite_positive(self.expected_cycle_days) {
            return Err(Error::Config(
                "analytics.expected_cycle_days must be positive".to_string(),
            ));
        }
        if !finite_positive(self.min_stage_progress) || self.min_stage_progress > 1.0 {
            return Err(Error::Config(
                "analytics.min_stage_progress must be in (0, 1]".to_string(),
            ));
        }
        if !self.default_yield_per_tree_kg.is_finite() || self.default_yield_per_tree_kg < 0.0 {
            return Err(Error::Config(
                "analytics.default_yield_per_tree_kg must not be negative".to_string(),
            ));
        }
        if !self.best_case_multiplier.is_finite() || self.best_case_multiplier < 1.0 {
            return Err(Error::Config(
                "analytics.best_case_multiplier must be at least 1.0".to_string(),
            ));
        }
        if !self.worst_case_multiplier.is_finite()
            || self.worst_case_multiplier < 0.0
            || self.worst_case_multiplier > 1.0
        {
            return Err(Error::Config(
                "analytics.worst_case_multiplier must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !self.carbon_tons_per_tree_year.is_finite() || self.carbon_tons_per_tree_year < 0.0 {
            return Err(Error::Config(
                "analytics.carbon_tons_per_tree_year must not be negative".to_string(),
            ));
        }
        if !self.min_carbon_age_years.is_finite() || self.min_carbon_age_years < 0.0 {
            return Err(Error::Config(
                "analytics.min_carbon_age_years must not be negative".to_string(),
            ));
        }
        if !self.planted_carbon_factor.is_finite()
            || !(0.0..=1.0).contains(&self.planted_carbon_factor)
        {
            return Err(Error::Config(
                "analytics.planted_carbon_factor must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !finite_positive(self.trees_per_hectare) {
            return Err(Error::Config(
                "analytics.trees_per_hectare must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_expected_cycle_days() -> f64 {
    120.0
}

fn default_min_stage_progress() -> f64 {
    0.1
}

fn default_yield_per_tree_kg() -> f64 {
    2.0
}

fn default_best_case_multiplier() -> f64 {
    1.2
}

fn default_worst_case_multiplier() -> f64 {
    0.8
}

fn default_carbon_tons_per_tree_year() -> f64 {
    0.022
}

fn default_min_carbon_age_years() -> f64 {
    1.0 / 12.0
}

fn default_planted_carbon_factor() -> f64 {
    0.5
}

fn default_trees_per_hectare() -> f64 {
    400.0
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.analytics.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/canopy/config.toml` (~/.config/canopy/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("canopy").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/canopy/` (~/.local/state/canopy/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("canopy")
    }

    /// Returns the base log file path
    ///
    /// `$XDG_STATE_HOME/canopy/canopy.log`. Daily rotation writes dated
    /// files next to it (`canopy.2024-05-10.log`).
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("canopy.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analytics.expected_cycle_days, 120.0);
        assert_eq!(config.analytics.best_case_multiplier, 1.2);
        assert_eq!(config.analytics.worst_case_multiplier, 0.8);
        assert_eq!(config.logging.level, "info");
        assert!(config.analytics.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[analytics]
expected_cycle_days = 180.0
best_case_multiplier = 1.35

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.analytics.expected_cycle_days, 180.0);
        assert_eq!(config.analytics.best_case_multiplier, 1.35);
        // Unset keys keep their defaults
        assert_eq!(config.analytics.worst_case_multiplier, 0.8);
        assert_eq!(config.analytics.trees_per_hectare, 400.0);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.max_files, 5);
    }

    #[test]
    fn test_multiplier_validation() {
        let config = AnalyticsConfig {
            best_case_multiplier: 0.9,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalyticsConfig {
            worst_case_multiplier: 1.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalyticsConfig {
            best_case_multiplier: 1.0,
            worst_case_multiplier: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cycle_and_density_validation() {
        let config = AnalyticsConfig {
            expected_cycle_days: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalyticsConfig {
            trees_per_hectare: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalyticsConfig {
            min_stage_progress: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_rejects_invalid_coefficients() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analytics]\nworst_case_multiplier = 2.0").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_path_suffix() {
        assert!(Config::config_path().ends_with("canopy/config.toml"));
        assert!(Config::log_path().ends_with("canopy.log"));
    }
}
