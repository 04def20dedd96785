//! # Settings Module
//!
//! ## Purpose
//! Keeps the tunable parameters of ChemBalance in one place: where element data comes from,
//! the defensive limits applied to formula strings, the acceptance tolerance of Hess's law
//! fits and the logging level of the binary.
//!
//! ## Architecture
//! - **ChemConfig**: serializable configuration structure
//! - **ConfigManager**: loads, validates, updates and persists the configuration
//! - **Global Access**: `OnceLock<Mutex<_>>` singleton, `with_config` / `with_config_mut`
//! - **Configuration File**: JSON file `chem_config.json` in the working directory
//!
//! ## Configuration Format
//! ```json
//! {
//!   "element_data": null,
//!   "max_formula_length": 256,
//!   "max_bracket_depth": 32,
//!   "max_atoms": 100000,
//!   "hess_residual_tolerance": 1e-6,
//!   "log_level": "info"
//! }
//! ```
//!
//! ## Usage
//! ```rust
//! use ChemBalance::settings::with_config;
//!
//! let depth = with_config(|cfg| cfg.max_bracket_depth);
//! assert!(depth > 0);
//! ```
use crate::errors::{ChemError, ChemResult};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};

pub const DEFAULT_CONFIG_FILE: &str = "chem_config.json";

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Configuration of parsing limits, element data source and logging.
///
/// # Fields
/// * `element_data` - path to a JSON array of element records, `None` for the built-in table
/// * `max_formula_length` - longest accepted formula string (characters, whitespace excluded)
/// * `max_bracket_depth` - deepest accepted bracket nesting
/// * `max_atoms` - largest accepted expanded atom count of one formula
/// * `hess_residual_tolerance` - largest least-squares residual accepted by `Equation::extend`
/// * `log_level` - one of off, error, warn, info, debug, trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChemConfig {
    pub element_data: Option<String>,
    pub max_formula_length: usize,
    pub max_bracket_depth: usize,
    pub max_atoms: usize,
    pub hess_residual_tolerance: f64,
    pub log_level: String,
}

impl Default for ChemConfig {
    fn default() -> Self {
        Self {
            element_data: None,
            max_formula_length: 256,
            max_bracket_depth: 32,
            max_atoms: 100_000,
            hess_residual_tolerance: 1e-6,
            log_level: "info".to_string(),
        }
    }
}

/// Loads, updates and persists `ChemConfig`.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: ChemConfig,
    config_file: String,
}

impl ConfigManager {
    /// Creates a manager backed by `chem_config.json`, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn new() -> Self {
        Self::with_config_file(DEFAULT_CONFIG_FILE)
    }

    /// Creates a manager backed by a custom configuration file.
    pub fn with_config_file(config_file: &str) -> Self {
        let config = match Self::load_config(config_file) {
            Ok(config) => config,
            Err(e) => {
                warn!("config file '{}' ignored: {}", config_file, e);
                ChemConfig::default()
            }
        };
        Self {
            config,
            config_file: config_file.to_string(),
        }
    }

    fn load_config(config_file: &str) -> ChemResult<ChemConfig> {
        if Path::new(config_file).exists() {
            let content = fs::read_to_string(config_file)?;
            let config: ChemConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(ChemConfig::default())
        }
    }

    /// Writes the configuration to its file. Does nothing under test.
    pub fn save_config(&self) -> ChemResult<()> {
        #[cfg(test)]
        {
            return Ok(());
        }

        #[cfg(not(test))]
        {
            let content = serde_json::to_string_pretty(&self.config)?;
            fs::write(&self.config_file, content)?;
            Ok(())
        }
    }

    pub fn get_config(&self) -> &ChemConfig {
        &self.config
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Points the element data source at a JSON file. The file must exist.
    pub fn set_element_data(&mut self, path: &str) -> ChemResult<()> {
        if !Path::new(path).exists() {
            return Err(ChemError::ElementData(format!(
                "File does not exist: {}",
                path
            )));
        }
        self.config.element_data = Some(path.to_string());
        self.save_config()
    }

    pub fn set_log_level(&mut self, level: &str) -> ChemResult<()> {
        let level = level.trim().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ChemError::Config(format!(
                "Unknown log level: {}",
                level
            )));
        }
        self.config.log_level = level;
        self.save_config()
    }

    /// Updates several numeric limits at once. Either every key is valid and all are
    /// applied, or nothing changes.
    ///
    /// Recognised keys: max_formula_length, max_bracket_depth, max_atoms,
    /// hess_residual_tolerance.
    pub fn update_limits(&mut self, updates: HashMap<&str, f64>) -> ChemResult<()> {
        let mut config = self.config.clone();
        for (key, value) in updates {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChemError::Config(format!(
                    "Limit {} must be positive, got {}",
                    key, value
                )));
            }
            match key {
                "max_formula_length" => config.max_formula_length = value as usize,
                "max_bracket_depth" => config.max_bracket_depth = value as usize,
                "max_atoms" => config.max_atoms = value as usize,
                "hess_residual_tolerance" => config.hess_residual_tolerance = value,
                _ => {
                    return Err(ChemError::Config(format!(
                        "Unknown limit key: {}",
                        key
                    )));
                }
            }
        }
        self.config = config;
        self.save_config()
    }

    pub fn reset_to_defaults(&mut self) -> ChemResult<()> {
        self.config = ChemConfig::default();
        self.save_config()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_CONFIG_MANAGER: OnceLock<Mutex<ConfigManager>> = OnceLock::new();

fn get_config_manager() -> MutexGuard<'static, ConfigManager> {
    GLOBAL_CONFIG_MANAGER
        .get_or_init(|| Mutex::new(ConfigManager::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Runs `f` with read access to the global configuration.
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&ChemConfig) -> R,
{
    let manager = get_config_manager();
    f(manager.get_config())
}

/// Runs `f` with write access to the global configuration manager.
pub fn with_config_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut ConfigManager) -> R,
{
    let mut manager = get_config_manager();
    f(&mut manager)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_when_file_missing() {
        let manager = ConfigManager::with_config_file("definitely_missing_chem_config.json");
        assert_eq!(manager.get_config(), &ChemConfig::default());
        assert_eq!(manager.get_config().max_bracket_depth, 32);
    }

    #[test]
    fn test_partial_config_file() {
        let mut temp_config = NamedTempFile::new().unwrap();
        temp_config
            .write_all(br#"{ "max_formula_length": 40, "log_level": "debug" }"#)
            .unwrap();
        let manager = ConfigManager::with_config_file(temp_config.path().to_str().unwrap());
        assert_eq!(manager.get_config().max_formula_length, 40);
        assert_eq!(manager.get_config().log_level, "debug");
        // untouched fields keep their defaults
        assert_eq!(manager.get_config().max_atoms, 100_000);
    }

    #[test]
    fn test_broken_config_file_falls_back() {
        let mut temp_config = NamedTempFile::new().unwrap();
        temp_config.write_all(b"{ not json").unwrap();
        let manager = ConfigManager::with_config_file(temp_config.path().to_str().unwrap());
        assert_eq!(manager.get_config(), &ChemConfig::default());
    }

    #[test]
    fn test_update_limits_is_all_or_nothing() {
        let mut manager = ConfigManager::with_config_file("definitely_missing_chem_config.json");
        let updates = HashMap::from([("max_atoms", 10.0), ("no_such_key", 1.0)]);
        assert!(manager.update_limits(updates).is_err());
        assert_eq!(manager.get_config().max_atoms, 100_000);

        let updates = HashMap::from([("max_atoms", 10.0), ("hess_residual_tolerance", 1e-3)]);
        manager.update_limits(updates).unwrap();
        assert_eq!(manager.get_config().max_atoms, 10);
        assert_eq!(manager.get_config().hess_residual_tolerance, 1e-3);
    }

    #[test]
    fn test_set_element_data_requires_file() {
        let mut manager = ConfigManager::with_config_file("definitely_missing_chem_config.json");
        assert!(manager.set_element_data("no/such/elements.json").is_err());
        let temp = NamedTempFile::new().unwrap();
        manager
            .set_element_data(temp.path().to_str().unwrap())
            .unwrap();
        assert_eq!(
            manager.get_config().element_data.as_deref(),
            temp.path().to_str()
        );
    }

    #[test]
    fn test_log_level_validation() {
        let mut manager = ConfigManager::with_config_file("definitely_missing_chem_config.json");
        assert!(manager.set_log_level("loud").is_err());
        manager.set_log_level("TRACE").unwrap();
        assert_eq!(manager.get_config().log_level, "trace");
    }
}
