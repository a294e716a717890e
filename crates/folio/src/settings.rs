//! Engine configuration file handling
//!
//! Directory structure:
//! ~/.folio/
//!   folio.yaml           # Engine configuration (optional, defaults when missing)
//!   folio.log            # Log output

use std::fs;
use std::path::{Path, PathBuf};

use folio_core::{EngineConfig, validation};

pub const CONFIG_FILE: &str = "folio.yaml";

/// Error types for settings operations
#[derive(Debug)]
pub enum SettingsError {
    Io(String),
    Parse(String),
    Serialize(String),
    Invalid(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(msg) => write!(f, "IO error: {}", msg),
            SettingsError::Parse(msg) => write!(f, "Parse error: {}", msg),
            SettingsError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            SettingsError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Get the default data directory path (~/.folio/)
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".folio")
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load and validate the engine configuration. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<EngineConfig, SettingsError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(EngineConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| SettingsError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    if content.trim().is_empty() {
        return Ok(EngineConfig::default());
    }

    let config: EngineConfig = serde_saphyr::from_str(&content)
        .map_err(|e| SettingsError::Parse(format!("Failed to parse {}: {}", path.display(), e)))?;
    validation::validate_config(&config)
        .map_err(|e| SettingsError::Invalid(format!("{}: {}", path.display(), e)))?;
    Ok(config)
}

/// Write `config` as YAML, creating parent directories as needed
pub fn save_config(config: &EngineConfig, path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| SettingsError::Io(format!("Failed to create {}: {}", parent.display(), e)))?;
    }

    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| SettingsError::Serialize(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, yaml)
        .map_err(|e| SettingsError::Io(format!("Failed to write {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{AssetClass, LookbackWindow};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&config_path(temp_dir.path())).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = config_path(&temp_dir.path().join(".folio"));

        let mut config = EngineConfig::default();
        config.risk_free_rate = 0.05;
        config.estimation_window = LookbackWindow::TenYears;
        config
            .tickers
            .insert(AssetClass::Crypto, "ETH-USD".to_string());

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = config_path(temp_dir.path());
        fs::write(&path, "risk_free_rate: 0.1\nlimits:\n  max_simulations: 500\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.risk_free_rate, 0.1);
        assert_eq!(config.limits.max_simulations, 500);
        assert_eq!(config.limits.min_simulations, 100);
        assert_eq!(config.fetch_timeout_secs, 10);
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = config_path(temp_dir.path());
        fs::write(&path, "risk_free_rate: [not, a, number]\n").unwrap();

        assert!(matches!(load_config(&path), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_negative_volatility_is_rejected_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = config_path(temp_dir.path());
        fs::write(
            &path,
            "default_parameters:\n  mean_monthly_return: 0.01\n  monthly_volatility: -0.03\n",
        )
        .unwrap();

        match load_config(&path) {
            Err(SettingsError::Invalid(msg)) => {
                assert!(msg.contains("default_parameters.monthly_volatility"), "{}", msg)
            }
            other => panic!("Expected an invalid configuration, got {:?}", other),
        }
    }
}
