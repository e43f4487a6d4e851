//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::TransportConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Mode name that selects the production profile.
pub const PROD_MODE: &str = "prod";

const DEFAULT_FILE: &str = "conf.toml";
const PROD_FILE: &str = "conf_prod.toml";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<TransportConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: TransportConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Path of the profile file for `mode` inside `dir`.
///
/// `prod` selects `conf_prod.toml`; anything else selects `conf.toml`.
pub fn profile_path(mode: &str, dir: &Path) -> PathBuf {
    let name = if mode == PROD_MODE { PROD_FILE } else { DEFAULT_FILE };
    dir.join(name)
}

/// Load the profile file for `mode` from `dir`.
pub fn load_for_mode(mode: &str, dir: &Path) -> Result<TransportConfig, ConfigError> {
    load_config(&profile_path(mode, dir))
}
