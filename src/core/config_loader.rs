// src/core/config_loader.rs

use crate::{
    core::paths::{self, PathError},
    models::ManagerConfig,
};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Failures loading or writing `config.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config.toml: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize config to TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Loads `config.toml` from the app config directory, writing the defaults first if the
/// file does not exist yet.
pub fn load_config() -> Result<ManagerConfig, ConfigError> {
    load_config_from(&paths::get_config_path()?)
}

/// Same as [`load_config`] for an explicit path.
pub fn load_config_from(path: &Path) -> Result<ManagerConfig, ConfigError> {
    if !path.exists() {
        let default_config = ManagerConfig::default();
        let toml_string = toml::to_string_pretty(&default_config)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml_string)?;
        log::debug!("Default config written to {}", path.display());
        Ok(default_config)
    } else {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
