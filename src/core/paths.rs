// src/core/paths.rs

use crate::constants::{APP_DIR_NAME, CONFIG_FILENAME, SETTINGS_FILENAME};
use lazy_static::lazy_static;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

lazy_static! {
    static ref APP_CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Failures resolving the application directory.
#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not create config directory at '{path}': {source}")]
    ConfigDirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Returns the path to the application configuration directory (`~/.config/procdeck`).
/// Creates it if it doesn't exist.
///
/// Memoized: the first successful call computes and caches the path.
pub fn get_app_config_dir() -> Result<PathBuf, PathError> {
    let mut cached = APP_CONFIG_DIR.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let config_path = dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)?
        .join(APP_DIR_NAME);

    if !config_path.exists() {
        fs::create_dir_all(&config_path).map_err(|e| PathError::ConfigDirCreation {
            path: config_path.display().to_string(),
            source: e,
        })?;
    }

    *cached = Some(config_path.clone());
    Ok(config_path)
}

/// Path of the TOML manager configuration.
pub fn get_config_path() -> Result<PathBuf, PathError> {
    get_app_config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Path of the JSON settings (shell preference) file.
pub fn get_settings_path() -> Result<PathBuf, PathError> {
    get_app_config_dir().map(|dir| dir.join(SETTINGS_FILENAME))
}
