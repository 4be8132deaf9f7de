//! Application configuration
//!
//! TOML file feeding the scanner coordinator and the mapping store at
//! construction time. A missing default file means defaults; a missing
//! explicitly-requested file or malformed TOML is a user-actionable error.

use crate::scanner::api::ScannerConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "tagvcr.toml";

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub rfid: ScannerConfig,
    pub mappings: MappingsConfig,
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingsConfig {
    /// Durable mapping file, resolved relative to the working directory
    pub file: PathBuf,
}

impl Default for MappingsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("rfid-mappings.json"),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// External player command; the resolved target path is appended as the
    /// final argument. Unset means detections are only logged.
    pub command: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file '{path}' not found")]
    NotFound { path: String },

    #[error("cannot read configuration file '{path}': {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed configuration file '{path}': {message}")]
    Malformed { path: String, message: String },
}

impl crate::core::error_handling::ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Malformed { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Load configuration.
///
/// `explicit_path` set means the user asked for that exact file; its
/// absence is an error. Without it, the default file is used when present
/// and built-in defaults otherwise.
pub fn load(explicit_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (path, required) = match explicit_path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                });
            }
            log::debug!(
                "No configuration file at {}, using defaults",
                path.display()
            );
            return Ok(AppConfig::default());
        }
        Err(e) => {
            return Err(ConfigError::Unreadable {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    let config = toml::from_str(&contents).map_err(|e| ConfigError::Malformed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    log::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}
