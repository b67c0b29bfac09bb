//! Configuration loading.
//!
//! Settings come from an optional TOML file; every key has a default matching
//! a GitHub Enterprise Server to GitHub.com migration.

mod error;
mod instance;
mod settings;

pub use error::ConfigError;
pub use instance::{Instance, InstanceSettings};
pub use settings::{
    Settings, TemplateOverrides, DEFAULT_DESTINATION_API_URL, DEFAULT_SOURCE_API_URL,
};

use std::path::Path;
use tracing::{debug, info};

/// Loads settings from `path`, or the defaults when no path is given.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file is missing, unreadable, not valid TOML
/// or fails validation.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let Some(path) = path else {
        debug!("No settings file given, using defaults");
        return Ok(Settings::default());
    };

    info!(path = %path.display(), "Loading settings");

    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_settings(&content, path)
}

/// Parses and validates settings from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::TomlError`] or [`ConfigError::ValidationError`].
pub fn parse_settings(content: &str, path: &Path) -> Result<Settings, ConfigError> {
    let settings: Settings = toml::from_str(content).map_err(|e| ConfigError::TomlError {
        path: path.display().to_string(),
        source: e,
    })?;

    if let Some(message) = settings.problems() {
        return Err(ConfigError::ValidationError {
            path: path.display().to_string(),
            message,
        });
    }

    Ok(settings)
}
