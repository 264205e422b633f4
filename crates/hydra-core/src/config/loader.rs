//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// On-disk configuration syntax, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Yaml => "yaml",
        }
    }

    fn parse(self, content: &str) -> std::result::Result<Config, ConfigError> {
        match self {
            Self::Toml => Ok(toml::from_str(content)?),
            Self::Yaml => Ok(serde_yaml::from_str(content)?),
        }
    }
}

/// Read, parse and validate one configuration file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = ConfigFormat::for_path(path);
    debug!(path = %path.display(), format = format.as_str(), "reading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = format.parse(&content)?;
    validate_config(&config)?;

    info!(path = %path.display(), "using config");
    Ok(config)
}

/// Nearest config file at or above `start_dir`.
///
/// Each directory is checked for every known file name before moving up.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let found = start_dir.ancestors().find_map(|dir| {
        config_file_names()
            .into_iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    });
    debug!(start_dir = %start_dir.display(), found = ?found, "config search finished");
    found
}

/// Load the nearest configuration, falling back to defaults.
///
/// A missing file falls back to defaults; a file that exists but fails to
/// parse or validate is an error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    let Some(path) = find_config(dir) else {
        warn!(dir = %dir.display(), "no config found, using defaults");
        return Ok((Config::default(), None));
    };
    let config = load_config(&path)?;
    Ok((config, Some(path)))
}
