//! Error types for Hydra

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using HydraError
pub type Result<T> = std::result::Result<T, HydraError>;

/// Main error type for Hydra operations
#[derive(Debug, Error)]
pub enum HydraError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unit discovery errors
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Unit discovery errors
///
/// Discovery is all-or-nothing: any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The discovery root does not exist or is not a directory
    #[error("Discovery root not found: {0}")]
    RootNotFound(PathBuf),

    /// The directory walk could not complete
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl HydraError {
    /// Whether this error originates from configuration loading or validation
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
