//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_toolchain(config)?;
    validate_discovery(config)?;
    validate_test(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_toolchain(config: &Config) -> Result<()> {
    let toolchain = &config.toolchain;
    let required = [
        ("toolchain.program", &toolchain.program),
        ("toolchain.manifest", &toolchain.manifest),
        ("toolchain.entrypoint", &toolchain.entrypoint),
        ("toolchain.output_dir", &toolchain.output_dir),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: "cannot be empty".to_string(),
            }
            .into());
        }
    }

    if toolchain.manifest == toolchain.entrypoint {
        return Err(ConfigError::InvalidValue {
            field: "toolchain.entrypoint".to_string(),
            message: "must differ from toolchain.manifest".to_string(),
        }
        .into());
    }

    Ok(())
}

fn validate_discovery(config: &Config) -> Result<()> {
    if config.discovery.exclude.iter().any(|name| name.trim().is_empty()) {
        return Err(ConfigError::InvalidValue {
            field: "discovery.exclude".to_string(),
            message: "directory names cannot be empty".to_string(),
        }
        .into());
    }
    Ok(())
}

fn validate_test(config: &Config) -> Result<()> {
    if config.test.concurrency == Some(0) {
        return Err(ConfigError::InvalidValue {
            field: "test.concurrency".to_string(),
            message: "must be greater than 0".to_string(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_program_rejected() {
        let mut config = Config::default();
        config.toolchain.program = String::new();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("toolchain.program"));
    }

    #[test]
    fn test_same_manifest_and_entrypoint_rejected() {
        let mut config = Config::default();
        config.toolchain.entrypoint = "go.mod".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_test_concurrency_rejected() {
        let mut config = Config::default();
        config.test.concurrency = Some(0);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("test.concurrency"));
    }

    #[test]
    fn test_zero_build_concurrency_allowed() {
        let mut config = Config::default();
        config.build.concurrency = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_blank_exclude_rejected() {
        let mut config = Config::default();
        config.discovery.exclude.push(" ".to_string());
        assert!(validate_config(&config).is_err());
    }
}
