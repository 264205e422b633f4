//! Configuration types

use serde::{Deserialize, Serialize};

/// Main configuration for Hydra
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Toolchain configuration
    pub toolchain: ToolchainConfig,

    /// Unit discovery configuration
    pub discovery: DiscoveryConfig,

    /// Build flow configuration
    pub build: BuildConfig,

    /// Test flow configuration
    pub test: TestConfig,
}

/// Toolchain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Toolchain executable (e.g., "go")
    pub program: String,

    /// Module manifest file a unit directory must contain
    pub manifest: String,

    /// Entrypoint source file a unit directory must contain
    pub entrypoint: String,

    /// Directory, relative to each unit, that build outputs are written to
    pub output_dir: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            manifest: "go.mod".to_string(),
            entrypoint: "main.go".to_string(),
            output_dir: "bin".to_string(),
        }
    }
}

/// Unit discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Directory names that are never descended into
    pub exclude: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            exclude: vec!["vendor".to_string()],
        }
    }
}

/// Build flow configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Maximum concurrent builds (0 = unbounded)
    pub concurrency: usize,
}

/// Test flow configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Maximum concurrent test runs (defaults to available parallelism)
    pub concurrency: Option<usize>,
}

impl TestConfig {
    /// Effective concurrency cap for the test flow
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.unwrap_or_else(available_parallelism)
    }
}

/// Number of parallel execution contexts on this host
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
