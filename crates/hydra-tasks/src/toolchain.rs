//! Toolchain command table
//!
//! Maps each [`TaskKind`] to the exact toolchain invocation and the
//! environment overrides it runs with.

use std::path::Path;

use hydra_core::config::ToolchainConfig;
use hydra_core::Unit;

use crate::executor::Invocation;
use crate::task::TaskKind;

/// Workspace-mode knob; forced off for every invocation
pub const WORKSPACE_MODE_VAR: &str = "GOWORK";

/// Module-resolution knob; forced to auto for builds only
pub const MODULE_MODE_VAR: &str = "GO111MODULE";

const BUILD_OVERRIDES: &[(&str, &str)] = &[(WORKSPACE_MODE_VAR, "off"), (MODULE_MODE_VAR, "auto")];
const DEFAULT_OVERRIDES: &[(&str, &str)] = &[(WORKSPACE_MODE_VAR, "off")];

/// The external toolchain invoked for every unit
#[derive(Debug, Clone)]
pub struct Toolchain {
    program: String,
    output_dir: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::from_config(&ToolchainConfig::default())
    }
}

impl Toolchain {
    /// Create a toolchain from configuration
    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self {
            program: config.program.clone(),
            output_dir: config.output_dir.clone(),
        }
    }

    /// The toolchain executable
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Invocation that reports the toolchain's own environment
    pub fn env_query(&self, cwd: &Path) -> Invocation {
        Invocation::new(&self.program, cwd).with_args(["env"])
    }

    /// Invocation for `kind` against `unit`, run from the unit's directory
    pub fn invocation(&self, kind: TaskKind, unit: &Unit) -> Invocation {
        let inv = Invocation::new(&self.program, &unit.path);
        match kind {
            TaskKind::Build => inv.with_args([
                "build".to_string(),
                "-mod".to_string(),
                "readonly".to_string(),
                "-o".to_string(),
                format!("{}/{}", self.output_dir, unit.name),
            ]),
            TaskKind::Test => inv.with_args(["test", "-race", "-shuffle", "on", "./..."]),
            TaskKind::TidyDependencies => inv.with_args(["mod", "tidy"]),
            TaskKind::VendorDependencies => inv.with_args(["mod", "vendor"]),
        }
    }

    /// Environment overrides forced for `kind`.
    ///
    /// Builds also pin module resolution; other kinds keep the reported value.
    pub fn env_overrides(&self, kind: TaskKind) -> &'static [(&'static str, &'static str)] {
        match kind {
            TaskKind::Build => BUILD_OVERRIDES,
            TaskKind::Test | TaskKind::TidyDependencies | TaskKind::VendorDependencies => {
                DEFAULT_OVERRIDES
            }
        }
    }
}
