//! Unit discovery in monorepos
//!
//! A unit is any directory that directly contains both the toolchain's
//! module manifest and its entrypoint source file. Excluded directory names
//! (by default `vendor`) are pruned from the walk at any depth.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::{DiscoveryConfig, ToolchainConfig};
use crate::error::{DiscoveryError, Result};

/// A discovered buildable unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Unit name, the final segment of its path
    pub name: String,
    /// Absolute path to the unit directory
    pub path: PathBuf,
}

impl Unit {
    /// Create a unit from its directory, deriving the name from the last path segment
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Unit discovery for a directory tree
#[derive(Debug, Clone)]
pub struct UnitDiscovery {
    manifest: String,
    entrypoint: String,
    exclude: Vec<String>,
}

impl Default for UnitDiscovery {
    fn default() -> Self {
        Self::new(&ToolchainConfig::default(), &DiscoveryConfig::default())
    }
}

impl UnitDiscovery {
    /// Create a discovery instance from configuration
    pub fn new(toolchain: &ToolchainConfig, discovery: &DiscoveryConfig) -> Self {
        Self {
            manifest: toolchain.manifest.clone(),
            entrypoint: toolchain.entrypoint.clone(),
            exclude: discovery.exclude.clone(),
        }
    }

    /// Discover all units under `root`.
    ///
    /// Results follow a walk sorted by file name. Any walk error aborts
    /// discovery and no partial results are returned.
    pub fn discover(&self, root: &Path) -> Result<Vec<Unit>> {
        if !root.is_dir() {
            return Err(DiscoveryError::RootNotFound(root.to_path_buf()).into());
        }

        let root = root
            .canonicalize()
            .map_err(|_| DiscoveryError::RootNotFound(root.to_path_buf()))?;

        debug!(
            root = %root.display(),
            manifest = %self.manifest,
            entrypoint = %self.entrypoint,
            "discovering units"
        );

        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry));

        let mut units = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source| DiscoveryError::Walk {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.clone()),
                source,
            })?;

            if entry.file_type().is_dir() && self.is_unit_dir(entry.path()) {
                debug!(path = %entry.path().display(), "found unit");
                units.push(Unit::from_path(entry.path()));
            }
        }

        warn_on_duplicate_names(&units);
        info!(count = units.len(), "discovered units");
        Ok(units)
    }

    /// Excluded directories are pruned; the root itself never is
    fn is_excluded(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self
                .exclude
                .iter()
                .any(|name| entry.file_name() == name.as_str())
    }

    fn is_unit_dir(&self, dir: &Path) -> bool {
        dir.join(&self.manifest).is_file() && dir.join(&self.entrypoint).is_file()
    }
}

fn warn_on_duplicate_names(units: &[Unit]) {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for unit in units {
        if let Some(first) = seen.insert(&unit.name, &unit.path) {
            warn!(
                name = %unit.name,
                first = %first.display(),
                second = %unit.path.display(),
                "multiple units share the same name"
            );
        }
    }
}
