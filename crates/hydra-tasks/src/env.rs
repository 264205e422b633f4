//! Per-invocation environment construction
//!
//! Every task runs with an explicit snapshot built by overlaying, in order:
//! the ambient process environment, the environment reported by the
//! toolchain, and a fixed set of overrides. Later layers win on key
//! collision, so override keys can never carry any other value.

use std::ffi::{OsStr, OsString};

use thiserror::Error;

/// Errors raised while building a task environment
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// The toolchain environment query could not be started
    #[error("failed to query {program} environment: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The toolchain environment query exited unsuccessfully
    #[error("{program} environment query exited with code {code:?}: {output}")]
    Exited {
        program: String,
        code: Option<i32>,
        output: String,
    },
}

/// An ordered set of environment assignments.
///
/// Keys and values are kept as OS strings so variables that are not valid
/// unicode pass through to child processes untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    entries: Vec<(OsString, OsString)>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment
    pub fn from_process() -> Self {
        std::env::vars_os().collect()
    }

    /// Parse the output of a toolchain environment report (e.g. `go env`).
    ///
    /// One `KEY=VALUE` assignment per line. Quoting characters are stripped,
    /// a leading `set ` is dropped, and lines without `=` are ignored.
    pub fn parse_report(report: &str) -> Self {
        report
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                let line = line.strip_prefix("set ").unwrap_or(line);
                let unquoted: String = line.chars().filter(|c| *c != '"' && *c != '\'').collect();
                let (key, value) = unquoted.split_once('=')?;
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                Some((key.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Value for a key, as an OS string
    pub fn get_os(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Value for a key; `None` when missing or not valid unicode
    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&str> {
        self.get_os(key)?.to_str()
    }

    /// Set a key, replacing any existing value in place
    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Remove a key, returning its previous value
    pub fn remove(&mut self, key: impl AsRef<OsStr>) -> Option<OsString> {
        let key = key.as_ref();
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Apply every assignment of `other` on top of this environment
    pub fn overlay(&mut self, other: &Environment) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    /// Iterate over assignments in order
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    /// Number of assignments
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the environment has no assignments
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `KEY=VALUE` lines, replacing invalid unicode
    pub fn to_lines(&self) -> Vec<String> {
        self.iter()
            .map(|(k, v)| format!("{}={}", k.to_string_lossy(), v.to_string_lossy()))
            .collect()
    }
}

impl<K: Into<OsString>, V: Into<OsString>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Environment::new();
        for (key, value) in iter {
            env.set(key, value);
        }
        env
    }
}

/// Build the effective environment for one invocation.
///
/// Override keys are removed from the toolchain layer before the overrides
/// are applied, so each override is the only effective assignment for its key.
pub fn build_env(
    ambient: &Environment,
    reported: &Environment,
    overrides: &[(&str, &str)],
) -> Environment {
    let mut reported = reported.clone();
    for (key, _) in overrides {
        reported.remove(*key);
    }

    let mut env = ambient.clone();
    env.overlay(&reported);
    for (key, value) in overrides {
        env.set(*key, *value);
    }
    env
}
