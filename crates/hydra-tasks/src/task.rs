//! Task kinds and results

use std::fmt;
use std::time::Duration;

/// The kind of toolchain invocation performed against a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Compile the unit into a binary
    Build,
    /// Run the unit's tests
    Test,
    /// Tidy the unit's dependency manifest
    TidyDependencies,
    /// Vendor the unit's dependencies
    VendorDependencies,
}

impl TaskKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Test => "test",
            Self::TidyDependencies => "tidy",
            Self::VendorDependencies => "vendor",
        }
    }

    /// Best-effort steps run in the same slot before this kind's invocation
    pub fn preparation(&self) -> &'static [TaskKind] {
        match self {
            Self::Test => &[Self::TidyDependencies, Self::VendorDependencies],
            Self::Build | Self::TidyDependencies | Self::VendorDependencies => &[],
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one unit's task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    /// Name of the unit the task ran against
    pub unit: String,
    /// Kind of task
    pub kind: TaskKind,
    /// How long the task took
    pub duration: Duration,
    /// Whether the invocation succeeded
    pub success: bool,
    /// Combined output of the invocation, or the error that prevented it
    pub output: String,
}

impl TaskResult {
    /// Whether this result represents success
    pub fn is_success(&self) -> bool {
        self.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(TaskKind::Build.to_string(), "build");
        assert_eq!(TaskKind::TidyDependencies.to_string(), "tidy");
    }

    #[test]
    fn test_only_test_has_preparation() {
        assert_eq!(
            TaskKind::Test.preparation(),
            &[TaskKind::TidyDependencies, TaskKind::VendorDependencies]
        );
        assert!(TaskKind::Build.preparation().is_empty());
        assert!(TaskKind::TidyDependencies.preparation().is_empty());
    }
}
