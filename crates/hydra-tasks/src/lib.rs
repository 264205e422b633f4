//! Hydra Tasks - Build and test orchestration engine
//!
//! This crate provides per-unit environment sanitization, toolchain
//! invocation, and bounded-concurrency fan-out across discovered units.

pub mod env;
pub mod executor;
pub mod orchestrator;
pub mod reporter;
pub mod runner;
pub mod task;
pub mod toolchain;

#[cfg(test)]
pub(crate) mod test_support;

pub use env::{Environment, EnvironmentError};
pub use executor::{CommandOutput, Invocation, ProcessExecutor, SystemExecutor};
pub use orchestrator::{Orchestrator, OrchestratorOptions};
pub use reporter::{CollectingReporter, TaskEvent, TaskReporter, TracingReporter};
pub use runner::TaskRunner;
pub use task::{TaskKind, TaskResult};
pub use toolchain::Toolchain;
