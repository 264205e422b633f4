//! Build command - compile every selected unit concurrently

use clap::Args;

use hydra_tasks::TaskKind;

use super::run::{run_units, RunRequest};
use crate::cli::Cli;

/// Build monorepo services
#[derive(Debug, Args)]
pub struct BuildCommand {
    /// Comma-separated unit names to build (default: all)
    #[arg(long, value_delimiter = ',')]
    pub services: Vec<String>,

    /// Maximum concurrent builds (0 = unbounded)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Exit non-zero when any unit fails
    #[arg(long)]
    pub strict: bool,
}

impl BuildCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        let services: Vec<String> = self
            .services
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        run_units(
            cli,
            RunRequest {
                kind: TaskKind::Build,
                services: &services,
                jobs: self.jobs,
                strict: self.strict,
            },
        )
    }
}
