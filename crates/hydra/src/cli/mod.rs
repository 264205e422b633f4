//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{BuildCommand, TestCommand};

/// Hydra - build and test every service in a monorepo concurrently
#[derive(Debug, Parser)]
#[command(name = "hydra")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Discovery root (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build monorepo services
    Build(BuildCommand),

    /// Test monorepo services
    Test(TestCommand),
}

impl Cli {
    /// Execute the CLI command, returning the process exit code
    pub fn execute(&self) -> anyhow::Result<i32> {
        match &self.command {
            Commands::Build(cmd) => cmd.execute(self),
            Commands::Test(cmd) => cmd.execute(self),
        }
    }

    /// Root directory units are discovered under
    pub fn root(&self) -> anyhow::Result<PathBuf> {
        match &self.directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Whether human-readable progress should be printed
    pub fn is_interactive_text(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}
