//! CLI commands

mod build;
mod run;

pub use build::BuildCommand;
pub use test::TestCommand;
