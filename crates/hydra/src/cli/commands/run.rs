//! Shared discover → filter → dispatch flow for `build` and `test`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use console::style;
use serde::Serialize;

use hydra_core::config::Config;
use hydra_core::{load_config_or_default, select, UnitDiscovery};
use hydra_tasks::{
    Orchestrator, OrchestratorOptions, ProcessExecutor, SystemExecutor, TaskEvent, TaskKind,
    TaskReporter, TaskResult, TaskRunner, Toolchain, TracingReporter,
};

use crate::cli::{output, Cli, OutputFormat};
use crate::exit_codes;

/// What a subcommand asks the engine to do
pub struct RunRequest<'a> {
    pub kind: TaskKind,
    /// Unit names to restrict the run to (empty = all)
    pub services: &'a [String],
    /// Concurrency override from the command line
    pub jobs: Option<usize>,
    pub strict: bool,
}

/// Where toolchain processes come from
pub struct Backend {
    executor: Arc<dyn ProcessExecutor>,
    locate: fn(&str) -> anyhow::Result<PathBuf>,
}

impl Backend {
    /// Spawn real processes, resolving the toolchain on `PATH`
    pub fn system() -> Self {
        Self {
            executor: Arc::new(SystemExecutor),
            locate: locate_in_path,
        }
    }
}

/// Discover, filter and run units, returning the process exit code
pub fn run_units(cli: &Cli, request: RunRequest<'_>) -> anyhow::Result<i32> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_units_with(cli, request, Backend::system()))
}

async fn run_units_with(
    cli: &Cli,
    request: RunRequest<'_>,
    backend: Backend,
) -> anyhow::Result<i32> {
    let root = cli.root()?;
    let (config, _) = load_config_or_default(&root)?;

    if cli.is_interactive_text() {
        output::info(&format!(
            "Looking for units under {}",
            style(root.display()).cyan()
        ));
    }

    let discovery = UnitDiscovery::new(&config.toolchain, &config.discovery);
    let units = discovery.discover(&root)?;
    if units.is_empty() {
        if cli.is_interactive_text() {
            output::warning(&format!("No units found for {}", request.kind));
        }
        return Ok(exit_codes::SUCCESS);
    }

    let selected = select(&units, request.services);
    if selected.is_empty() {
        if cli.is_interactive_text() {
            output::warning("No units match the requested services");
        }
        return Ok(exit_codes::SUCCESS);
    }

    let program = &config.toolchain.program;
    let resolved = (backend.locate)(program)?;
    tracing::debug!(program = %program, path = %resolved.display(), "resolved toolchain");

    let max_concurrency = max_concurrency(&config, &request);
    if cli.is_interactive_text() {
        output::info(&format!(
            "Found {}, running {} on {}",
            output::plural(units.len(), "unit"),
            request.kind,
            output::plural(selected.len(), "unit"),
        ));
        println!();
    }

    let reporter: Arc<dyn TaskReporter> = if cli.is_interactive_text() {
        Arc::new(ConsoleReporter::new(cli.verbose))
    } else {
        Arc::new(TracingReporter)
    };

    let runner = TaskRunner::new(Toolchain::from_config(&config.toolchain), backend.executor);
    let orchestrator = Orchestrator::new(
        Arc::new(runner),
        reporter,
        OrchestratorOptions::capped(max_concurrency),
    );
    let results = orchestrator.run_all(&selected, request.kind).await;

    if cli.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&RunSummary::new(&results))?);
    }

    let failed = results.iter().filter(|r| !r.is_success()).count();
    if request.strict && failed > 0 {
        return Ok(exit_codes::UNITS_FAILED);
    }
    Ok(exit_codes::SUCCESS)
}

/// Build runs unbounded unless capped; tests default to one per CPU
fn max_concurrency(config: &Config, request: &RunRequest<'_>) -> usize {
    match request.kind {
        TaskKind::Test => request
            .jobs
            .unwrap_or_else(|| config.test.effective_concurrency()),
        _ => request.jobs.unwrap_or(config.build.concurrency),
    }
}

fn locate_in_path(program: &str) -> anyhow::Result<PathBuf> {
    which::which(program).with_context(|| format!("toolchain `{}` was not found in PATH", program))
}

#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    total: usize,
    succeeded: usize,
    failed: usize,
    units: Vec<UnitSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct UnitSummary<'a> {
    name: &'a str,
    kind: &'static str,
    success: bool,
    duration_ms: u128,
    output: &'a str,
}

impl<'a> RunSummary<'a> {
    fn new(results: &'a [TaskResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            units: results
                .iter()
                .map(|r| UnitSummary {
                    name: &r.unit,
                    kind: r.kind.as_str(),
                    success: r.success,
                    duration_ms: r.duration.as_millis(),
                    output: &r.output,
                })
                .collect(),
        }
    }
}

/// Console reporter with live per-unit output
struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl TaskReporter for ConsoleReporter {
    fn report(&self, event: &TaskEvent) {
        match event {
            TaskEvent::Dispatched {
                kind,
                units,
                max_concurrency,
            } => {
                if self.verbose {
                    let cap = if *max_concurrency == 0 {
                        "unbounded".to_string()
                    } else {
                        format!("at most {} at once", max_concurrency)
                    };
                    println!(
                        "  {} {} {} ({})",
                        style("─").dim(),
                        kind,
                        output::plural(*units, "unit"),
                        cap
                    );
                }
            }
            TaskEvent::Started { unit, kind } => {
                println!(
                    "  {} {} {}",
                    style("▸").dim(),
                    style(unit).bold(),
                    style(format!("({})", kind)).dim()
                );
            }
            TaskEvent::Completed { unit, duration, .. } => {
                println!(
                    "  {} {} {}",
                    style("✓").green(),
                    style(unit).green(),
                    style(output::elapsed(*duration)).dim()
                );
            }
            TaskEvent::Failed {
                unit,
                duration,
                output: captured,
                ..
            } => {
                let mut lines = format!(
                    "  {} {} {}",
                    style("✗").red(),
                    style(unit).red(),
                    style(output::elapsed(*duration)).dim()
                );
                if !captured.trim().is_empty() {
                    lines.push('\n');
                    lines.push_str(&output::indented(captured));
                }
                println!("{}", lines);
            }
            TaskEvent::AllCompleted {
                total,
                succeeded,
                failed,
                duration,
            } => {
                println!();
                println!(
                    "  {} {}/{} succeeded, {} failed ({})",
                    if *failed == 0 {
                        style("✓").green().bold()
                    } else {
                        style("✗").red().bold()
                    },
                    succeeded,
                    total,
                    failed,
                    output::elapsed(*duration)
                );
            }
        }
    }
}
