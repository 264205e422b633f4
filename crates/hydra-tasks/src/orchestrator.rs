//! Bounded-concurrency fan-out over units

use std::sync::Arc;
use std::time::{Duration, Instant};

use hydra_core::Unit;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::reporter::{TaskEvent, TaskReporter};
use crate::runner::TaskRunner;
use crate::task::{TaskKind, TaskResult};

/// Options for the orchestrator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorOptions {
    /// Maximum tasks executing at once (0 = unbounded)
    pub max_concurrency: usize,
}

impl OrchestratorOptions {
    /// One task per unit with no cap
    pub fn unbounded() -> Self {
        Self { max_concurrency: 0 }
    }

    /// At most `max_concurrency` tasks running at once
    pub fn capped(max_concurrency: usize) -> Self {
        Self { max_concurrency }
    }
}

/// Dispatches one task per unit and waits for all of them
pub struct Orchestrator {
    runner: Arc<TaskRunner>,
    reporter: Arc<dyn TaskReporter>,
    options: OrchestratorOptions,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(
        runner: Arc<TaskRunner>,
        reporter: Arc<dyn TaskReporter>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            runner,
            reporter,
            options,
        }
    }

    /// Run `kind` against every unit and return one result per unit, in completion order.
    ///
    /// Each task holds its concurrency slot for the whole unit of work,
    /// including any preparation steps. A failing or panicking unit never
    /// affects its siblings. Returns only after every task has finished.
    pub async fn run_all(&self, units: &[Unit], kind: TaskKind) -> Vec<TaskResult> {
        let start = Instant::now();
        let max_concurrency = self.options.max_concurrency;
        let semaphore = (max_concurrency > 0).then(|| Arc::new(Semaphore::new(max_concurrency)));

        self.reporter.report(&TaskEvent::Dispatched {
            kind,
            units: units.len(),
            max_concurrency,
        });

        let mut tasks = JoinSet::new();
        for unit in units {
            let unit = unit.clone();
            let runner = Arc::clone(&self.runner);
            let reporter = Arc::clone(&self.reporter);
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };

                let name = unit.name.clone();
                let worker = tokio::spawn(execute_unit(runner, Arc::clone(&reporter), kind, unit));
                match worker.await {
                    Ok(result) => result,
                    Err(e) => {
                        let result = TaskResult {
                            unit: name,
                            kind,
                            duration: Duration::ZERO,
                            success: false,
                            output: format!("task panicked: {}", e),
                        };
                        report_result(&*reporter, &result);
                        result
                    }
                }
            });
        }

        let mut results = Vec::with_capacity(units.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                // The wrapper only awaits the worker handle, so it cannot panic
                Err(e) => debug!(error = %e, "task wrapper did not complete"),
            }
        }

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        self.reporter.report(&TaskEvent::AllCompleted {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            duration: start.elapsed(),
        });

        results
    }
}

/// One unit of work: best-effort preparation, then the main invocation
async fn execute_unit(
    runner: Arc<TaskRunner>,
    reporter: Arc<dyn TaskReporter>,
    kind: TaskKind,
    unit: Unit,
) -> TaskResult {
    let start = Instant::now();
    reporter.report(&TaskEvent::Started {
        unit: unit.name.clone(),
        kind,
    });

    for step in kind.preparation() {
        runner.best_effort(*step, &unit).await;
    }

    let output = runner.run(kind, &unit).await;
    let result = TaskResult {
        unit: unit.name,
        kind,
        duration: start.elapsed(),
        success: output.success,
        output: output.output,
    };
    report_result(&*reporter, &result);
    result
}

fn report_result(reporter: &dyn TaskReporter, result: &TaskResult) {
    if result.success {
        reporter.report(&TaskEvent::Completed {
            unit: result.unit.clone(),
            kind: result.kind,
            duration: result.duration,
        });
    } else {
        reporter.report(&TaskEvent::Failed {
            unit: result.unit.clone(),
            kind: result.kind,
            duration: result.duration,
            output: result.output.clone(),
        });
    }
}
