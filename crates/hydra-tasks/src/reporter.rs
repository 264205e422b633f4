//! Task execution reporting

use std::sync::Mutex;
use std::time::Duration;

use crate::task::TaskKind;

/// Events emitted during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// Units are about to be dispatched
    Dispatched {
        kind: TaskKind,
        units: usize,
        /// 0 means unbounded
        max_concurrency: usize,
    },
    /// A unit acquired its slot and is starting
    Started { unit: String, kind: TaskKind },
    /// A unit's task succeeded
    Completed {
        unit: String,
        kind: TaskKind,
        duration: Duration,
    },
    /// A unit's task failed
    Failed {
        unit: String,
        kind: TaskKind,
        duration: Duration,
        output: String,
    },
    /// Every dispatched task has finished
    AllCompleted {
        total: usize,
        succeeded: usize,
        failed: usize,
        duration: Duration,
    },
}

/// Trait for reporting task execution progress.
///
/// Called concurrently from every running task.
pub trait TaskReporter: Send + Sync {
    /// Handle a task event
    fn report(&self, event: &TaskEvent);
}

/// Simple reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl TaskReporter for TracingReporter {
    fn report(&self, event: &TaskEvent) {
        match event {
            TaskEvent::Dispatched {
                kind,
                units,
                max_concurrency,
            } => {
                tracing::info!(%kind, units, max_concurrency, "dispatching units");
            }
            TaskEvent::Started { unit, kind } => {
                tracing::info!("Starting {} {}", kind, unit);
            }
            TaskEvent::Completed {
                unit,
                kind,
                duration,
            } => {
                tracing::info!("{} {} completed in {}ms", kind, unit, duration.as_millis());
            }
            TaskEvent::Failed {
                unit,
                kind,
                duration,
                output,
            } => {
                tracing::error!(
                    "{} {} failed after {}ms: {}",
                    kind,
                    unit,
                    duration.as_millis(),
                    output
                );
            }
            TaskEvent::AllCompleted {
                total,
                succeeded,
                failed,
                duration,
            } => {
                tracing::info!(
                    "All units complete: {}/{} succeeded, {} failed ({:.1}s)",
                    succeeded,
                    total,
                    failed,
                    duration.as_secs_f64()
                );
            }
        }
    }
}

/// Reporter that collects events for later inspection (useful for testing)
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<TaskEvent>>,
}

impl CollectingReporter {
    /// Get all collected events
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl TaskReporter for CollectingReporter {
    fn report(&self, event: &TaskEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_reporter() {
        let reporter = CollectingReporter::default();

        reporter.report(&TaskEvent::Started {
            unit: "svc-a".to_string(),
            kind: TaskKind::Build,
        });
        reporter.report(&TaskEvent::Completed {
            unit: "svc-a".to_string(),
            kind: TaskKind::Build,
            duration: Duration::from_millis(1200),
        });

        let events = reporter.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], TaskEvent::Completed { .. }));
    }

    #[test]
    fn test_tracing_reporter() {
        let reporter = TracingReporter;

        // Just verify it doesn't panic
        reporter.report(&TaskEvent::Failed {
            unit: "svc-a".to_string(),
            kind: TaskKind::Test,
            duration: Duration::from_secs(1),
            output: "FAIL".to_string(),
        });
        reporter.report(&TaskEvent::AllCompleted {
            total: 1,
            succeeded: 0,
            failed: 1,
            duration: Duration::from_secs(1),
        });
    }
}
