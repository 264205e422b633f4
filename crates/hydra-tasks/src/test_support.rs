//! Fake process executor for engine tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::executor::{CommandOutput, Invocation, ProcessExecutor};

#[derive(Debug, Clone)]
enum Outcome {
    Fail(String),
    SpawnError,
    Panic,
}

#[derive(Debug, Clone)]
struct Rule {
    unit: String,
    arg: String,
    outcome: Outcome,
}

/// Records invocations, tracks how many run at once, and scripts outcomes
/// by unit directory name and first argument (`env`, `build`, `test`, `mod`).
pub struct FakeExecutor {
    env_report: String,
    delay: Duration,
    unit_delays: Vec<(String, Duration)>,
    rules: Vec<Rule>,
    invocations: Mutex<Vec<Invocation>>,
    finished: Mutex<Vec<Invocation>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self {
            env_report: "GOWORK=''\nGO111MODULE=''\n".to_string(),
            delay: Duration::ZERO,
            unit_delays: Vec::new(),
            rules: Vec::new(),
            invocations: Mutex::new(Vec::new()),
            finished: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_env_report(mut self, report: &str) -> Self {
        self.env_report = report.to_string();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay every invocation in `unit` instead of the default delay
    pub fn with_unit_delay(mut self, unit: &str, delay: Duration) -> Self {
        self.unit_delays.push((unit.to_string(), delay));
        self
    }

    pub fn fail(self, unit: &str, arg: &str, output: &str) -> Self {
        self.rule(unit, arg, Outcome::Fail(output.to_string()))
    }

    pub fn spawn_error(self, unit: &str, arg: &str) -> Self {
        self.rule(unit, arg, Outcome::SpawnError)
    }

    pub fn panic_on(self, unit: &str, arg: &str) -> Self {
        self.rule(unit, arg, Outcome::Panic)
    }

    fn rule(mut self, unit: &str, arg: &str, outcome: Outcome) -> Self {
        self.rules.push(Rule {
            unit: unit.to_string(),
            arg: arg.to_string(),
            outcome,
        });
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Invocations whose first argument is `arg`, as unit names
    pub fn units_invoked_with(&self, arg: &str) -> Vec<String> {
        self.invocations()
            .iter()
            .filter(|inv| inv.args.first().map(String::as_str) == Some(arg))
            .map(unit_name)
            .collect()
    }

    /// Units whose invocation with first argument `arg` has returned
    pub fn units_finished_with(&self, arg: &str) -> Vec<String> {
        self.finished
            .lock()
            .unwrap()
            .iter()
            .filter(|inv| inv.args.first().map(String::as_str) == Some(arg))
            .map(unit_name)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn delay_for(&self, invocation: &Invocation) -> Duration {
        let unit = unit_name(invocation);
        self.unit_delays
            .iter()
            .find(|(name, _)| *name == unit)
            .map_or(self.delay, |(_, delay)| *delay)
    }

    fn outcome_for(&self, invocation: &Invocation) -> Option<Outcome> {
        let unit = unit_name(invocation);
        let arg = invocation.args.first().cloned().unwrap_or_default();
        self.rules
            .iter()
            .find(|rule| rule.unit == unit && rule.arg == arg)
            .map(|rule| rule.outcome.clone())
    }
}

fn unit_name(invocation: &Invocation) -> String {
    invocation
        .cwd
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl ProcessExecutor for FakeExecutor {
    async fn execute(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        self.invocations.lock().unwrap().push(invocation.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = self.delay_for(invocation);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.finished.lock().unwrap().push(invocation.clone());

        let is_env_query = invocation.args.first().map(String::as_str) == Some("env");
        match self.outcome_for(invocation) {
            Some(Outcome::Fail(output)) => Ok(CommandOutput {
                output,
                success: false,
                exit_code: Some(1),
            }),
            Some(Outcome::SpawnError) => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file or directory",
            )),
            Some(Outcome::Panic) => panic!("scripted panic for {}", invocation),
            None if is_env_query => Ok(CommandOutput {
                output: self.env_report.clone(),
                success: true,
                exit_code: Some(0),
            }),
            None => Ok(CommandOutput {
                output: format!("ok {}\n", invocation),
                success: true,
                exit_code: Some(0),
            }),
        }
    }
}
