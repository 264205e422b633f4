//! Single-unit task execution

use std::sync::Arc;

use hydra_core::Unit;
use tracing::debug;

use crate::env::{build_env, Environment, EnvironmentError};
use crate::executor::{CommandOutput, ProcessExecutor};
use crate::task::TaskKind;
use crate::toolchain::Toolchain;

/// Runs one toolchain invocation against one unit with a sanitized environment
pub struct TaskRunner {
    toolchain: Toolchain,
    executor: Arc<dyn ProcessExecutor>,
    ambient: Environment,
}

impl TaskRunner {
    /// Create a runner that layers task environments over the current process environment
    pub fn new(toolchain: Toolchain, executor: Arc<dyn ProcessExecutor>) -> Self {
        Self {
            toolchain,
            executor,
            ambient: Environment::from_process(),
        }
    }

    /// Replace the ambient environment layer
    pub fn with_ambient(mut self, ambient: Environment) -> Self {
        self.ambient = ambient;
        self
    }

    /// Build the environment for `kind` against `unit`.
    ///
    /// Queries the toolchain for its own environment from the unit directory
    /// and overlays it and the kind's overrides on the ambient environment.
    pub async fn environment(
        &self,
        kind: TaskKind,
        unit: &Unit,
    ) -> Result<Environment, EnvironmentError> {
        let query = self.toolchain.env_query(&unit.path);
        let program = self.toolchain.program().to_string();

        let reported = match self.executor.execute(&query).await {
            Ok(out) if out.success => Environment::parse_report(&out.output),
            Ok(out) => {
                return Err(EnvironmentError::Exited {
                    program,
                    code: out.exit_code,
                    output: out.output,
                })
            }
            Err(source) => return Err(EnvironmentError::Spawn { program, source }),
        };

        let env = build_env(&self.ambient, &reported, self.toolchain.env_overrides(kind));
        debug!(unit = %unit.name, %kind, vars = env.len(), "built task environment");
        Ok(env)
    }

    /// Run `kind` against `unit`.
    ///
    /// Never fails: an environment error or a command that cannot be started
    /// is returned as an unsuccessful output carrying the error text, and a
    /// failing command keeps everything it printed.
    pub async fn run(&self, kind: TaskKind, unit: &Unit) -> CommandOutput {
        let result = self.invoke(kind, unit).await;
        debug!(
            unit = %unit.name,
            %kind,
            success = result.success,
            exit_code = ?result.exit_code,
            "task finished"
        );
        result
    }

    /// Run `kind` against `unit`, discarding the outcome entirely
    pub async fn best_effort(&self, kind: TaskKind, unit: &Unit) {
        let _discarded: CommandOutput = self.invoke(kind, unit).await;
    }

    async fn invoke(&self, kind: TaskKind, unit: &Unit) -> CommandOutput {
        let env = match self.environment(kind, unit).await {
            Ok(env) => env,
            Err(e) => return failure(e.to_string()),
        };

        let invocation = self.toolchain.invocation(kind, unit).with_env(env);
        debug!(unit = %unit.name, command = %invocation, "running");

        match self.executor.execute(&invocation).await {
            Ok(output) => output,
            Err(e) => failure(format!("failed to run `{}`: {}", invocation, e)),
        }
    }
}

fn failure(output: String) -> CommandOutput {
    CommandOutput {
        output,
        success: false,
        exit_code: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeExecutor;

    fn unit(name: &str) -> Unit {
        Unit::from_path(format!("/repo/{}", name))
    }

    fn runner(executor: Arc<FakeExecutor>) -> TaskRunner {
        let ambient: Environment = [("HOME", "/home/dev"), ("GOWORK", "/home/dev/go.work")]
            .into_iter()
            .collect();
        TaskRunner::new(Toolchain::default(), executor).with_ambient(ambient)
    }

    #[tokio::test]
    async fn test_build_environment_forces_overrides() {
        let executor = Arc::new(FakeExecutor::new().with_env_report(
            "GOWORK=\"/repo/go.work\"\nGO111MODULE=\"on\"\nGOPATH=\"/go\"\n",
        ));
        let runner = runner(executor.clone());

        let env = runner.environment(TaskKind::Build, &unit("svc-a")).await.unwrap();
        assert_eq!(env.get("GOWORK"), Some("off"));
        assert_eq!(env.get("GO111MODULE"), Some("auto"));
        assert_eq!(env.get("GOPATH"), Some("/go"));
        assert_eq!(env.get("HOME"), Some("/home/dev"));
    }

    #[tokio::test]
    async fn test_test_environment_keeps_module_mode() {
        let executor = Arc::new(
            FakeExecutor::new().with_env_report("GOWORK='/repo/go.work'\nGO111MODULE='on'\n"),
        );
        let runner = runner(executor);

        let env = runner.environment(TaskKind::Test, &unit("svc-a")).await.unwrap();
        assert_eq!(env.get("GOWORK"), Some("off"));
        assert_eq!(env.get("GO111MODULE"), Some("on"));
    }

    #[tokio::test]
    async fn test_run_passes_environment_and_directory() {
        let executor = Arc::new(FakeExecutor::new());
        let runner = runner(executor.clone());

        let out = runner.run(TaskKind::Build, &unit("svc-a")).await;
        assert!(out.success);

        let calls = executor.invocations();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args, vec!["env"]);
        assert!(calls[0].env.is_none());

        let build = &calls[1];
        assert_eq!(build.cwd, unit("svc-a").path);
        assert_eq!(build.args[0], "build");
        let env = build.env.as_ref().unwrap();
        assert_eq!(env.get("GOWORK"), Some("off"));
    }

    #[tokio::test]
    async fn test_failed_command_keeps_output() {
        let executor =
            Arc::new(FakeExecutor::new().fail("svc-a", "build", "main.go:3: undefined: x"));
        let runner = runner(executor);

        let out = runner.run(TaskKind::Build, &unit("svc-a")).await;
        assert!(!out.success);
        assert_eq!(out.output, "main.go:3: undefined: x");
    }

    #[tokio::test]
    async fn test_env_query_failure_aborts_task() {
        let executor = Arc::new(FakeExecutor::new().fail("svc-a", "env", "go: command broken"));
        let runner = runner(executor.clone());

        let out = runner.run(TaskKind::Build, &unit("svc-a")).await;
        assert!(!out.success);
        assert!(out.output.contains("go: command broken"));
        assert_eq!(executor.invocations().len(), 1);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_failed_output() {
        let executor = Arc::new(FakeExecutor::new().spawn_error("svc-a", "test"));
        let runner = runner(executor);

        let out = runner.run(TaskKind::Test, &unit("svc-a")).await;
        assert!(!out.success);
        assert!(out.output.contains("failed to run `go test"));
    }

    #[tokio::test]
    async fn test_best_effort_swallows_failure() {
        let executor = Arc::new(FakeExecutor::new().fail("svc-a", "mod", "tidy exploded"));
        let runner = runner(executor.clone());

        runner
            .best_effort(TaskKind::TidyDependencies, &unit("svc-a"))
            .await;
        assert_eq!(executor.invocations().len(), 2);
    }
}
