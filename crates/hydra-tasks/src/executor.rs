//! External process execution
//!
//! The engine talks to a [`ProcessExecutor`] rather than spawning processes
//! directly, so tests can substitute a fake that records invocations and
//! scripts outcomes without a real toolchain installed.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::env::Environment;

/// A single external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Working directory
    pub cwd: PathBuf,
    /// Exact environment for the child; `None` inherits the ambient one
    pub env: Option<Environment>,
}

impl Invocation {
    /// Create an invocation that inherits the ambient environment
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: None,
        }
    }

    /// Append arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run with exactly this environment
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of an external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Combined stdout and stderr, in arrival order
    pub output: String,
    /// Whether the exit status indicated success
    pub success: bool,
    /// Exit code, if the process exited normally
    pub exit_code: Option<i32>,
}

/// Runs external commands and captures their combined output
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Run the invocation to completion.
    ///
    /// An `Err` means the process could not be started or awaited; a process
    /// that runs and fails is an `Ok` with `success == false`.
    async fn execute(&self, invocation: &Invocation) -> std::io::Result<CommandOutput>;
}

/// Executor that spawns real processes with tokio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

#[async_trait]
impl ProcessExecutor for SystemExecutor {
    async fn execute(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(env) = &invocation.env {
            command.env_clear();
            command.envs(env.iter());
        }

        let mut child = command.spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("stderr was not captured"))?;

        let mut stdout = BufReader::new(stdout);
        let mut stderr = BufReader::new(stderr);
        let mut stdout_line = Vec::new();
        let mut stderr_line = Vec::new();
        let mut stdout_done = false;
        let mut stderr_done = false;
        let mut output = String::new();

        // A read interrupted by the other stream leaves its bytes in the line
        // buffer, so each buffer is only drained once its read completes.
        while !(stdout_done && stderr_done) {
            let (read, from_stdout) = tokio::select! {
                read = stdout.read_until(b'\n', &mut stdout_line), if !stdout_done => (read?, true),
                read = stderr.read_until(b'\n', &mut stderr_line), if !stderr_done => (read?, false),
            };

            let (line, done) = if from_stdout {
                (&mut stdout_line, &mut stdout_done)
            } else {
                (&mut stderr_line, &mut stderr_done)
            };
            if read == 0 {
                *done = true;
            }
            output.push_str(&String::from_utf8_lossy(&line[..]));
            line.clear();
        }

        let status = child.wait().await?;

        Ok(CommandOutput {
            output,
            success: status.success(),
            exit_code: status.code(),
        })
    }
}
