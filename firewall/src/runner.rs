//! External command execution
//!
//! `CommandRunner` is the only seam between the reconciler and the host.
//! `FirewallCmd` runs the real control executable through `tokio::process`.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::command::FirewallCommand;
use crate::error::EngineError;

/// Captured result of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        command: &FirewallCommand,
        cancel: &CancellationToken,
    ) -> Result<CommandOutcome, EngineError>;
}

/// Runs commands against the real firewall control executable
pub struct FirewallCmd {
    program: String,
}

impl FirewallCmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl CommandRunner for FirewallCmd {
    async fn run(
        &self,
        command: &FirewallCommand,
        cancel: &CancellationToken,
    ) -> Result<CommandOutcome, EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        debug!("Running: {} {}", self.program, command);

        let child = Command::new(&self.program)
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Launch {
                program: self.program.clone(),
                source,
            })?;

        // Dropping the wait future on cancellation drops the child, which
        // kills it and closes both pipes.
        let output = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Cancelled while running: {} {}", self.program, command);
                return Err(EngineError::Cancelled);
            }
            output = child.wait_with_output() => output.map_err(|source| EngineError::Output {
                program: self.program.clone(),
                source,
            })?,
        };

        let outcome = CommandOutcome {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!("{} {} exited with {}", self.program, command, outcome.exit_code);

        Ok(outcome)
    }
}
