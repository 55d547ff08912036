use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use smbrowse_common::tools::{CommandLine, ProcessOutput, ProcessRunner, RunError};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs external tools as tokio child processes.
///
/// The child is killed when the run is cancelled or times out.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner {
    timeout: Option<Duration>,
}

impl TokioProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        command: CommandLine,
        cancel: CancellationToken,
    ) -> Result<ProcessOutput, RunError> {
        let child = Command::new(&command.program)
            .args(&command.args)
            .envs(command.env.iter().map(|(key, value)| (key, value)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        debug!("Spawned {} (pid {:?})", command.program.display(), child.id());

        let timeout = self.timeout;
        let deadline = async move {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };

        // Dropping the pending wait drops the child, which kills it.
        tokio::select! {
            _ = cancel.cancelled() => Err(RunError::Cancelled),
            _ = deadline => Err(RunError::TimedOut(timeout.unwrap_or_default())),
            output = child.wait_with_output() => {
                let output = output?;
                Ok(ProcessOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    exit_code: output.status.code(),
                })
            }
        }
    }
}
