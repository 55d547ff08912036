//! A single in-flight lookup.
//!
//! The task owns the cancellation token handed to the process runner and the
//! tokio task that runs the tool and decodes its output. The result travels
//! back to the scanner as a [`Completion`]; the task itself never touches the
//! network model.

use std::sync::Arc;

use smbrowse_common::lookup::{
    LookupFailure, LookupOperation, LookupResult, TaskKey, TaskOutcome, TaskState,
};
use smbrowse_common::tools::{CommandLine, ProcessRunner, ResultDecoder, RunError};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Why a task did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TaskEnd {
    Failed(LookupFailure),
    Aborted,
}

impl From<TaskEnd> for TaskOutcome {
    fn from(end: TaskEnd) -> Self {
        match end {
            TaskEnd::Failed(failure) => TaskOutcome::Failed(failure),
            TaskEnd::Aborted => TaskOutcome::Aborted,
        }
    }
}

/// Message a finished task sends back to the scanner.
#[derive(Debug)]
pub(crate) struct Completion {
    pub key: TaskKey,
    pub result: Result<LookupResult, TaskEnd>,
}

#[derive(Debug)]
pub struct LookupTask {
    key: TaskKey,
    operation: LookupOperation,
    state: TaskState,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl LookupTask {
    pub(crate) fn new(operation: LookupOperation) -> Self {
        Self {
            key: operation.key(),
            operation,
            state: TaskState::Pending,
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    pub fn key(&self) -> &TaskKey {
        &self.key
    }

    pub fn operation(&self) -> &LookupOperation {
        &self.operation
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Spawns the tool run. The completion is sent on `completions` exactly
    /// once, whatever the outcome, a panic in the runner or decoder included.
    pub(crate) fn start(
        &mut self,
        command: CommandLine,
        runner: Arc<dyn ProcessRunner>,
        decoder: Arc<dyn ResultDecoder>,
        completions: UnboundedSender<Completion>,
    ) {
        let key = self.key.clone();
        let operation = self.operation.clone();
        let cancel = self.cancel.clone();

        self.state = TaskState::Running;
        self.handle = Some(tokio::spawn(async move {
            let guard = CompletionGuard::new(key, completions);
            let result = execute(&operation, command, runner, decoder, cancel).await;
            guard.complete(result);
        }));
    }

    /// Asks the running tool to stop. The task is only done once its
    /// completion arrives.
    pub fn abort(&self) {
        debug!("Aborting {}", self.key);
        self.cancel.cancel();
    }

    /// Moves the task out of `Running` and releases the spawned future.
    pub(crate) fn finish(&mut self, outcome: TaskOutcome) {
        self.state = TaskState::Finished(outcome);
        self.handle.take();
    }
}

/// Sends the completion of a spawned task. Dropped without
/// [`CompletionGuard::complete`], e.g. while unwinding, it reports a failure
/// so the scanner never waits for a task that is gone.
struct CompletionGuard {
    key: Option<TaskKey>,
    completions: UnboundedSender<Completion>,
}

impl CompletionGuard {
    fn new(key: TaskKey, completions: UnboundedSender<Completion>) -> Self {
        Self {
            key: Some(key),
            completions,
        }
    }

    fn complete(mut self, result: Result<LookupResult, TaskEnd>) {
        self.send(result);
    }

    fn send(&mut self, result: Result<LookupResult, TaskEnd>) {
        if let Some(key) = self.key.take() {
            // The scanner only drops its receiver on teardown.
            let _ = self.completions.send(Completion { key, result });
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(key) = &self.key {
            warn!("Lookup of {key} ended unexpectedly");
            self.send(Err(TaskEnd::Failed(LookupFailure::Other(String::from(
                "lookup ended unexpectedly",
            )))));
        }
    }
}

async fn execute(
    operation: &LookupOperation,
    command: CommandLine,
    runner: Arc<dyn ProcessRunner>,
    decoder: Arc<dyn ResultDecoder>,
    cancel: CancellationToken,
) -> Result<LookupResult, TaskEnd> {
    let output = match runner.run(command, cancel.clone()).await {
        Ok(output) => output,
        Err(RunError::Cancelled) => return Err(TaskEnd::Aborted),
        Err(err) => return Err(TaskEnd::Failed(LookupFailure::Other(err.to_string()))),
    };

    // The tool may have finished on its own after the abort was requested.
    if cancel.is_cancelled() {
        return Err(TaskEnd::Aborted);
    }

    decoder.decode(operation, &output).map_err(TaskEnd::Failed)
}
