//! # External Tools
//!
//! Contracts for everything that touches the external diagnostic tools:
//! building a command line, running it and decoding what it printed.
//! Implemented in `smbrowse-protocols` (Samba tools) and `smbrowse-core`
//! (process runner).

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::credentials::Credentials;
use crate::lookup::{LookupFailure, LookupOperation, LookupResult};

/// A fully resolved external tool invocation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Extra environment, e.g. the password handed to the tool.
    pub env: Vec<(String, String)>,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

// Environment values may carry passwords.
impl fmt::Debug for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env_keys: Vec<&str> = self.env.iter().map(|(key, _)| key.as_str()).collect();
        f.debug_struct("CommandLine")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &env_keys)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("required tool '{tool}' could not be found")]
pub struct ToolNotFound {
    pub tool: String,
}

impl ToolNotFound {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }
}

pub trait CommandBuilder: Send + Sync {
    fn build(
        &self,
        operation: &LookupOperation,
        credentials: Option<&Credentials>,
        cfg: &Config,
    ) -> Result<CommandLine, ToolNotFound>;
}

/// Captured output of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    /// The cancellation token fired and the process was stopped.
    #[error("process was cancelled")]
    Cancelled,
    #[error("process timed out after {0:?}")]
    TimedOut(std::time::Duration),
    #[error("failed to start process: {0}")]
    Spawn(#[from] std::io::Error),
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `command` to completion, stopping it as soon as `cancel` fires.
    async fn run(
        &self,
        command: CommandLine,
        cancel: CancellationToken,
    ) -> Result<ProcessOutput, RunError>;
}

pub trait ResultDecoder: Send + Sync {
    fn decode(
        &self,
        operation: &LookupOperation,
        output: &ProcessOutput,
    ) -> Result<LookupResult, LookupFailure>;
}
