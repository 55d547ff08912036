use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use smbrowse_common::config::Config;
use smbrowse_core::scanner::TaskRegistry;
use smbrowse_core::system::{SystemResolver, TokioProcessRunner};
use smbrowse_core::{Collaborators, Dispatch, NetworkModel, Scanner};
use smbrowse_protocols::{SambaCommandBuilder, SambaDecoder};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::credentials::TerminalCredentials;
use crate::terminal::spinner;

/// How long aborted lookups get to wind down after Ctrl-C.
const ABORT_GRACE: Duration = Duration::from_secs(2);

/// A scanner wired to smbclient and the terminal.
pub struct Session {
    pub scanner: Scanner,
    follower: JoinHandle<()>,
}

impl Session {
    pub fn open(cfg: Config, user: Option<String>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let collaborators = Collaborators {
            builder: Arc::new(SambaCommandBuilder::default()),
            runner: Arc::new(TokioProcessRunner::new(cfg.timeout)),
            decoder: Arc::new(SambaDecoder),
            credentials: Arc::new(TerminalCredentials::new(user)),
            resolver: Arc::new(SystemResolver),
            sink: Arc::new(events_tx),
        };

        Self {
            scanner: Scanner::new(NetworkModel::new(), TaskRegistry::new(), collaborators, cfg),
            follower: tokio::spawn(spinner::follow_events(events_rx)),
        }
    }

    /// Merges results until no lookup is left. Returns false if the user
    /// interrupted the wait.
    pub async fn settle(&mut self) -> bool {
        let interrupted = tokio::select! {
            _ = self.scanner.run_until_idle() => false,
            _ = signal::ctrl_c() => true,
        };
        if !interrupted {
            return true;
        }

        warn!("Interrupted, stopping running lookups");
        self.scanner.abort_all();
        if tokio::time::timeout(ABORT_GRACE, self.scanner.run_until_idle())
            .await
            .is_err()
        {
            warn!("Some lookups did not stop in time");
        }
        false
    }

    pub async fn close(self) {
        // Dropping the scanner closes the event channel, which ends the follower.
        drop(self.scanner);
        let _ = self.follower.await;
    }
}

/// Turns dispatch answers that leave nothing to wait for into errors.
pub fn check(dispatch: Dispatch, target: &str) -> anyhow::Result<()> {
    match dispatch {
        Dispatch::Started | Dispatch::AlreadyRunning | Dispatch::Cached | Dispatch::FromModel => {
            Ok(())
        }
        Dispatch::UnknownTarget => bail!("{target} is not known"),
        Dispatch::ToolNotFound => bail!("smbclient was not found, is Samba installed?"),
        Dispatch::ShuttingDown => bail!("the scanner is shutting down"),
    }
}
