//! # Discovery Scanner
//!
//! The façade the application talks to when it wants to know what is on the
//! network. A request is admitted by the [`TaskRegistry`], turned into a
//! command line by the [`CommandBuilder`] and run as a [`LookupTask`]. When
//! the task finishes its decoded result is handed to the [`Reconciler`].
//!
//! Requests return as soon as the task is running. Completions are queued on
//! a channel and handled by [`Scanner::process_next`] (or
//! [`Scanner::run_until_idle`]), one at a time, by whoever owns the scanner.
//! Because the scanner is the sole owner of the [`NetworkModel`], merges
//! never overlap and the model needs no lock.
//!
//! Lookups of domain members and shares that fail to authenticate are retried
//! with credentials the user types in, for as long as the user keeps
//! answering the prompt.

mod registry;
mod task;

use std::sync::Arc;

use smbrowse_common::config::Config;
use smbrowse_common::credentials::{CredentialStore, Credentials};
use smbrowse_common::events::{NotificationSink, ScanEvent};
use smbrowse_common::lookup::{
    LookupFailure, LookupKind, LookupOperation, LookupResult, TaskKey, TaskOutcome,
};
use smbrowse_common::network::{Host, ItemKey, NetworkItem, Share};
use smbrowse_common::resolver::AddressResolver;
use smbrowse_common::tools::{CommandBuilder, ProcessRunner, ResultDecoder};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::model::NetworkModel;
use crate::reconciler::Reconciler;

pub use registry::TaskRegistry;
pub use task::LookupTask;
use task::Completion;

/// Everything outside the core the scanner relies on.
#[derive(Clone)]
pub struct Collaborators {
    pub builder: Arc<dyn CommandBuilder>,
    pub runner: Arc<dyn ProcessRunner>,
    pub decoder: Arc<dyn ResultDecoder>,
    pub credentials: Arc<dyn CredentialStore>,
    pub resolver: Arc<dyn AddressResolver>,
    pub sink: Arc<dyn NotificationSink>,
}

/// Immediate answer to a lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A task was admitted and its process started.
    Started,
    /// The same lookup for the same target is still running.
    AlreadyRunning,
    /// Host info was resolved before; the model already has it.
    Cached,
    /// No master browser is known for the workgroup; the members already in
    /// the model were announced instead.
    FromModel,
    /// The target is not part of the model.
    UnknownTarget,
    /// The command could not be built because a tool is missing.
    ToolNotFound,
    ShuttingDown,
}

pub struct Scanner {
    model: NetworkModel,
    registry: TaskRegistry,
    reconciler: Reconciler,
    builder: Arc<dyn CommandBuilder>,
    runner: Arc<dyn ProcessRunner>,
    decoder: Arc<dyn ResultDecoder>,
    credentials: Arc<dyn CredentialStore>,
    sink: Arc<dyn NotificationSink>,
    config: Config,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
    /// Last run state announced to the sink.
    announced_busy: bool,
    shutting_down: bool,
}

impl Scanner {
    pub fn new(
        model: NetworkModel,
        registry: TaskRegistry,
        collaborators: Collaborators,
        config: Config,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            model,
            registry,
            reconciler: Reconciler::new(collaborators.resolver),
            builder: collaborators.builder,
            runner: collaborators.runner,
            decoder: collaborators.decoder,
            credentials: collaborators.credentials,
            sink: collaborators.sink,
            config,
            completions_tx,
            completions_rx,
            announced_busy: false,
            shutting_down: false,
        }
    }

    pub fn model(&self) -> &NetworkModel {
        &self.model
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// True while at least one lookup is in flight.
    pub fn is_busy(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Enumerates the workgroups and domains of the network.
    pub async fn lookup_domains(&mut self) -> Dispatch {
        let operation = LookupOperation::EnumerateDomains;
        if let Err(denied) = self.admit(&operation) {
            return denied;
        }
        self.launch(operation, None)
    }

    /// Enumerates the members of a known workgroup via its master browser.
    pub async fn lookup_domain_members(&mut self, workgroup: &ItemKey) -> Dispatch {
        let Some(workgroup) = self.model.find_workgroup(workgroup).cloned() else {
            return Dispatch::UnknownTarget;
        };

        let master = workgroup
            .master_key()
            .and_then(|key| self.model.find_host(&key))
            .cloned();

        let Some(master) = master else {
            debug!(
                "No master browser known for {}, serving members from the model",
                workgroup.name
            );
            self.sink.notify(ScanEvent::ModelChanged {
                kind: LookupKind::DomainMembers,
                target: workgroup.key(),
            });
            return Dispatch::FromModel;
        };

        let operation = LookupOperation::EnumerateDomainMembers { workgroup, master };
        if let Err(denied) = self.admit(&operation) {
            return denied;
        }
        let credentials = self.read_credentials(&operation).await;
        self.launch(operation, credentials)
    }

    /// Enumerates the shares of a known host.
    pub async fn lookup_shares(&mut self, host: &ItemKey) -> Dispatch {
        let Some(host) = self.model.find_host(host).cloned() else {
            return Dispatch::UnknownTarget;
        };

        let operation = LookupOperation::EnumerateShares(host);
        if let Err(denied) = self.admit(&operation) {
            return denied;
        }
        let credentials = self.read_credentials(&operation).await;
        self.launch(operation, credentials)
    }

    /// Fetches the server and OS strings of a known host, once.
    pub async fn lookup_info(&mut self, host: &ItemKey) -> Dispatch {
        let Some(host) = self.model.find_host(host).cloned() else {
            return Dispatch::UnknownTarget;
        };
        if host.info_resolved {
            return Dispatch::Cached;
        }

        let operation = LookupOperation::FetchHostInfo(host);
        if let Err(denied) = self.admit(&operation) {
            return denied;
        }
        self.launch(operation, None)
    }

    /// Adds a host that is not announced by any browse list.
    pub fn add_host(&mut self, host: Host) -> ItemKey {
        let workgroup = ItemKey::workgroup(&host.workgroup_name);
        let key = self.reconciler.add_host(&mut self.model, host);
        self.sink.notify(ScanEvent::ModelChanged {
            kind: LookupKind::DomainMembers,
            target: workgroup,
        });
        key
    }

    /// Waits for the next lookup to finish and merges its result. Returns
    /// `None` right away when nothing is running.
    pub async fn process_next(&mut self) -> Option<TaskKey> {
        if self.registry.is_empty() {
            self.update_run_state();
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        let key = completion.key.clone();
        self.handle_completion(completion).await;
        Some(key)
    }

    /// Handles completions until no lookup is left, retries included.
    pub async fn run_until_idle(&mut self) {
        while self.process_next().await.is_some() {}
    }

    /// Requests termination of every running lookup that matches `target`
    /// and `kind`; `None` matches anything. Returns how many were signalled.
    ///
    /// Aborted lookups still complete through [`Scanner::process_next`].
    pub fn abort(&mut self, target: Option<&ItemKey>, kind: Option<LookupKind>) -> usize {
        let mut count = 0;
        for task in self.registry.matching(target, kind) {
            task.abort();
            count += 1;
        }
        count
    }

    pub fn abort_all(&mut self) {
        if self.shutting_down {
            return;
        }
        let count = self.abort(None, None);
        if count > 0 {
            info!("Aborting {count} running lookups");
        }
    }

    /// Stops everything and clears registry and model. No lookup can be
    /// started afterwards.
    pub async fn shutdown(&mut self) {
        self.abort_all();
        self.shutting_down = true;
        self.run_until_idle().await;
        self.registry.clear();
        self.model.clear();
        self.update_run_state();
    }

    fn admit(&mut self, operation: &LookupOperation) -> Result<(), Dispatch> {
        if self.shutting_down {
            return Err(Dispatch::ShuttingDown);
        }
        let key = operation.key();
        if !self.registry.try_admit(&key) {
            debug!("Lookup of {key} is already running");
            return Err(Dispatch::AlreadyRunning);
        }
        Ok(())
    }

    /// Builds the command for an admitted operation and starts its task.
    fn launch(&mut self, operation: LookupOperation, credentials: Option<Credentials>) -> Dispatch {
        let key = operation.key();

        let command = match self
            .builder
            .build(&operation, credentials.as_ref(), &self.config)
        {
            Ok(command) => command,
            Err(missing) => {
                error!("Cannot look up {key}: {missing}");
                self.registry.release(&key);
                self.sink.notify(ScanEvent::ToolNotFound {
                    kind: key.kind,
                    tool: missing.tool,
                });
                return Dispatch::ToolNotFound;
            }
        };

        debug!("Starting lookup of {key}: {command:?}");
        self.sink.notify(ScanEvent::AboutToStart { key: key.clone() });

        let mut task = LookupTask::new(operation);
        task.start(
            command,
            self.runner.clone(),
            self.decoder.clone(),
            self.completions_tx.clone(),
        );
        self.registry.register(task);
        self.update_run_state();

        Dispatch::Started
    }

    async fn handle_completion(&mut self, completion: Completion) {
        let Completion { key, result } = completion;
        let Some(task) = self.registry.find(&key) else {
            warn!("Completion for unknown lookup {key}");
            return;
        };
        let operation = task.operation().clone();

        let outcome = match result {
            Ok(result) => match self.reconcile(&operation, result) {
                Ok(()) => {
                    self.sink.notify(ScanEvent::ModelChanged {
                        kind: key.kind,
                        target: key.target.clone(),
                    });
                    TaskOutcome::Completed
                }
                Err(failure) => TaskOutcome::Failed(failure),
            },
            Err(end) => end.into(),
        };

        let refused = matches!(&outcome, TaskOutcome::Failed(failure) if failure.is_auth())
            && key.kind.retries_on_auth()
            && !self.shutting_down;

        match &outcome {
            TaskOutcome::Completed => info!("Lookup of {key} finished"),
            TaskOutcome::Aborted => info!("Lookup of {key} was aborted"),
            TaskOutcome::Failed(failure) if refused => {
                warn!("Lookup of {key} was refused: {failure}")
            }
            TaskOutcome::Failed(failure) => error!("Lookup of {key} failed: {failure}"),
        }

        if let Some(task) = self.registry.find_mut(&key) {
            task.finish(outcome.clone());
        }
        self.sink.notify(ScanEvent::Finished {
            key: key.clone(),
            outcome,
        });
        self.registry.remove(&key);

        // The finished task is gone before the user is asked, so dropping
        // this future mid-prompt leaves the registry consistent.
        if refused {
            match self.prompt_credentials(&operation).await {
                Some(credentials) => {
                    info!("Retrying lookup of {key} with new credentials");
                    if self.admit(&operation).is_ok() {
                        self.launch(operation, Some(credentials));
                    }
                }
                None => error!("Lookup of {key} failed: no credentials"),
            }
        }

        self.update_run_state();
    }

    fn reconcile(
        &mut self,
        operation: &LookupOperation,
        result: LookupResult,
    ) -> Result<(), LookupFailure> {
        match (operation, result) {
            (LookupOperation::EnumerateDomains, LookupResult::Workgroups(workgroups)) => {
                self.reconciler.merge_workgroups(&mut self.model, workgroups);
            }
            (
                LookupOperation::EnumerateDomainMembers { workgroup, .. },
                LookupResult::Hosts(hosts),
            ) => {
                self.reconciler
                    .merge_domain_members(&mut self.model, &workgroup.name, hosts);
            }
            (LookupOperation::EnumerateShares(host), LookupResult::Shares(shares)) => {
                let shares = self.visible_shares(shares);
                self.reconciler.merge_shares(&mut self.model, host, shares);
            }
            (LookupOperation::FetchHostInfo(host), LookupResult::HostInfo(info)) => {
                let mut observed = host.clone();
                observed.set_info(info);
                self.reconciler.merge_host_info(&mut self.model, observed);
            }
            (operation, _) => {
                return Err(LookupFailure::Other(format!(
                    "unexpected result for {} lookup",
                    operation.kind()
                )));
            }
        }
        Ok(())
    }

    fn visible_shares(&self, shares: Vec<Share>) -> Vec<Share> {
        shares
            .into_iter()
            .filter(|share| {
                (self.config.show_hidden_shares || !share.is_hidden() || share.is_ipc())
                    && (self.config.show_printer_shares || !share.is_printer())
                    && (self.config.show_ipc_shares || !share.is_ipc())
            })
            .collect()
    }

    async fn read_credentials(&self, operation: &LookupOperation) -> Option<Credentials> {
        let host = operation.host()?;
        self.credentials
            .read(&NetworkItem::Host(host.clone()))
            .await
    }

    async fn prompt_credentials(&self, operation: &LookupOperation) -> Option<Credentials> {
        let host = operation.host()?;
        let credentials = self
            .credentials
            .prompt(&NetworkItem::Host(host.clone()))
            .await;
        if credentials.is_none() {
            info!("No credentials supplied for {}", host.name);
        }
        credentials
    }

    fn update_run_state(&mut self) {
        let busy = !self.registry.is_empty();
        if busy != self.announced_busy {
            self.announced_busy = busy;
            self.sink.notify(ScanEvent::RunStateChanged { busy });
        }
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        for task in self.registry.tasks() {
            task.abort();
        }
    }
}
