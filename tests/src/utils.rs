//! Scripted stand-ins for smbclient, the process runner and the user.

use std::collections::{HashMap, HashSet, VecDeque};
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use smbrowse_common::config::Config;
use smbrowse_common::credentials::{CredentialStore, Credentials};
use smbrowse_common::events::ScanEvent;
use smbrowse_common::lookup::{LookupFailure, LookupKind, LookupOperation, LookupResult, TaskKey};
use smbrowse_common::network::{Host, HostInfo, ItemKey, NetworkItem};
use smbrowse_common::resolver::AddressResolver;
use smbrowse_common::tools::{
    CommandBuilder, CommandLine, ProcessOutput, ProcessRunner, ResultDecoder, RunError,
    ToolNotFound,
};
use smbrowse_core::scanner::TaskRegistry;
use smbrowse_core::{Collaborators, NetworkModel, Scanner};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;

/// Records every command it builds. Kinds listed in `missing` fail with
/// `ToolNotFound`.
#[derive(Default)]
pub struct ScriptedBuilder {
    missing: Mutex<HashSet<LookupKind>>,
    built: Mutex<Vec<(TaskKey, Option<Credentials>)>>,
}

impl ScriptedBuilder {
    pub fn tool_missing_for(&self, kind: LookupKind) {
        self.missing.lock().unwrap().insert(kind);
    }

    pub fn built(&self) -> Vec<(TaskKey, Option<Credentials>)> {
        self.built.lock().unwrap().clone()
    }
}

impl CommandBuilder for ScriptedBuilder {
    fn build(
        &self,
        operation: &LookupOperation,
        credentials: Option<&Credentials>,
        _cfg: &Config,
    ) -> Result<CommandLine, ToolNotFound> {
        if self.missing.lock().unwrap().contains(&operation.kind()) {
            return Err(ToolNotFound::new("smbclient"));
        }
        self.built
            .lock()
            .unwrap()
            .push((operation.key(), credentials.cloned()));
        Ok(CommandLine::new("smbclient").arg(operation.key().to_string()))
    }
}

/// Pretends to run commands. While held, runs only end when cancelled.
#[derive(Default)]
pub struct FakeRunner {
    calls: AtomicUsize,
    hold: AtomicBool,
}

impl FakeRunner {
    pub fn hold(&self, hold: bool) {
        self.hold.store(hold, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(
        &self,
        command: CommandLine,
        cancel: CancellationToken,
    ) -> Result<ProcessOutput, RunError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hold.load(Ordering::SeqCst) {
            cancel.cancelled().await;
            return Err(RunError::Cancelled);
        }
        tokio::task::yield_now().await;
        Ok(ProcessOutput {
            stdout: command.args.join(" "),
            stderr: String::new(),
            exit_code: Some(0),
        })
    }
}

/// Hands out queued results per lookup, keyed by kind and target, so
/// concurrent lookups of one kind get their own answers whatever order they
/// finish in. An empty queue decodes to an empty listing.
#[derive(Default)]
pub struct ScriptedDecoder {
    answers: Mutex<HashMap<TaskKey, VecDeque<Result<LookupResult, LookupFailure>>>>,
    panicking: Mutex<HashSet<TaskKey>>,
}

impl ScriptedDecoder {
    pub fn answer(
        &self,
        kind: LookupKind,
        target: &ItemKey,
        answer: Result<LookupResult, LookupFailure>,
    ) {
        self.answers
            .lock()
            .unwrap()
            .entry(TaskKey::new(kind, target.clone()))
            .or_default()
            .push_back(answer);
    }

    /// Makes decoding for this lookup panic.
    pub fn panic_on(&self, kind: LookupKind, target: &ItemKey) {
        self.panicking
            .lock()
            .unwrap()
            .insert(TaskKey::new(kind, target.clone()));
    }
}

impl ResultDecoder for ScriptedDecoder {
    fn decode(
        &self,
        operation: &LookupOperation,
        _output: &ProcessOutput,
    ) -> Result<LookupResult, LookupFailure> {
        let key = operation.key();
        let panics = self.panicking.lock().unwrap().contains(&key);
        if panics {
            panic!("garbled output for {key}");
        }

        let queued = self
            .answers
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        queued.unwrap_or_else(|| {
            Ok(match key.kind {
                LookupKind::Domains => LookupResult::Workgroups(Vec::new()),
                LookupKind::DomainMembers => LookupResult::Hosts(Vec::new()),
                LookupKind::Shares => LookupResult::Shares(Vec::new()),
                LookupKind::HostInfo => LookupResult::HostInfo(HostInfo::default()),
            })
        })
    }
}

/// Stored credentials plus a queue of prompt answers; an exhausted queue
/// means the user declines. A stalled prompt never answers.
#[derive(Default)]
pub struct FakeCredentials {
    stored: Mutex<Option<Credentials>>,
    answers: Mutex<VecDeque<Option<Credentials>>>,
    prompted_for: Mutex<Vec<ItemKey>>,
    stalled: AtomicBool,
}

impl FakeCredentials {
    pub fn store(&self, credentials: Credentials) {
        *self.stored.lock().unwrap() = Some(credentials);
    }

    pub fn answer(&self, answer: Option<Credentials>) {
        self.answers.lock().unwrap().push_back(answer);
    }

    pub fn prompted_for(&self) -> Vec<ItemKey> {
        self.prompted_for.lock().unwrap().clone()
    }

    pub fn stall_prompts(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialStore for FakeCredentials {
    async fn read(&self, _target: &NetworkItem) -> Option<Credentials> {
        self.stored.lock().unwrap().clone()
    }

    async fn prompt(&self, target: &NetworkItem) -> Option<Credentials> {
        self.prompted_for.lock().unwrap().push(target.key());
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.answers.lock().unwrap().pop_front().flatten()
    }
}

#[derive(Default)]
pub struct TableResolver {
    table: HashMap<String, IpAddr>,
}

impl TableResolver {
    pub fn with(mut self, name: &str, ip: IpAddr) -> Self {
        self.table.insert(name.to_ascii_lowercase(), ip);
        self
    }
}

impl AddressResolver for TableResolver {
    fn resolve(&self, host: &Host) -> Option<IpAddr> {
        self.table.get(&host.name.to_ascii_lowercase()).copied()
    }
}

/// A scanner wired to the fakes above, keeping handles to all of them.
pub struct Harness {
    pub scanner: Scanner,
    pub builder: Arc<ScriptedBuilder>,
    pub runner: Arc<FakeRunner>,
    pub decoder: Arc<ScriptedDecoder>,
    pub credentials: Arc<FakeCredentials>,
    events: UnboundedReceiver<ScanEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(Config::default(), TableResolver::default())
    }

    pub fn with(cfg: Config, resolver: TableResolver) -> Self {
        let builder = Arc::new(ScriptedBuilder::default());
        let runner = Arc::new(FakeRunner::default());
        let decoder = Arc::new(ScriptedDecoder::default());
        let credentials = Arc::new(FakeCredentials::default());
        let (events_tx, events) = mpsc::unbounded_channel();

        let collaborators = Collaborators {
            builder: builder.clone(),
            runner: runner.clone(),
            decoder: decoder.clone(),
            credentials: credentials.clone(),
            resolver: Arc::new(resolver),
            sink: Arc::new(events_tx),
        };

        Self {
            scanner: Scanner::new(NetworkModel::new(), TaskRegistry::new(), collaborators, cfg),
            builder,
            runner,
            decoder,
            credentials,
            events,
        }
    }

    /// Events emitted since the last call.
    pub fn events(&mut self) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
