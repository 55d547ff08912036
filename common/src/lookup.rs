//! # Lookup Operations
//!
//! The four discovery actions, the key that makes a running lookup unique and
//! the states a lookup moves through.

use std::fmt;

use thiserror::Error;

use crate::network::{Host, HostInfo, ItemKey, Share, Workgroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Domains,
    DomainMembers,
    Shares,
    HostInfo,
}

impl LookupKind {
    /// Kinds whose failures can be recovered by asking for credentials.
    pub fn retries_on_auth(self) -> bool {
        matches!(self, LookupKind::DomainMembers | LookupKind::Shares)
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::Domains => f.write_str("domains"),
            LookupKind::DomainMembers => f.write_str("domain members"),
            LookupKind::Shares => f.write_str("shares"),
            LookupKind::HostInfo => f.write_str("host info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOperation {
    EnumerateDomains,
    /// Members of `workgroup`, queried from its master browser.
    EnumerateDomainMembers { workgroup: Workgroup, master: Host },
    EnumerateShares(Host),
    FetchHostInfo(Host),
}

impl LookupOperation {
    pub fn kind(&self) -> LookupKind {
        match self {
            LookupOperation::EnumerateDomains => LookupKind::Domains,
            LookupOperation::EnumerateDomainMembers { .. } => LookupKind::DomainMembers,
            LookupOperation::EnumerateShares(_) => LookupKind::Shares,
            LookupOperation::FetchHostInfo(_) => LookupKind::HostInfo,
        }
    }

    pub fn target(&self) -> ItemKey {
        match self {
            LookupOperation::EnumerateDomains => ItemKey::wildcard(),
            LookupOperation::EnumerateDomainMembers { workgroup, .. } => workgroup.key(),
            LookupOperation::EnumerateShares(host) | LookupOperation::FetchHostInfo(host) => {
                host.key()
            }
        }
    }

    pub fn key(&self) -> TaskKey {
        TaskKey::new(self.kind(), self.target())
    }

    /// The host the external tool talks to, if the operation has one.
    pub fn host(&self) -> Option<&Host> {
        match self {
            LookupOperation::EnumerateDomains => None,
            LookupOperation::EnumerateDomainMembers { master, .. } => Some(master),
            LookupOperation::EnumerateShares(host) | LookupOperation::FetchHostInfo(host) => {
                Some(host)
            }
        }
    }
}

/// Admission key: at most one lookup per key runs at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub kind: LookupKind,
    pub target: ItemKey,
}

impl TaskKey {
    pub fn new(kind: LookupKind, target: ItemKey) -> Self {
        Self { kind, target }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.kind, self.target)
    }
}

/// Why an external tool run did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupFailure {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("{0}")]
    Other(String),
}

impl LookupFailure {
    pub fn is_auth(&self) -> bool {
        matches!(self, LookupFailure::Auth(_))
    }
}

/// Decoded output of a finished lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Workgroups(Vec<Workgroup>),
    Hosts(Vec<Host>),
    Shares(Vec<Share>),
    HostInfo(HostInfo),
}

/// How a lookup ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed(LookupFailure),
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Finished(TaskOutcome),
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        matches!(self, TaskState::Running)
    }
}
