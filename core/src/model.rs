//! # Network Model
//!
//! The process-wide picture of the network: every known workgroup, host and
//! share, keyed by its case-insensitive [`ItemKey`].
//!
//! Only the [`Scanner`](crate::scanner::Scanner) and the
//! [`Reconciler`](crate::reconciler::Reconciler) mutate it. Everyone else gets
//! the read-only query surface.

use indexmap::IndexMap;
use smbrowse_common::network::{Host, ItemKey, NetworkItem, Share, Workgroup};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NetworkModel {
    workgroups: IndexMap<ItemKey, Workgroup>,
    hosts: IndexMap<ItemKey, Host>,
    shares: IndexMap<ItemKey, Share>,
}

impl NetworkModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_workgroup(&self, key: &ItemKey) -> Option<&Workgroup> {
        self.workgroups.get(key)
    }

    pub fn find_host(&self, key: &ItemKey) -> Option<&Host> {
        self.hosts.get(key)
    }

    pub fn find_share(&self, key: &ItemKey) -> Option<&Share> {
        self.shares.get(key)
    }

    /// Looks `key` up in every kind, workgroups first.
    pub fn find_item(&self, key: &ItemKey) -> Option<NetworkItem> {
        if let Some(workgroup) = self.find_workgroup(key) {
            return Some(NetworkItem::Workgroup(workgroup.clone()));
        }
        if let Some(host) = self.find_host(key) {
            return Some(NetworkItem::Host(host.clone()));
        }
        self.find_share(key).cloned().map(NetworkItem::Share)
    }

    pub fn workgroups(&self) -> impl Iterator<Item = &Workgroup> {
        self.workgroups.values()
    }

    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.values()
    }

    pub fn shares(&self) -> impl Iterator<Item = &Share> {
        self.shares.values()
    }

    /// Hosts that are members of `workgroup`.
    pub fn members<'a>(&'a self, workgroup: &'a str) -> impl Iterator<Item = &'a Host> {
        self.hosts.values().filter(move |host| host.belongs_to(workgroup))
    }

    /// Shares listed on the host identified by `host_key`.
    pub fn shares_of<'a>(&'a self, host_key: &'a ItemKey) -> impl Iterator<Item = &'a Share> {
        self.shares
            .values()
            .filter(move |share| share.host_key() == *host_key)
    }

    pub fn is_empty(&self) -> bool {
        self.workgroups.is_empty() && self.hosts.is_empty() && self.shares.is_empty()
    }

    // Mutation primitives, reserved for the scanner and reconciler.

    /// Inserts or replaces the workgroup stored under its key. A replaced entry
    /// keeps its position.
    pub(crate) fn put_workgroup(&mut self, workgroup: Workgroup) {
        self.workgroups.insert(workgroup.key(), workgroup);
    }

    pub(crate) fn put_host(&mut self, host: Host) {
        self.hosts.insert(host.key(), host);
    }

    pub(crate) fn put_share(&mut self, share: Share) {
        self.shares.insert(share.key(), share);
    }

    pub(crate) fn workgroup_mut(&mut self, key: &ItemKey) -> Option<&mut Workgroup> {
        self.workgroups.get_mut(key)
    }

    pub(crate) fn host_mut(&mut self, key: &ItemKey) -> Option<&mut Host> {
        self.hosts.get_mut(key)
    }

    pub(crate) fn hosts_mut(&mut self) -> impl Iterator<Item = &mut Host> {
        self.hosts.values_mut()
    }

    pub(crate) fn remove_workgroup(&mut self, key: &ItemKey) -> Option<Workgroup> {
        self.workgroups.shift_remove(key)
    }

    pub(crate) fn remove_host(&mut self, key: &ItemKey) -> Option<Host> {
        self.hosts.shift_remove(key)
    }

    /// Keeps only the hosts for which `keep` returns true.
    pub(crate) fn retain_hosts(&mut self, mut keep: impl FnMut(&Host) -> bool) {
        self.hosts.retain(|_, host| keep(host));
    }

    pub(crate) fn retain_shares(&mut self, mut keep: impl FnMut(&Share) -> bool) {
        self.shares.retain(|_, share| keep(share));
    }

    pub(crate) fn clear(&mut self) {
        self.workgroups.clear();
        self.hosts.clear();
        self.shares.clear();
    }
}
