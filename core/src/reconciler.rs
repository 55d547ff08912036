//! # Reconciler
//!
//! Merges freshly observed batches into the [`NetworkModel`].
//!
//! A batch from a full enumeration (domains, members of a workgroup, shares
//! of a host) is authoritative: entries it no longer contains are removed,
//! entries it contains replace their predecessors. What a less detailed lookup
//! did not report (comments, addresses, host info, mount state) is carried
//! forward from the entry being replaced.
//!
//! After every merge each workgroup with a master browser name has a matching
//! host flagged as master, and every master with a known address has it
//! copied onto its workgroup.

use std::collections::HashSet;
use std::sync::Arc;

use smbrowse_common::network::{Host, ItemKey, Share, Workgroup};
use smbrowse_common::resolver::AddressResolver;
use tracing::{debug, info, warn};

use crate::model::NetworkModel;

pub struct Reconciler {
    resolver: Arc<dyn AddressResolver>,
}

impl Reconciler {
    pub fn new(resolver: Arc<dyn AddressResolver>) -> Self {
        Self { resolver }
    }

    /// Merges the complete list of workgroups visible on the network.
    pub fn merge_workgroups(&self, model: &mut NetworkModel, observed: Vec<Workgroup>) {
        let mut observed_keys: HashSet<ItemKey> = HashSet::new();

        for mut workgroup in observed {
            let key = workgroup.key();
            if let Some(existing) = model.find_workgroup(&key) {
                carry_forward_workgroup(&mut workgroup, existing);
            }
            debug!("Merging workgroup {}", workgroup.name);
            promote_master(model, &workgroup);
            observed_keys.insert(key);
            model.put_workgroup(workgroup);
        }

        let vanished: Vec<Workgroup> = model
            .workgroups()
            .filter(|workgroup| !observed_keys.contains(&workgroup.key()))
            .cloned()
            .collect();

        for workgroup in vanished {
            info!("Workgroup {} disappeared", workgroup.name);
            model.remove_workgroup(&workgroup.key());
            model.retain_hosts(|host| !host.belongs_to(&workgroup.name));
            model.retain_shares(|share| {
                share.is_mounted() || !share.workgroup_name.eq_ignore_ascii_case(&workgroup.name)
            });
        }

        self.backfill_master_ips(model);
    }

    /// Merges the complete member list of `workgroup_name`.
    pub fn merge_domain_members(
        &self,
        model: &mut NetworkModel,
        workgroup_name: &str,
        observed: Vec<Host>,
    ) {
        let workgroup_key = ItemKey::workgroup(workgroup_name);
        let canonical_name = model
            .find_workgroup(&workgroup_key)
            .map_or_else(|| workgroup_name.to_string(), |w| w.name.clone());

        let mut observed_keys: HashSet<ItemKey> = HashSet::new();
        let mut reported_master: Option<Host> = None;

        for mut host in observed {
            host.workgroup_name.clone_from(&canonical_name);
            let key = host.key();
            if let Some(existing) = model.find_host(&key) {
                carry_forward_host(&mut host, existing);
            }
            if host.is_master_browser {
                reported_master = Some(host.clone());
            }
            observed_keys.insert(key);
            model.put_host(host);
        }

        let vanished: Vec<ItemKey> = model
            .members(&canonical_name)
            .map(Host::key)
            .filter(|key| !observed_keys.contains(key))
            .collect();

        for key in vanished {
            if let Some(host) = model.remove_host(&key) {
                info!("Host {} left workgroup {}", host.name, canonical_name);
            }
            model.retain_shares(|share| share.is_mounted() || share.host_key() != key);
        }

        let Some(workgroup) = model.workgroup_mut(&workgroup_key) else {
            warn!("Merged members of unknown workgroup {canonical_name}");
            self.backfill_master_ips(model);
            return;
        };

        match reported_master {
            Some(master) => {
                if !workgroup.is_master(&master.name) {
                    info!(
                        "Master browser of {} changed from '{}' to '{}'",
                        workgroup.name, workgroup.master_browser_name, master.name
                    );
                    workgroup.master_browser_name = master.name;
                    workgroup.master_browser_ip = master.ip;
                }
                workgroup.is_pseudo_master = false;
            }
            // A declared master missing from the list left with the other
            // vanished hosts; it is not brought back as a stub.
            None if workgroup
                .master_key()
                .is_some_and(|key| !observed_keys.contains(&key)) =>
            {
                info!(
                    "Master browser {} of {} is gone",
                    workgroup.master_browser_name, workgroup.name
                );
                workgroup.master_browser_name.clear();
                workgroup.master_browser_ip = None;
                workgroup.is_pseudo_master = false;
            }
            None => {}
        }

        let workgroup = workgroup.clone();
        promote_master(model, &workgroup);
        self.backfill_master_ips(model);
    }

    /// Merges the complete share list of `host`.
    pub fn merge_shares(&self, model: &mut NetworkModel, host: &Host, observed: Vec<Share>) {
        let host_key = host.key();
        let Some(host) = model.find_host(&host_key).cloned() else {
            warn!("Dropping shares of {}, the host is gone", host.name);
            return;
        };

        let mut observed_keys: HashSet<ItemKey> = HashSet::new();

        for mut share in observed {
            share.host_name.clone_from(&host.name);
            share.workgroup_name.clone_from(&host.workgroup_name);
            if share.host_ip.is_none() {
                share.host_ip = host.ip;
            }

            let key = share.key();
            if let Some(existing) = model.find_share(&key) {
                carry_forward_share(&mut share, existing);
            }
            observed_keys.insert(key);
            model.put_share(share);
        }

        model.retain_shares(|share| {
            share.host_key() != host_key || share.is_mounted() || observed_keys.contains(&share.key())
        });
    }

    /// Stores the extended info carried by `observed` on the matching host.
    pub fn merge_host_info(&self, model: &mut NetworkModel, observed: Host) {
        let Some(host) = model.host_mut(&observed.key()) else {
            warn!("Dropping info of {}, the host is gone", observed.name);
            return;
        };

        if let Some(info) = observed.info {
            host.set_info(info);
        }
        if host.ip.is_none()
            && let Some(ip) = observed.ip
        {
            host.set_ip(ip);
        }
    }

    /// Adds a host that no browse list reported. An unknown workgroup is
    /// created on the fly with the host as its pseudo master browser.
    pub fn add_host(&self, model: &mut NetworkModel, mut host: Host) -> ItemKey {
        let workgroup_key = ItemKey::workgroup(&host.workgroup_name);

        if model.find_workgroup(&workgroup_key).is_none() {
            info!(
                "Using {} as pseudo master browser of {}",
                host.name, host.workgroup_name
            );
            let mut workgroup = Workgroup::new(&host.workgroup_name).with_master(&host.name);
            workgroup.master_browser_ip = host.ip;
            workgroup.is_pseudo_master = true;
            host.is_master_browser = true;
            model.put_workgroup(workgroup);
        }

        let key = host.key();
        if let Some(existing) = model.find_host(&key) {
            carry_forward_host(&mut host, existing);
            host.is_master_browser |= existing.is_master_browser;
        }
        model.put_host(host);
        key
    }

    fn backfill_master_ips(&self, model: &mut NetworkModel) {
        let pending: Vec<(ItemKey, ItemKey)> = model
            .workgroups()
            .filter(|workgroup| workgroup.master_browser_ip.is_none())
            .filter_map(|workgroup| Some((workgroup.key(), workgroup.master_key()?)))
            .collect();

        for (workgroup_key, master_key) in pending {
            let Some(master) = model.find_host(&master_key) else {
                continue;
            };

            let ip = match master.ip {
                Some(ip) => ip,
                None => {
                    // Blocks until the system resolver answers.
                    let Some(ip) = self.resolver.resolve(master) else {
                        debug!("Could not resolve master browser {}", master.name);
                        continue;
                    };
                    if let Some(master) = model.host_mut(&master_key) {
                        master.set_ip(ip);
                    }
                    ip
                }
            };

            if let Some(workgroup) = model.workgroup_mut(&workgroup_key) {
                workgroup.master_browser_ip = Some(ip);
            }
        }
    }
}

/// Flags the workgroup's master browser and clears the flag on every other
/// member, creating a stub host for a master not seen before.
fn promote_master(model: &mut NetworkModel, workgroup: &Workgroup) {
    let mut master_present = false;

    for host in model
        .hosts_mut()
        .filter(|host| host.belongs_to(&workgroup.name))
    {
        let is_master = workgroup.is_master(&host.name);
        if host.is_master_browser && !is_master {
            debug!("{} is no longer master browser of {}", host.name, workgroup.name);
        }
        host.is_master_browser = is_master;

        if is_master {
            master_present = true;
            if host.ip.is_none()
                && let Some(ip) = workgroup.master_browser_ip
            {
                host.set_ip(ip);
            }
        }
    }

    if workgroup.has_master() && !master_present {
        debug!(
            "Adding master browser {} of {}",
            workgroup.master_browser_name, workgroup.name
        );
        let mut master = Host::new(&workgroup.master_browser_name, &workgroup.name).as_master_browser();
        if let Some(ip) = workgroup.master_browser_ip {
            master.set_ip(ip);
        }
        model.put_host(master);
    }
}

fn carry_forward_workgroup(workgroup: &mut Workgroup, existing: &Workgroup) {
    if !workgroup.has_master() {
        workgroup.master_browser_name.clone_from(&existing.master_browser_name);
        workgroup.is_pseudo_master = existing.is_pseudo_master;
    }
    if workgroup.master_browser_ip.is_none() && existing.is_master(&workgroup.master_browser_name) {
        workgroup.master_browser_ip = existing.master_browser_ip;
    }
}

fn carry_forward_host(host: &mut Host, existing: &Host) {
    if host.comment.is_none() {
        host.comment.clone_from(&existing.comment);
    }
    if host.info.is_none() {
        host.info.clone_from(&existing.info);
        host.info_resolved = existing.info_resolved;
    }
    if host.ip.is_none() {
        host.ip = existing.ip;
        host.ip_resolved = existing.ip_resolved;
    }
    if host.port.is_none() {
        host.port = existing.port;
    }
}

fn carry_forward_share(share: &mut Share, existing: &Share) {
    if share.comment.is_none() {
        share.comment.clone_from(&existing.comment);
    }
    if share.mount.is_none() && existing.is_mounted() {
        share.mount.clone_from(&existing.mount);
    }
}
