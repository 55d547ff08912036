use std::time::Instant;

use anyhow::Context;
use smbrowse_common::network::{Host, ItemKey, Workgroup};
use smbrowse_core::NetworkModel;

use crate::commands::HostTarget;
use crate::commands::session::{Session, check};
use crate::terminal::print;

pub async fn domains(session: &mut Session) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let browse_host = session.scanner.config().browse_host.clone();

    check(session.scanner.lookup_domains().await, &browse_host)?;
    if !session.settle().await {
        return Ok(());
    }

    let model = session.scanner.model();
    let quiet = session.scanner.config().quiet;
    print::header("workgroups", quiet);
    if model.workgroups().next().is_none() {
        print::no_results("workgroups");
        return Ok(());
    }
    print::workgroups(model);
    print::summary(model, start_time.elapsed(), quiet);
    Ok(())
}

pub async fn members(session: &mut Session, workgroup: &str) -> anyhow::Result<()> {
    let browse_host = session.scanner.config().browse_host.clone();
    check(session.scanner.lookup_domains().await, &browse_host)?;
    if !session.settle().await {
        return Ok(());
    }

    let key = ItemKey::workgroup(workgroup);
    announced_workgroup(session.scanner.model(), workgroup, &browse_host)?;

    check(session.scanner.lookup_domain_members(&key).await, workgroup)?;
    if !session.settle().await {
        return Ok(());
    }

    let model = session.scanner.model();
    print::header(&format!("members of {workgroup}"), session.scanner.config().quiet);
    print::members(model, announced_workgroup(model, workgroup, &browse_host)?);
    Ok(())
}

pub async fn shares(session: &mut Session, name: &str, target: &HostTarget) -> anyhow::Result<()> {
    let key = add_host(session, name, target);

    check(session.scanner.lookup_shares(&key).await, name)?;
    if !session.settle().await {
        return Ok(());
    }

    let model = session.scanner.model();
    print::header(&format!("shares of {name}"), session.scanner.config().quiet);
    let host = listed_host(model, &key, name)?;
    if model.shares_of(&key).next().is_none() {
        print::no_results("shares");
        return Ok(());
    }
    print::shares(model, host);
    Ok(())
}

pub async fn info(session: &mut Session, name: &str, target: &HostTarget) -> anyhow::Result<()> {
    let key = add_host(session, name, target);

    check(session.scanner.lookup_info(&key).await, name)?;
    if !session.settle().await {
        return Ok(());
    }

    print::header(&format!("about {name}"), session.scanner.config().quiet);
    print::host_info(listed_host(session.scanner.model(), &key, name)?);
    Ok(())
}

/// Hosts named on the command line need not be in any browse list.
fn add_host(session: &mut Session, name: &str, target: &HostTarget) -> ItemKey {
    let mut host = Host::new(name, target.workgroup.as_str());
    if let Some(ip) = target.ip {
        host.set_ip(ip);
    }
    session.scanner.add_host(host)
}

fn announced_workgroup<'a>(
    model: &'a NetworkModel,
    name: &str,
    browse_host: &str,
) -> anyhow::Result<&'a Workgroup> {
    model
        .find_workgroup(&ItemKey::workgroup(name))
        .with_context(|| format!("workgroup {name} is not announced by {browse_host}"))
}

fn listed_host<'a>(model: &'a NetworkModel, key: &ItemKey, name: &str) -> anyhow::Result<&'a Host> {
    model
        .find_host(key)
        .with_context(|| format!("{name} is no longer part of the network model"))
}
