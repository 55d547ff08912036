use std::net::{IpAddr, Ipv4Addr};

use smbrowse_common::config::Config;
use smbrowse_common::lookup::{LookupKind, LookupResult};
use smbrowse_common::network::{Host, ItemKey, Share, ShareType, Workgroup};
use smbrowse_core::Dispatch;

use crate::utils::{Harness, TableResolver};

const FILESERVER_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5));

fn office_network() -> Harness {
    let h = Harness::with(
        Config::default(),
        TableResolver::default().with("FILESERVER", FILESERVER_IP),
    );
    h.decoder.answer(
        LookupKind::Domains,
        &ItemKey::wildcard(),
        Ok(LookupResult::Workgroups(vec![
            Workgroup::new("OFFICE").with_master("FILESERVER"),
        ])),
    );
    h.decoder.answer(
        LookupKind::DomainMembers,
        &ItemKey::workgroup("OFFICE"),
        Ok(LookupResult::Hosts(vec![
            Host::new("FILESERVER", "OFFICE")
                .with_comment("Samba 4.19")
                .as_master_browser(),
            Host::new("LAPTOP", "OFFICE"),
        ])),
    );
    h.decoder.answer(
        LookupKind::Shares,
        &ItemKey::host("OFFICE", "FILESERVER"),
        Ok(LookupResult::Shares(vec![
            Share::new("Data", ShareType::Disk).with_comment("Department data"),
            Share::new("Printer1", ShareType::Printer),
            Share::new("IPC$", ShareType::Ipc),
        ])),
    );
    h
}

/// Domains, members of every workgroup, then shares of every host.
async fn walk(h: &mut Harness) {
    h.scanner.lookup_domains().await;
    h.scanner.run_until_idle().await;

    let workgroups: Vec<ItemKey> = h.scanner.model().workgroups().map(|w| w.key()).collect();
    for workgroup in &workgroups {
        h.scanner.lookup_domain_members(workgroup).await;
    }
    h.scanner.run_until_idle().await;

    let hosts: Vec<ItemKey> = h.scanner.model().hosts().map(|h| h.key()).collect();
    for host in &hosts {
        h.scanner.lookup_shares(host).await;
    }
    h.scanner.run_until_idle().await;
}

#[tokio::test]
async fn domains_create_the_master_browser() {
    let mut h = office_network();

    assert_eq!(h.scanner.lookup_domains().await, Dispatch::Started);
    h.scanner.run_until_idle().await;

    let model = h.scanner.model();
    let office = model.find_workgroup(&ItemKey::workgroup("OFFICE")).unwrap();
    assert_eq!(office.master_browser_name, "FILESERVER");
    assert_eq!(office.master_browser_ip, Some(FILESERVER_IP));

    let master = model.find_host(&ItemKey::host("OFFICE", "FILESERVER")).unwrap();
    assert!(master.is_master_browser);
    assert_eq!(master.ip, Some(FILESERVER_IP));
}

#[tokio::test]
async fn walking_the_office_network() {
    let mut h = office_network();

    walk(&mut h).await;

    let model = h.scanner.model();
    let members: Vec<&str> = model.members("OFFICE").map(|h| h.name.as_str()).collect();
    assert_eq!(members, ["FILESERVER", "LAPTOP"]);

    let fileserver_key = ItemKey::host("OFFICE", "FILESERVER");
    let fileserver = model.find_host(&fileserver_key).unwrap();
    assert!(fileserver.is_master_browser);
    assert_eq!(fileserver.comment.as_deref(), Some("Samba 4.19"));
    assert_eq!(fileserver.ip, Some(FILESERVER_IP));

    let shares: Vec<&Share> = model.shares_of(&fileserver_key).collect();
    let names: Vec<&str> = shares.iter().map(|s| s.share_name.as_str()).collect();
    assert_eq!(names, ["Data", "Printer1"]);
    assert!(shares.iter().all(|s| s.host_ip == Some(FILESERVER_IP)));
    assert!(shares.iter().all(|s| s.workgroup_name == "OFFICE"));

    // LAPTOP answered with an empty listing.
    let laptop = ItemKey::host("OFFICE", "LAPTOP");
    assert_eq!(model.shares_of(&laptop).count(), 0);
    assert!(h.scanner.registry().is_empty());
    assert!(!h.scanner.is_busy());
}

#[tokio::test]
async fn repeated_walks_leave_the_model_unchanged() {
    let mut h = office_network();
    walk(&mut h).await;
    let first = h.scanner.model().clone();

    h.decoder.answer(
        LookupKind::Domains,
        &ItemKey::wildcard(),
        Ok(LookupResult::Workgroups(vec![
            Workgroup::new("OFFICE").with_master("FILESERVER"),
        ])),
    );
    h.decoder.answer(
        LookupKind::DomainMembers,
        &ItemKey::workgroup("OFFICE"),
        Ok(LookupResult::Hosts(vec![
            Host::new("FILESERVER", "OFFICE").as_master_browser(),
            Host::new("LAPTOP", "OFFICE"),
        ])),
    );
    h.decoder.answer(
        LookupKind::Shares,
        &ItemKey::host("OFFICE", "FILESERVER"),
        Ok(LookupResult::Shares(vec![
            Share::new("Data", ShareType::Disk),
            Share::new("Printer1", ShareType::Printer),
        ])),
    );
    walk(&mut h).await;

    assert_eq!(*h.scanner.model(), first);
}

#[tokio::test]
async fn vanished_hosts_take_their_shares_along() {
    let mut h = office_network();
    walk(&mut h).await;

    let office = ItemKey::workgroup("OFFICE");
    h.decoder.answer(
        LookupKind::DomainMembers,
        &office,
        Ok(LookupResult::Hosts(vec![Host::new("LAPTOP", "OFFICE")])),
    );
    h.scanner.lookup_domain_members(&office).await;
    h.scanner.run_until_idle().await;

    let model = h.scanner.model();
    let fileserver = ItemKey::host("OFFICE", "FILESERVER");
    assert!(model.find_host(&fileserver).is_none());
    assert_eq!(model.shares_of(&fileserver).count(), 0);
    assert_eq!(model.members("OFFICE").count(), 1);

    // The master left with its host, so members now come from the model.
    let workgroup = model.find_workgroup(&office).unwrap();
    assert!(workgroup.master_browser_name.is_empty());
    assert_eq!(workgroup.master_browser_ip, None);
    assert_eq!(
        h.scanner.lookup_domain_members(&office).await,
        Dispatch::FromModel
    );
}

#[tokio::test]
async fn master_reported_by_members_wins() {
    let mut h = office_network();
    walk(&mut h).await;

    h.decoder.answer(
        LookupKind::DomainMembers,
        &ItemKey::workgroup("OFFICE"),
        Ok(LookupResult::Hosts(vec![
            Host::new("FILESERVER", "OFFICE"),
            Host::new("LAPTOP", "OFFICE").as_master_browser(),
        ])),
    );
    h.scanner
        .lookup_domain_members(&ItemKey::workgroup("OFFICE"))
        .await;
    h.scanner.run_until_idle().await;

    let model = h.scanner.model();
    let office = model.find_workgroup(&ItemKey::workgroup("OFFICE")).unwrap();
    assert_eq!(office.master_browser_name, "LAPTOP");

    let masters: Vec<&str> = model
        .members("OFFICE")
        .filter(|h| h.is_master_browser)
        .map(|h| h.name.as_str())
        .collect();
    assert_eq!(masters, ["LAPTOP"]);
}

#[tokio::test]
async fn share_filters_follow_the_config() {
    let cfg = Config {
        show_hidden_shares: true,
        show_printer_shares: false,
        show_ipc_shares: false,
        ..Config::default()
    };
    let mut h = Harness::with(cfg, TableResolver::default());
    let host = h.scanner.add_host(Host::new("NAS", "HOME"));

    h.decoder.answer(
        LookupKind::Shares,
        &host,
        Ok(LookupResult::Shares(vec![
            Share::new("Data", ShareType::Disk),
            Share::new("C$", ShareType::Disk),
            Share::new("IPC$", ShareType::Ipc),
            Share::new("Printer1", ShareType::Printer),
        ])),
    );
    h.scanner.lookup_shares(&host).await;
    h.scanner.run_until_idle().await;

    let names: Vec<&str> = h
        .scanner
        .model()
        .shares_of(&host)
        .map(|s| s.share_name.as_str())
        .collect();
    assert_eq!(names, ["Data", "C$"]);
}

#[tokio::test]
async fn custom_host_is_pseudo_master_until_confirmed() {
    let mut h = Harness::new();
    let nas_ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10));
    h.scanner.add_host(Host::new("NAS", "HOME").with_ip(nas_ip));

    let home = ItemKey::workgroup("HOME");
    let workgroup = h.scanner.model().find_workgroup(&home).unwrap();
    assert!(workgroup.is_pseudo_master);
    assert_eq!(workgroup.master_browser_name, "NAS");
    assert_eq!(workgroup.master_browser_ip, Some(nas_ip));

    h.decoder.answer(
        LookupKind::DomainMembers,
        &home,
        Ok(LookupResult::Hosts(vec![
            Host::new("NAS", "HOME").as_master_browser(),
            Host::new("PC1", "HOME"),
        ])),
    );
    assert_eq!(h.scanner.lookup_domain_members(&home).await, Dispatch::Started);
    h.scanner.run_until_idle().await;

    let model = h.scanner.model();
    let workgroup = model.find_workgroup(&home).unwrap();
    assert!(!workgroup.is_pseudo_master);
    assert_eq!(model.members("HOME").count(), 2);
    assert_eq!(
        model.find_host(&ItemKey::host("HOME", "NAS")).unwrap().ip,
        Some(nas_ip)
    );
}
