use std::time::Duration;

use smbrowse_common::events::ScanEvent;
use smbrowse_common::lookup::{LookupFailure, LookupKind, LookupResult, TaskKey, TaskOutcome};
use smbrowse_common::network::{Host, HostInfo, ItemKey, Workgroup};
use smbrowse_core::Dispatch;
use tokio::time::timeout;

use crate::utils::Harness;

#[tokio::test]
async fn one_lookup_per_key() {
    let mut h = Harness::new();
    let host = h.scanner.add_host(Host::new("FILESERVER", "OFFICE"));
    h.runner.hold(true);

    assert_eq!(h.scanner.lookup_shares(&host).await, Dispatch::Started);
    assert_eq!(h.scanner.lookup_shares(&host).await, Dispatch::AlreadyRunning);
    assert_eq!(h.scanner.lookup_info(&host).await, Dispatch::Started);

    assert_eq!(h.scanner.registry().len(), 2);
    assert_eq!(h.builder.built().len(), 2);

    h.scanner.abort_all();
    h.scanner.run_until_idle().await;
    assert!(h.scanner.registry().is_empty());
}

#[tokio::test]
async fn lookup_can_run_again_once_finished() {
    let mut h = Harness::new();
    let host = h.scanner.add_host(Host::new("FILESERVER", "OFFICE"));

    assert_eq!(h.scanner.lookup_shares(&host).await, Dispatch::Started);
    h.scanner.run_until_idle().await;
    assert_eq!(h.scanner.lookup_shares(&host).await, Dispatch::Started);
    h.scanner.run_until_idle().await;

    assert_eq!(h.runner.calls(), 2);
}

#[tokio::test]
async fn aborted_lookups_finish_as_aborted() {
    let mut h = Harness::new();
    let host = h.scanner.add_host(Host::new("FILESERVER", "OFFICE"));
    h.runner.hold(true);
    h.scanner.lookup_shares(&host).await;
    h.scanner.lookup_info(&host).await;
    h.events();

    assert_eq!(h.scanner.abort(None, Some(LookupKind::HostInfo)), 1);
    let finished = h.scanner.process_next().await;

    let info_key = TaskKey::new(LookupKind::HostInfo, host.clone());
    assert_eq!(finished, Some(info_key.clone()));
    assert!(h.scanner.registry().find(&info_key).is_none());
    assert_eq!(h.scanner.registry().len(), 1);
    assert!(h.events().contains(&ScanEvent::Finished {
        key: info_key,
        outcome: TaskOutcome::Aborted,
    }));

    assert_eq!(h.scanner.abort(Some(&host), None), 1);
    h.scanner.run_until_idle().await;
    assert!(h.scanner.registry().is_empty());
    assert!(h.credentials.prompted_for().is_empty());
}

#[tokio::test]
async fn panicking_decoder_still_finishes_the_lookup() {
    let mut h = Harness::new();
    let host = h.scanner.add_host(Host::new("FILESERVER", "OFFICE"));
    h.decoder.panic_on(LookupKind::HostInfo, &host);
    h.events();

    assert_eq!(h.scanner.lookup_info(&host).await, Dispatch::Started);
    let waited = timeout(Duration::from_secs(1), h.scanner.run_until_idle()).await;
    assert!(waited.is_ok());

    assert!(h.scanner.registry().is_empty());
    assert!(!h.scanner.is_busy());
    let outcome = h.events().into_iter().find_map(|event| match event {
        ScanEvent::Finished { outcome, .. } => Some(outcome),
        _ => None,
    });
    assert!(matches!(
        outcome,
        Some(TaskOutcome::Failed(LookupFailure::Other(_)))
    ));
}

#[tokio::test]
async fn missing_tool_creates_no_task() {
    let mut h = Harness::new();
    let host = h.scanner.add_host(Host::new("FILESERVER", "OFFICE"));
    h.builder.tool_missing_for(LookupKind::Shares);
    h.events();

    assert_eq!(h.scanner.lookup_shares(&host).await, Dispatch::ToolNotFound);
    // The slot was released, so the next request is tried again.
    assert_eq!(h.scanner.lookup_shares(&host).await, Dispatch::ToolNotFound);

    assert!(h.scanner.registry().is_empty());
    assert_eq!(h.runner.calls(), 0);
    let events = h.events();
    assert_eq!(
        events,
        [
            ScanEvent::ToolNotFound {
                kind: LookupKind::Shares,
                tool: String::from("smbclient"),
            },
            ScanEvent::ToolNotFound {
                kind: LookupKind::Shares,
                tool: String::from("smbclient"),
            },
        ]
    );
}

#[tokio::test]
async fn unknown_targets_are_refused() {
    let mut h = Harness::new();

    let ghost = ItemKey::host("OFFICE", "GHOST");
    assert_eq!(h.scanner.lookup_shares(&ghost).await, Dispatch::UnknownTarget);
    assert_eq!(h.scanner.lookup_info(&ghost).await, Dispatch::UnknownTarget);
    assert_eq!(
        h.scanner
            .lookup_domain_members(&ItemKey::workgroup("NOWHERE"))
            .await,
        Dispatch::UnknownTarget
    );
    assert!(h.scanner.registry().is_empty());
    assert!(h.events().is_empty());
}

#[tokio::test]
async fn host_info_is_fetched_once() {
    let mut h = Harness::new();
    let host = h.scanner.add_host(Host::new("FILESERVER", "OFFICE"));
    let info = HostInfo {
        server_string: String::from("Samba 4.19"),
        os_string: String::from("Windows 6.1"),
    };
    h.decoder.answer(
        LookupKind::HostInfo,
        &host,
        Ok(LookupResult::HostInfo(info.clone())),
    );

    assert_eq!(h.scanner.lookup_info(&host).await, Dispatch::Started);
    h.scanner.run_until_idle().await;
    assert_eq!(h.scanner.lookup_info(&host).await, Dispatch::Cached);

    let stored = h.scanner.model().find_host(&host).unwrap();
    assert!(stored.info_resolved);
    assert_eq!(stored.info.as_ref(), Some(&info));
    assert_eq!(h.runner.calls(), 1);
}

#[tokio::test]
async fn members_without_master_come_from_the_model() {
    let mut h = Harness::new();
    h.decoder.answer(
        LookupKind::Domains,
        &ItemKey::wildcard(),
        Ok(LookupResult::Workgroups(vec![Workgroup::new("HOME")])),
    );
    h.scanner.lookup_domains().await;
    h.scanner.run_until_idle().await;
    h.events();

    let home = ItemKey::workgroup("HOME");
    assert_eq!(h.scanner.lookup_domain_members(&home).await, Dispatch::FromModel);

    assert!(h.scanner.registry().is_empty());
    assert_eq!(
        h.events(),
        [ScanEvent::ModelChanged {
            kind: LookupKind::DomainMembers,
            target: home,
        }]
    );
    assert_eq!(h.runner.calls(), 1);
}

#[tokio::test]
async fn run_state_brackets_the_lookups() {
    let mut h = Harness::new();

    h.scanner.lookup_domains().await;
    assert!(h.scanner.is_busy());
    h.scanner.run_until_idle().await;
    assert!(!h.scanner.is_busy());

    let key = TaskKey::new(LookupKind::Domains, ItemKey::wildcard());
    assert_eq!(
        h.events(),
        [
            ScanEvent::AboutToStart { key: key.clone() },
            ScanEvent::RunStateChanged { busy: true },
            ScanEvent::ModelChanged {
                kind: LookupKind::Domains,
                target: ItemKey::wildcard(),
            },
            ScanEvent::Finished {
                key,
                outcome: TaskOutcome::Completed,
            },
            ScanEvent::RunStateChanged { busy: false },
        ]
    );
}

#[tokio::test]
async fn nothing_to_process_when_idle() {
    let mut h = Harness::new();
    assert_eq!(h.scanner.process_next().await, None);
}

#[tokio::test]
async fn shutdown_stops_everything() {
    let mut h = Harness::new();
    let host = h.scanner.add_host(Host::new("FILESERVER", "OFFICE"));
    h.runner.hold(true);
    h.scanner.lookup_shares(&host).await;
    h.events();

    h.scanner.shutdown().await;

    assert!(h.scanner.registry().is_empty());
    assert!(h.scanner.model().is_empty());
    assert!(!h.scanner.is_busy());
    assert_eq!(h.scanner.lookup_domains().await, Dispatch::ShuttingDown);

    let events = h.events();
    assert!(events.contains(&ScanEvent::Finished {
        key: TaskKey::new(LookupKind::Shares, host),
        outcome: TaskOutcome::Aborted,
    }));
    assert_eq!(events.last(), Some(&ScanEvent::RunStateChanged { busy: false }));
}
