use std::time::{Duration, Instant};

use smbrowse_common::network::ItemKey;
use tokio::signal;
use tracing::info;

use crate::commands::session::{Session, check};
use crate::terminal::print;

pub async fn browse(session: &mut Session, watch: Option<u64>, with_info: bool) -> anyhow::Result<()> {
    let mut pass = 1;
    loop {
        let start_time = Instant::now();
        let completed = walk(session, with_info).await?;

        let model = session.scanner.model();
        let quiet = session.scanner.config().quiet;
        print::header(&format!("network, pass {pass}"), quiet);
        if model.is_empty() {
            print::no_results("workgroups");
        } else {
            print::network_tree(model);
        }
        print::summary(model, start_time.elapsed(), quiet);

        let Some(seconds) = watch.filter(|_| completed) else {
            return Ok(());
        };

        info!("Next scan in {seconds}s, Ctrl-C to stop");
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(seconds)) => {}
            _ = signal::ctrl_c() => return Ok(()),
        }
        pass += 1;
    }
}

/// One full pass: workgroups, then their members, then every host's shares.
/// Returns false if interrupted.
async fn walk(session: &mut Session, with_info: bool) -> anyhow::Result<bool> {
    let browse_host = session.scanner.config().browse_host.clone();
    check(session.scanner.lookup_domains().await, &browse_host)?;
    if !session.settle().await {
        return Ok(false);
    }

    let workgroups: Vec<ItemKey> = session.scanner.model().workgroups().map(|w| w.key()).collect();
    for workgroup in &workgroups {
        check(
            session.scanner.lookup_domain_members(workgroup).await,
            workgroup.as_str(),
        )?;
    }
    if !session.settle().await {
        return Ok(false);
    }

    let hosts: Vec<ItemKey> = session.scanner.model().hosts().map(|h| h.key()).collect();
    for host in &hosts {
        check(session.scanner.lookup_shares(host).await, host.as_str())?;
        if with_info {
            check(session.scanner.lookup_info(host).await, host.as_str())?;
        }
    }
    Ok(session.settle().await)
}
