use std::time::Duration;

use colored::*;
use smbrowse_common::network::{Host, Share, Workgroup};
use smbrowse_core::NetworkModel;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "smbrowse::print";

pub fn print(msg: &str) {
    info!(target: "smbrowse::print", raw_msg = msg);
}

pub fn banner(q_level: u8) {
    if q_level > 0 {
        return;
    }

    let text_content = format!("⟦ SMBROWSE v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    let text_width = UnicodeWidthStr::width(text_content.as_str());
    let text = text_content.bright_green().bold();
    let sep = "═".repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2).bright_black();

    print(&format!("{sep}{text}{sep}"));
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let formatted = format!("⟦ {msg} ⟧");
    let dash_count = TOTAL_WIDTH.saturating_sub(UnicodeWidthStr::width(formatted.as_str()));
    let left = dash_count / 2;
    let right = dash_count - left;

    let line = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&line.to_string());
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix = ">".color(colors::SEPARATOR);
    print(&format!("{} {}", prefix, msg.as_ref().color(colors::TEXT_DEFAULT)));
}

/// `[idx] NAME` followed by the workgroup's master browser.
pub fn workgroup_head(idx: usize, workgroup: &Workgroup) {
    let idx_str = format!("[{}]", idx.to_string().color(colors::ACCENT));
    let mut output = format!(
        "{} {}",
        idx_str.color(colors::SEPARATOR),
        workgroup.name.color(colors::PRIMARY).bold()
    );

    if workgroup.has_master() {
        let mut master = format!("master {}", workgroup.master_browser_name);
        if let Some(ip) = workgroup.master_browser_ip {
            master.push_str(&format!(" {ip}"));
        }
        if workgroup.is_pseudo_master {
            master.push_str(", assumed");
        }
        output.push_str(&format!(" {}", format!("({master})").color(colors::SEPARATOR)));
    }
    print(&output);
}

fn branch(last: bool) -> ColoredString {
    if last { "└─".bright_black() } else { "├─".bright_black() }
}

fn indent(last: bool) -> ColoredString {
    if last { "   ".normal() } else { "│  ".bright_black() }
}

fn host_line(host: &Host) -> String {
    let mut line = host.name.color(colors::TEXT_DEFAULT).bold().to_string();
    if let Some(ip) = host.ip {
        line.push_str(&format!(" {}", ip.to_string().color(colors::ADDRESS)));
    }
    if host.is_master_browser {
        line.push_str(&format!(" {}", "master".color(colors::MASTER)));
    }
    if let Some(comment) = host.comment.as_deref().filter(|c| !c.is_empty()) {
        line.push_str(&format!(" {}", comment.italic().color(colors::SEPARATOR)));
    }
    line
}

fn share_line(share: &Share, name_width: usize) -> String {
    let name = format!("{:<name_width$}", share.share_name);
    let mut line = format!(
        "{} {:<8}",
        name.color(colors::TEXT_DEFAULT),
        share.share_type.to_string().color(colors::ACCENT)
    );
    if let Some(comment) = share.comment.as_deref().filter(|c| !c.is_empty()) {
        line.push_str(&format!(" {}", comment.italic().color(colors::SEPARATOR)));
    }
    if let Some(mount) = &share.mount {
        line.push_str(&format!(
            " {}",
            format!("mounted on {}", mount.path.display()).color(colors::MOUNTED)
        ));
    }
    line
}

/// Shares of `host`, one per line, under `prefix`.
fn shares_tree(model: &NetworkModel, host: &Host, prefix: &str) {
    let key = host.key();
    let shares: Vec<&Share> = model.shares_of(&key).collect();
    let name_width = shares
        .iter()
        .map(|s| UnicodeWidthStr::width(s.share_name.as_str()))
        .max()
        .unwrap_or(0);

    for (i, share) in shares.iter().enumerate() {
        let last = i + 1 == shares.len();
        print(&format!("{prefix}{} {}", branch(last), share_line(share, name_width)));
    }
}

fn info_line(host: &Host, prefix: &str) {
    if let Some(info) = &host.info {
        print(&format!(
            "{prefix}{} {}",
            "⋯".bright_black(),
            format!("{} / {}", info.os_string, info.server_string).color(colors::SEPARATOR)
        ));
    }
}

/// The whole model: workgroups, their hosts and the hosts' shares.
pub fn network_tree(model: &NetworkModel) {
    for (idx, workgroup) in model.workgroups().enumerate() {
        workgroup_head(idx + 1, workgroup);
        let members: Vec<&Host> = model.members(&workgroup.name).collect();
        for (i, host) in members.iter().enumerate() {
            let last = i + 1 == members.len();
            print(&format!(" {} {}", branch(last), host_line(host)));
            let prefix = format!(" {}  ", indent(last));
            info_line(host, &prefix);
            shares_tree(model, host, &prefix);
        }
    }
}

pub fn workgroups(model: &NetworkModel) {
    for (idx, workgroup) in model.workgroups().enumerate() {
        workgroup_head(idx + 1, workgroup);
    }
}

pub fn members(model: &NetworkModel, workgroup: &Workgroup) {
    workgroup_head(1, workgroup);
    let members: Vec<&Host> = model.members(&workgroup.name).collect();
    for (i, host) in members.iter().enumerate() {
        print(&format!(" {} {}", branch(i + 1 == members.len()), host_line(host)));
    }
}

pub fn shares(model: &NetworkModel, host: &Host) {
    print(&host_line(host));
    shares_tree(model, host, " ");
}

pub fn host_info(host: &Host) {
    print(&host_line(host));
    match &host.info {
        Some(info) => {
            aligned(" OS", &info.os_string);
            aligned(" Server", &info.server_string);
        }
        None => aligned(" Info", "not available"),
    }
}

fn aligned(key: &str, value: &str) {
    let dots = ".".repeat(8usize.saturating_sub(key.len()));
    print(&format!(
        "{}{}{} {}",
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value.color(colors::TEXT_DEFAULT)
    ));
}

pub fn no_results(what: &str) {
    print(&format!("{}", format!("No {what} found.").red().bold()));
}

pub fn summary(model: &NetworkModel, elapsed: Duration, q_level: u8) {
    if q_level > 1 {
        return;
    }
    print_status(format!(
        "{} workgroups, {} hosts, {} shares in {:.2}s",
        model.workgroups().count().to_string().green().bold(),
        model.hosts().count().to_string().green().bold(),
        model.shares().count().to_string().green().bold(),
        elapsed.as_secs_f64()
    ));
}

pub fn end_of_program() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}
