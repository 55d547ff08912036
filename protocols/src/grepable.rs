//! Decoder for `smbclient` output.
//!
//! With `-g` every listed item is one `TYPE|NAME|COMMENT` record:
//!
//! ```text
//! Disk|Data|Department data
//! IPC|IPC$|IPC Service (Samba 4.19)
//! Server|FILESERVER|Samba 4.19
//! Workgroup|OFFICE|FILESERVER
//! ```
//!
//! Anything else on the streams is diagnostics. `NT_STATUS_*` codes in there
//! decide whether a failed run was an authentication problem.

use smbrowse_common::lookup::{LookupFailure, LookupOperation, LookupResult};
use smbrowse_common::network::{Host, HostInfo, Share, ShareType, Workgroup};
use smbrowse_common::tools::{ProcessOutput, ResultDecoder};
use tracing::debug;

const AUTH_FAILURES: &[&str] = &[
    "NT_STATUS_ACCESS_DENIED",
    "NT_STATUS_LOGON_FAILURE",
    "NT_STATUS_WRONG_PASSWORD",
    "NT_STATUS_ACCOUNT_DISABLED",
    "NT_STATUS_ACCOUNT_LOCKED_OUT",
    "NT_STATUS_ACCOUNT_RESTRICTION",
    "NT_STATUS_PASSWORD_EXPIRED",
    "NT_STATUS_PASSWORD_MUST_CHANGE",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Record<'a> {
    Workgroup { name: &'a str, master: &'a str },
    Server { name: &'a str, comment: &'a str },
    Share { kind: &'a str, name: &'a str, comment: &'a str },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SambaDecoder;

impl ResultDecoder for SambaDecoder {
    fn decode(
        &self,
        operation: &LookupOperation,
        output: &ProcessOutput,
    ) -> Result<LookupResult, LookupFailure> {
        let records: Vec<Record> = output.stdout.lines().filter_map(parse_record).collect();
        debug!("Decoded {} records", records.len());

        match operation {
            LookupOperation::EnumerateDomains => {
                check_listing(output, &records)?;
                Ok(LookupResult::Workgroups(workgroups(&records)))
            }
            LookupOperation::EnumerateDomainMembers { workgroup, .. } => {
                check_listing(output, &records)?;
                Ok(LookupResult::Hosts(members(&records, workgroup)))
            }
            LookupOperation::EnumerateShares(_) => {
                check_listing(output, &records)?;
                Ok(LookupResult::Shares(shares(&records)))
            }
            LookupOperation::FetchHostInfo(_) => {
                let banner = output.stdout.lines().chain(output.stderr.lines()).find_map(parse_banner);
                match banner {
                    Some(info) => Ok(LookupResult::HostInfo(info)),
                    None => Err(classify(output)
                        .unwrap_or_else(|| LookupFailure::Other(String::from("no server information")))),
                }
            }
        }
    }
}

/// A listing is accepted when the tool succeeded or printed records anyway.
fn check_listing(output: &ProcessOutput, records: &[Record]) -> Result<(), LookupFailure> {
    if !records.is_empty() {
        return Ok(());
    }
    match classify(output) {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}

/// Failure described by the output, if the run failed.
fn classify(output: &ProcessOutput) -> Option<LookupFailure> {
    let text = || output.stdout.lines().chain(output.stderr.lines());

    if let Some(code) = text().find_map(auth_status) {
        return Some(LookupFailure::Auth(code.to_string()));
    }
    if output.success() {
        return None;
    }

    let reason = text()
        .map(str::trim)
        .find(|line| line.contains("NT_STATUS_"))
        .or_else(|| text().map(str::trim).find(|line| !line.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| match output.exit_code {
            Some(code) => format!("smbclient exited with status {code}"),
            None => String::from("smbclient was killed"),
        });
    Some(LookupFailure::Other(reason))
}

fn auth_status(line: &str) -> Option<&'static str> {
    AUTH_FAILURES.iter().copied().find(|code| line.contains(code))
}

fn parse_record(line: &str) -> Option<Record<'_>> {
    let mut fields = line.trim_end_matches(['\r', '\n']).splitn(3, '|');
    let kind = fields.next()?;
    let name = fields.next()?.trim();
    let rest = fields.next()?.trim();

    if name.is_empty() {
        return None;
    }

    let record = match kind {
        "Workgroup" => Record::Workgroup { name, master: rest },
        "Server" => Record::Server { name, comment: rest },
        _ => Record::Share {
            kind,
            name,
            comment: rest,
        },
    };
    Some(record)
}

fn workgroups(records: &[Record]) -> Vec<Workgroup> {
    records
        .iter()
        .filter_map(|record| match record {
            Record::Workgroup { name, master } => Some(Workgroup::new(*name).with_master(*master)),
            _ => None,
        })
        .collect()
}

/// Servers of `workgroup`. The one the workgroup records name as master is
/// flagged as such.
fn members(records: &[Record], workgroup: &Workgroup) -> Vec<Host> {
    let master = records.iter().find_map(|record| match record {
        Record::Workgroup { name, master } if name.eq_ignore_ascii_case(&workgroup.name) => {
            Some(*master)
        }
        _ => None,
    });

    records
        .iter()
        .filter_map(|record| match record {
            Record::Server { name, comment } => {
                let mut host = Host::new(*name, workgroup.name.as_str());
                if !comment.is_empty() {
                    host.comment = Some(comment.to_string());
                }
                host.is_master_browser = master.is_some_and(|m| m.eq_ignore_ascii_case(name));
                Some(host)
            }
            _ => None,
        })
        .collect()
}

fn shares(records: &[Record]) -> Vec<Share> {
    records
        .iter()
        .filter_map(|record| match record {
            Record::Share {
                kind,
                name,
                comment,
            } => {
                let mut share = Share::new(*name, ShareType::parse(kind));
                if !comment.is_empty() {
                    share.comment = Some(comment.to_string());
                }
                Some(share)
            }
            _ => None,
        })
        .collect()
}

/// `Domain=[OFFICE] OS=[Windows 6.1] Server=[Windows Server 2008 R2]`
fn parse_banner(line: &str) -> Option<HostInfo> {
    let os_string = bracketed(line, "OS=[")?;
    let server_string = bracketed(line, "Server=[").unwrap_or_default();
    Some(HostInfo {
        server_string: server_string.to_string(),
        os_string: os_string.to_string(),
    })
}

fn bracketed<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let start = line.find(tag)? + tag.len();
    let len = line[start..].find(']')?;
    Some(&line[start..start + len])
}
