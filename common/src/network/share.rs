use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

use super::key::ItemKey;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShareType {
    #[default]
    Disk,
    Printer,
    Ipc,
    /// Anything else a server reports, kept verbatim.
    Other(String),
}

impl ShareType {
    pub fn parse(type_string: &str) -> Self {
        match type_string.to_ascii_lowercase().as_str() {
            "disk" => ShareType::Disk,
            "printer" | "print" => ShareType::Printer,
            "ipc" => ShareType::Ipc,
            _ => ShareType::Other(type_string.to_string()),
        }
    }
}

impl fmt::Display for ShareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareType::Disk => f.write_str("Disk"),
            ShareType::Printer => f.write_str("Printer"),
            ShareType::Ipc => f.write_str("IPC"),
            ShareType::Other(raw) => f.write_str(raw),
        }
    }
}

/// Disk usage of a mounted share, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

/// State owned by the mounting subsystem. A share carrying it is mounted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MountState {
    pub path: PathBuf,
    pub filesystem: String,
    pub uid: u32,
    pub gid: u32,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Share {
    pub share_name: String,
    pub host_name: String,
    pub workgroup_name: String,
    pub share_type: ShareType,
    pub comment: Option<String>,
    pub host_ip: Option<IpAddr>,
    pub mount: Option<MountState>,
}

impl Share {
    pub fn new(share_name: impl Into<String>, share_type: ShareType) -> Self {
        Self {
            share_name: share_name.into(),
            share_type,
            ..Default::default()
        }
    }

    /// Fills in the host the share was listed on.
    pub fn on_host(mut self, host_name: impl Into<String>, workgroup_name: impl Into<String>) -> Self {
        self.host_name = host_name.into();
        self.workgroup_name = workgroup_name.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::share(&self.workgroup_name, &self.host_name, &self.share_name)
    }

    pub fn host_key(&self) -> ItemKey {
        ItemKey::host(&self.workgroup_name, &self.host_name)
    }

    /// UNC-like path, `//HOST/SHARE`.
    pub fn unc(&self) -> String {
        format!("//{}/{}", self.host_name, self.share_name)
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    /// Administrative shares end in `$` and are hidden by Windows browsers.
    pub fn is_hidden(&self) -> bool {
        self.share_name.ends_with('$')
    }

    pub fn is_printer(&self) -> bool {
        self.share_type == ShareType::Printer
    }

    pub fn is_ipc(&self) -> bool {
        self.share_type == ShareType::Ipc
    }
}
