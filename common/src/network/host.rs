use std::net::IpAddr;

use super::key::ItemKey;

/// Server and operating system strings a host reports about itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostInfo {
    pub server_string: String,
    pub os_string: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Host {
    pub name: String,
    pub workgroup_name: String,
    pub comment: Option<String>,
    pub ip: Option<IpAddr>,
    pub ip_resolved: bool,
    pub info: Option<HostInfo>,
    pub info_resolved: bool,
    pub is_master_browser: bool,
    /// Overrides the globally configured SMB port for this host.
    pub port: Option<u16>,
}

impl Host {
    pub fn new(name: impl Into<String>, workgroup_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            workgroup_name: workgroup_name.into(),
            ..Default::default()
        }
    }

    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.set_ip(ip);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn as_master_browser(mut self) -> Self {
        self.is_master_browser = true;
        self
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::host(&self.workgroup_name, &self.name)
    }

    pub fn set_ip(&mut self, ip: IpAddr) {
        self.ip = Some(ip);
        self.ip_resolved = true;
    }

    pub fn set_info(&mut self, info: HostInfo) {
        self.info = Some(info);
        self.info_resolved = true;
    }

    pub fn belongs_to(&self, workgroup: &str) -> bool {
        self.workgroup_name.eq_ignore_ascii_case(workgroup)
    }
}
