use std::net::IpAddr;

use super::key::ItemKey;

/// An SMB workgroup or domain as announced by a browse list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Workgroup {
    pub name: String,
    /// Empty when the master browser is unknown.
    pub master_browser_name: String,
    pub master_browser_ip: Option<IpAddr>,
    /// Set when the master browser was inferred instead of reported by a
    /// browse query. Informational only.
    pub is_pseudo_master: bool,
}

impl Workgroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_master(mut self, master: impl Into<String>) -> Self {
        self.master_browser_name = master.into();
        self
    }

    pub fn with_master_ip(mut self, ip: IpAddr) -> Self {
        self.master_browser_ip = Some(ip);
        self
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::workgroup(&self.name)
    }

    pub fn has_master(&self) -> bool {
        !self.master_browser_name.is_empty()
    }

    pub fn is_master(&self, host_name: &str) -> bool {
        self.has_master() && self.master_browser_name.eq_ignore_ascii_case(host_name)
    }

    /// Key of the master browser host, if one is known.
    pub fn master_key(&self) -> Option<ItemKey> {
        self.has_master()
            .then(|| ItemKey::host(&self.name, &self.master_browser_name))
    }
}
