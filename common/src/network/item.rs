use std::fmt;

use super::{Host, ItemKey, Share, Workgroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkItemKind {
    Workgroup,
    Host,
    Share,
}

impl fmt::Display for NetworkItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkItemKind::Workgroup => f.write_str("workgroup"),
            NetworkItemKind::Host => f.write_str("host"),
            NetworkItemKind::Share => f.write_str("share"),
        }
    }
}

/// Any item of the network model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkItem {
    Workgroup(Workgroup),
    Host(Host),
    Share(Share),
}

impl NetworkItem {
    pub fn kind(&self) -> NetworkItemKind {
        match self {
            NetworkItem::Workgroup(_) => NetworkItemKind::Workgroup,
            NetworkItem::Host(_) => NetworkItemKind::Host,
            NetworkItem::Share(_) => NetworkItemKind::Share,
        }
    }

    pub fn key(&self) -> ItemKey {
        match self {
            NetworkItem::Workgroup(workgroup) => workgroup.key(),
            NetworkItem::Host(host) => host.key(),
            NetworkItem::Share(share) => share.key(),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            NetworkItem::Workgroup(workgroup) => workgroup.name.clone(),
            NetworkItem::Host(host) => host.name.clone(),
            NetworkItem::Share(share) => share.unc(),
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            NetworkItem::Workgroup(_) => None,
            NetworkItem::Host(host) => host.comment.as_deref(),
            NetworkItem::Share(share) => share.comment.as_deref(),
        }
    }
}

impl From<Workgroup> for NetworkItem {
    fn from(workgroup: Workgroup) -> Self {
        NetworkItem::Workgroup(workgroup)
    }
}

impl From<Host> for NetworkItem {
    fn from(host: Host) -> Self {
        NetworkItem::Host(host)
    }
}

impl From<Share> for NetworkItem {
    fn from(share: Share) -> Self {
        NetworkItem::Share(share)
    }
}
