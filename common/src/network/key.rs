use std::fmt;

/// Case-insensitive identity of a network item within its kind.
///
/// SMB names are case-insensitive, so every key is folded to lowercase on
/// construction and compared byte-wise afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(String);

impl ItemKey {
    /// Key used by lookups that have no target item (domain enumeration).
    pub fn wildcard() -> Self {
        Self(String::from("*"))
    }

    pub fn workgroup(name: &str) -> Self {
        Self(name.to_lowercase())
    }

    pub fn host(workgroup: &str, name: &str) -> Self {
        Self(format!("{}\\{}", workgroup.to_lowercase(), name.to_lowercase()))
    }

    pub fn share(workgroup: &str, host: &str, share: &str) -> Self {
        Self(format!(
            "{}\\//{}/{}",
            workgroup.to_lowercase(),
            host.to_lowercase(),
            share.to_lowercase()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
