use std::fmt;

use async_trait::async_trait;

use crate::network::NetworkItem;

#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub workgroup: Option<String>,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            workgroup: None,
        }
    }

    /// Anonymous access, i.e. no user name.
    pub fn is_guest(&self) -> bool {
        self.user.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("workgroup", &self.workgroup)
            .finish()
    }
}

/// Where login data for hosts and shares comes from.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stored credentials for `target`, if any.
    async fn read(&self, target: &NetworkItem) -> Option<Credentials>;

    /// Asks the user for credentials for `target`. `None` means the user
    /// cancelled.
    async fn prompt(&self, target: &NetworkItem) -> Option<Credentials>;
}
