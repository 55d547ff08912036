use std::collections::HashMap;
use std::sync::Mutex;
use std::thread;

use async_trait::async_trait;
use console::Term;
use smbrowse_common::credentials::{CredentialStore, Credentials};
use smbrowse_common::network::{ItemKey, NetworkItem};
use tokio::sync::oneshot;
use tracing::warn;

use crate::terminal::spinner;

const USER_ENV: &str = "SMBROWSE_USER";
const PASSWORD_ENV: &str = "SMBROWSE_PASSWORD";

/// Credentials given on the command line, plus whatever the user typed in
/// for a particular host during this run.
pub struct TerminalCredentials {
    default: Option<Credentials>,
    entered: Mutex<HashMap<ItemKey, Credentials>>,
    interactive: bool,
}

impl TerminalCredentials {
    pub fn new(user: Option<String>) -> Self {
        let user = user.or_else(|| std::env::var(USER_ENV).ok());
        let default = user.map(|user| {
            let password = std::env::var(PASSWORD_ENV).unwrap_or_default();
            Credentials::new(user, password)
        });

        Self {
            default,
            entered: Mutex::default(),
            interactive: console::user_attended_stderr(),
        }
    }

    fn entered(&self, key: &ItemKey) -> Option<Credentials> {
        let entered = self.entered.lock().ok()?;
        entered.get(key).cloned()
    }
}

#[async_trait]
impl CredentialStore for TerminalCredentials {
    async fn read(&self, target: &NetworkItem) -> Option<Credentials> {
        self.entered(&target.key()).or_else(|| self.default.clone())
    }

    async fn prompt(&self, target: &NetworkItem) -> Option<Credentials> {
        if !self.interactive {
            return None;
        }

        let name = target.display_name().to_string();
        let suggested = self
            .read(target)
            .await
            .map(|c| c.user)
            .unwrap_or_default();

        // Runtime shutdown waits for the blocking pool, never for this thread.
        let (answer_tx, answer_rx) = oneshot::channel();
        let spawned = thread::Builder::new()
            .name(String::from("credential-prompt"))
            .spawn(move || {
                let answer = spinner::get_spinner().suspend(|| ask(&name, &suggested));
                let _ = answer_tx.send(answer);
            });
        if let Err(e) = spawned {
            warn!("Credential prompt failed: {e}");
            return None;
        }

        let credentials = match answer_rx.await {
            Ok(Ok(Some(credentials))) => credentials,
            Ok(Ok(None)) => return None,
            Ok(Err(e)) => {
                warn!("Could not read credentials: {e}");
                return None;
            }
            Err(_) => {
                warn!("Credential prompt ended without an answer");
                return None;
            }
        };

        if let Ok(mut entered) = self.entered.lock() {
            entered.insert(target.key(), credentials.clone());
        }
        Some(credentials)
    }
}

/// Asks for user and password on stderr. An empty user name declines.
fn ask(target: &str, suggested: &str) -> std::io::Result<Option<Credentials>> {
    let term = Term::stderr();

    term.write_line(&format!("Authentication required for {target}"))?;
    if suggested.is_empty() {
        term.write_str("User (empty to skip): ")?;
    } else {
        term.write_str(&format!("User [{suggested}] (- to skip): "))?;
    }

    let user = term.read_line()?;
    let user = match user.trim() {
        "" if suggested.is_empty() => return Ok(None),
        "" => suggested.to_string(),
        "-" => return Ok(None),
        user => user.to_string(),
    };

    term.write_str("Password: ")?;
    let password = term.read_secure_line()?;

    let (workgroup, user) = match user.split_once('\\') {
        Some((workgroup, user)) => (Some(workgroup.to_string()), user.to_string()),
        None => (None, user),
    };

    Ok(Some(Credentials {
        user,
        password,
        workgroup,
    }))
}
