use std::path::PathBuf;

use smbrowse_common::config::Config;
use smbrowse_common::credentials::Credentials;
use smbrowse_common::lookup::LookupOperation;
use smbrowse_common::network::Host;
use smbrowse_common::tools::{CommandBuilder, CommandLine, ToolNotFound};

const SMBCLIENT: &str = "smbclient";

/// Environment variable `smbclient` reads the password from. Keeps it off the
/// process list.
const PASSWORD_ENV: &str = "PASSWD";

/// Builds `smbclient -L` invocations.
#[derive(Debug, Clone)]
pub struct SambaCommandBuilder {
    smbclient: String,
}

impl Default for SambaCommandBuilder {
    fn default() -> Self {
        Self {
            smbclient: String::from(SMBCLIENT),
        }
    }
}

impl SambaCommandBuilder {
    /// Uses `program` instead of searching `smbclient` on `PATH`. Absolute
    /// paths are used as is.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            smbclient: program.into(),
        }
    }

    fn locate(&self) -> Result<PathBuf, ToolNotFound> {
        which::which(&self.smbclient).map_err(|_| ToolNotFound::new(&self.smbclient))
    }
}

impl CommandBuilder for SambaCommandBuilder {
    fn build(
        &self,
        operation: &LookupOperation,
        credentials: Option<&Credentials>,
        cfg: &Config,
    ) -> Result<CommandLine, ToolNotFound> {
        let command = CommandLine::new(self.locate()?);

        let command = match operation {
            LookupOperation::EnumerateDomains => {
                let command = command.args(["-g", "-N", "-L", cfg.browse_host.as_str()]);
                with_port(command, cfg.smb_port)
            }
            LookupOperation::EnumerateDomainMembers { workgroup, master } => {
                let command = list(command.arg("-g"), master, cfg).args(["-W", workgroup.name.as_str()]);
                with_credentials(command, credentials)
            }
            LookupOperation::EnumerateShares(host) => {
                let command = list(command.arg("-g"), host, cfg)
                    .args(["-W", host.workgroup_name.as_str()]);
                with_credentials(command, credentials)
            }
            // The server banner is only printed in the human readable format.
            LookupOperation::FetchHostInfo(host) => list(command, host, cfg)
                .args(["-W", host.workgroup_name.as_str(), "-N", "-d", "1"]),
        };

        Ok(command)
    }
}

/// `-L NAME [-I IP] [-p PORT]`
fn list(command: CommandLine, host: &Host, cfg: &Config) -> CommandLine {
    let mut command = command.args(["-L", host.name.as_str()]);
    if let Some(ip) = host.ip {
        command = command.args(["-I".to_string(), ip.to_string()]);
    }
    with_port(command, host.port.or(cfg.smb_port))
}

fn with_port(command: CommandLine, port: Option<u16>) -> CommandLine {
    match port {
        Some(port) => command.args(["-p".to_string(), port.to_string()]),
        None => command,
    }
}

fn with_credentials(command: CommandLine, credentials: Option<&Credentials>) -> CommandLine {
    let Some(credentials) = credentials.filter(|c| !c.is_guest()) else {
        return command.arg("-N");
    };

    let mut command = command
        .args(["-U", credentials.user.as_str()])
        .env(PASSWORD_ENV, credentials.password.as_str());
    if let Some(workgroup) = &credentials.workgroup {
        command = command.args(["-W", workgroup.as_str()]);
    }
    command
}
