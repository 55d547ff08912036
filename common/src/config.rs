use std::time::Duration;

/// Global discovery settings handed to the command builder and the scanner.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host asked for the browse list when enumerating domains.
    pub browse_host: String,
    /// SMB port used unless a host overrides it.
    pub smb_port: Option<u16>,
    /// Upper bound for a single external tool run.
    pub timeout: Option<Duration>,
    /// Keeps shares whose name ends in `$`.
    pub show_hidden_shares: bool,
    pub show_printer_shares: bool,
    pub show_ipc_shares: bool,
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browse_host: String::from("localhost"),
            smb_port: None,
            timeout: Some(Duration::from_secs(30)),
            show_hidden_shares: false,
            show_printer_shares: true,
            show_ipc_shares: false,
            quiet: 0,
        }
    }
}
