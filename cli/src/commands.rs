pub mod browse;
pub mod lookup;
pub mod session;

use std::net::IpAddr;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use smbrowse_common::config::Config;

#[derive(Parser)]
#[command(name = "smbrowse")]
#[command(about = "Browse the workgroups, hosts and shares of an SMB network.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub options: GlobalOptions,
}

#[derive(Args)]
pub struct GlobalOptions {
    /// Host that is asked for the list of workgroups
    #[arg(short = 'B', long, global = true, default_value = "localhost")]
    pub browse_host: String,

    /// SMB port, unless smbclient's default should be used
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Seconds a single lookup may take (0 disables the limit)
    #[arg(short, long, global = true, default_value_t = 30)]
    pub timeout: u64,

    /// User name, defaults to SMBROWSE_USER. The password is read from
    /// SMBROWSE_PASSWORD or asked for
    #[arg(short = 'U', long, global = true)]
    pub user: Option<String>,

    /// Show shares whose name ends in '$'
    #[arg(long, global = true)]
    pub hidden: bool,

    /// Show the IPC$ share
    #[arg(long, global = true)]
    pub ipc: bool,

    /// Hide printer shares
    #[arg(long, global = true)]
    pub no_printers: bool,

    /// Less output; repeat for even less
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// More log output; repeat for even more
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the workgroups and domains of the network
    #[command(alias = "d")]
    Domains,
    /// List the hosts of a workgroup
    #[command(alias = "m")]
    Members { workgroup: String },
    /// List the shares of a host
    #[command(alias = "s")]
    Shares {
        host: String,
        #[command(flatten)]
        target: HostTarget,
    },
    /// Show the server and operating system of a host
    #[command(alias = "i")]
    Info {
        host: String,
        #[command(flatten)]
        target: HostTarget,
    },
    /// Walk the whole network
    #[command(alias = "b")]
    Browse {
        /// Scan again every SECONDS until interrupted
        #[arg(short, long, value_name = "SECONDS")]
        watch: Option<u64>,
        /// Also fetch server information of every host
        #[arg(short, long)]
        info: bool,
    },
}

/// How to reach a host that is not necessarily announced by a browse list.
#[derive(Args)]
pub struct HostTarget {
    /// Workgroup the host belongs to
    #[arg(short = 'W', long, default_value = "WORKGROUP")]
    pub workgroup: String,
    /// Address of the host, skipping name resolution
    #[arg(short = 'I', long)]
    pub ip: Option<IpAddr>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        let options = &self.options;
        Config {
            browse_host: options.browse_host.clone(),
            smb_port: options.port,
            timeout: (options.timeout > 0).then(|| Duration::from_secs(options.timeout)),
            show_hidden_shares: options.hidden,
            show_printer_shares: !options.no_printers,
            show_ipc_shares: options.ipc,
            quiet: options.quiet,
        }
    }
}
