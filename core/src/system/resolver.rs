use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use smbrowse_common::network::Host;
use smbrowse_common::resolver::AddressResolver;
use tracing::debug;

const SMB_PORT: u16 = 445;

/// Resolves host names through the operating system resolver. Prefers IPv4.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl AddressResolver for SystemResolver {
    fn resolve(&self, host: &Host) -> Option<IpAddr> {
        let addrs: Vec<SocketAddr> = match (host.name.as_str(), SMB_PORT).to_socket_addrs() {
            Ok(addrs) => addrs.collect(),
            Err(err) => {
                debug!("Resolving {} failed: {err}", host.name);
                return None;
            }
        };

        addrs
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| addrs.first())
            .map(SocketAddr::ip)
    }
}
