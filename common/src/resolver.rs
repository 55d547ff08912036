use std::net::IpAddr;

use crate::network::Host;

/// Synchronous name-to-address resolution used to backfill master browser
/// addresses.
pub trait AddressResolver: Send + Sync {
    fn resolve(&self, host: &Host) -> Option<IpAddr>;
}
