//! # Samba tool adapters
//!
//! Drives `smbclient` for every lookup:
//!
//! * **[`smbclient`]**: turns a lookup into an `smbclient` command line.
//! * **[`grepable`]**: decodes the machine readable output (`-g`) and
//!   classifies failures.

pub mod grepable;
pub mod smbclient;

pub use grepable::SambaDecoder;
pub use smbclient::SambaCommandBuilder;
