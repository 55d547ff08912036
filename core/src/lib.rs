//! # smbrowse core
//!
//! Discovery of SMB workgroups, hosts and shares.
//!
//! * **[`scanner`]**: accepts lookup requests, runs them as background tasks
//!   and retries the ones that need credentials.
//! * **[`reconciler`]**: merges what a lookup observed into the model.
//! * **[`model`]**: the network model itself.
//! * **[`system`]**: process runner and address resolver backed by the OS.

pub mod model;
pub mod reconciler;
pub mod scanner;
pub mod system;

pub use model::NetworkModel;
pub use scanner::{Collaborators, Dispatch, Scanner};
