//! # Network Items
//!
//! The entities discovery produces: [`Workgroup`]s, the [`Host`]s that are
//! members of them and the [`Share`]s those hosts expose. Every item is
//! identified by a case-insensitive [`ItemKey`].

mod host;
mod item;
mod key;
mod share;
mod workgroup;

pub use host::{Host, HostInfo};
pub use item::{NetworkItem, NetworkItemKind};
pub use key::ItemKey;
pub use share::{MountState, Share, ShareType, Usage};
pub use workgroup::Workgroup;
