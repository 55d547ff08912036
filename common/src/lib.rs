//! # smbrowse common
//!
//! Types shared by every crate of the workspace:
//!
//! * **[`network`]**: workgroups, hosts and shares.
//! * **[`lookup`]**: the discovery operations and their lifecycle.
//! * **[`tools`]**, **[`credentials`]**, **[`resolver`]**, **[`events`]**: the
//!   contracts the scanner depends on. Concrete implementations live in the
//!   adapter crates.
//! * **[`config`]**: global settings.

pub mod config;
pub mod credentials;
pub mod events;
pub mod lookup;
pub mod network;
pub mod resolver;
pub mod tools;
