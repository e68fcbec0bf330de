//! Wire protocol
//!
//! Fixed protocol messages and broadcast payload formatting.

pub mod messages;

pub use messages::*;
