//! Server core functionality
//!
//! This module contains the accept loop, admission control, and core
//! infrastructure for the relay server.

pub mod admission;
pub mod core;

pub use admission::AdmissionGate;
pub use core::Server;
