//! Error types
//!
//! Defines domain-specific error types for the relay server.
//!
//! Per-connection I/O failures are not represented here: they are contained
//! within the affected session and never propagate past its cleanup path.

use std::fmt;
use std::io;

/// Server startup errors
#[derive(Debug)]
pub enum ServerError {
    /// The listening endpoint could not be established.
    Bind { addr: String, source: io::Error },
    /// Configuration could not be loaded or failed validation.
    Config(config::ConfigError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Bind { addr, source } => {
                write!(f, "Failed to bind to {}: {}", addr, source)
            }
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}
