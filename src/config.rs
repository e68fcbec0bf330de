//! Configuration management for the chat relay server
//!
//! Settings are loaded from an optional `config.toml` with environment
//! overrides, falling back to built-in defaults when neither is present.

use config::{Config, Environment, File};
use serde::Deserialize;

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to bind the listening socket
    pub bind_address: String,

    /// TCP port for client connections
    pub port: u16,

    /// Maximum concurrent clients
    pub max_clients: usize,

    /// Byte limit for the name negotiation line
    pub name_buffer_size: usize,

    /// Buffer size for chat message reads
    pub message_buffer_size: usize,

    /// Depth of each client's outbound message queue
    pub outbound_queue_depth: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            max_clients: 2,
            name_buffer_size: 256,
            message_buffer_size: 2048,
            outbound_queue_depth: 32,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("CHAT_RELAY").try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Get bind address and port as a socket address string
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.name_buffer_size == 0 || self.message_buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "buffer sizes must be greater than 0".into(),
            ));
        }

        if self.outbound_queue_depth == 0 {
            return Err(config::ConfigError::Message(
                "outbound_queue_depth must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
