//! Chat Relay Server - Entry Point
//!
//! A minimal multi-client TCP text relay: clients connect, submit a display
//! name, and everything they send afterwards is broadcast to the other
//! named clients.

use log::{error, info};

use chat_relay::Server;
use chat_relay::config::ServerConfig;
use chat_relay::error::ServerError;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching chat relay server...");

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::load()?;
    let server = Server::new(config).await?;
    server.start().await;
    Ok(())
}
