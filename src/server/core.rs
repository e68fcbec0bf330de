use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::broadcast::Broadcaster;
use crate::client::ClientRegistry;
use crate::client::handle_client;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::protocol;
use crate::server::AdmissionGate;

pub struct Server {
    registry: Arc<Mutex<ClientRegistry>>,
    broadcaster: Broadcaster,
    gate: Arc<AdmissionGate>,
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the listening endpoint. Bind failure is fatal to the caller;
    /// there is no retry.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let addr = config.listen_addr();

        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => {
                info!("Server bound to {}", addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", addr, e);
                return Err(ServerError::Bind { addr, source: e });
            }
        };

        let registry = Arc::new(Mutex::new(ClientRegistry::new()));
        let broadcaster = Broadcaster::new(Arc::clone(&registry));

        Ok(Self {
            registry,
            broadcaster,
            gate: Arc::new(AdmissionGate::new(config.max_clients)),
            listener,
            config: Arc::new(config),
        })
    }

    /// Address the listener is actually bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop for the life of the process.
    ///
    /// A failed accept is logged and the loop continues; a denied admission
    /// closes the new connection without spawning a session.
    pub async fn start(&self) {
        info!(
            "Starting chat relay server on {} (max {} clients)",
            self.config.listen_addr(),
            self.gate.max_clients()
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    if !self.gate.try_admit().await {
                        warn!("Rejecting {}: the chat is at capacity", addr);
                        reject_client(stream, addr).await;
                        continue;
                    }

                    info!("New connection to the server: {}", addr);

                    let registry = Arc::clone(&self.registry);
                    let broadcaster = self.broadcaster.clone();
                    let gate = Arc::clone(&self.gate);
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        handle_client(stream, addr, registry, broadcaster, gate, config).await;
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Writes the capacity rejection and closes the connection. The connection
/// is never registered and no admission slot is held.
async fn reject_client(mut stream: TcpStream, addr: SocketAddr) {
    if let Err(e) = stream.write_all(protocol::CHAT_FULL).await {
        warn!("Failed to send rejection to {}: {}", addr, e);
    }
}
