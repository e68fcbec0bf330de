use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, mpsc};

use crate::broadcast::Broadcaster;
use crate::client::ClientRegistry;
use crate::config::ServerConfig;
use crate::protocol;
use crate::server::AdmissionGate;

/// Drives one client session from accept to close.
///
/// Registers the connection, spawns its writer task, then runs the session
/// phases: welcome, name negotiation, message relay. The cleanup actions
/// (departure broadcast for named clients, deregistration, admission
/// release) run exactly once on every exit path because all phases return
/// into the single tail of this function.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    registry: Arc<Mutex<ClientRegistry>>,
    broadcaster: Broadcaster,
    gate: Arc<AdmissionGate>,
    config: Arc<ServerConfig>,
) {
    let (read_half, write_half) = stream.into_split();

    let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_queue_depth);
    tokio::spawn(write_outbound(write_half, outbound_rx, client_addr));

    {
        let mut registry = registry.lock().await;
        registry.register(client_addr, outbound_tx.clone());
        info!(
            "Registered client {} ({}/{} clients)",
            client_addr,
            registry.len(),
            gate.max_clients()
        );
    }

    let name = run_session(
        read_half,
        &outbound_tx,
        client_addr,
        &registry,
        &broadcaster,
        &config,
    )
    .await;

    match &name {
        Some(name) => {
            info!("{} ({}) left the Chat", client_addr, name);
            broadcaster.broadcast(&protocol::left_message(name)).await;
        }
        None => info!("Client {} disconnected before naming", client_addr),
    }
    registry.lock().await.unregister(&client_addr);
    gate.release().await;
    // Dropping the read half here and the write half in the writer task
    // closes the connection.
}

/// Runs the welcome, naming, and relay phases.
///
/// Returns the display name if the session reached the relay phase, `None`
/// if it ended during negotiation. Per-connection I/O errors terminate the
/// session here and are never propagated further.
async fn run_session(
    read_half: OwnedReadHalf,
    outbound: &mpsc::Sender<Vec<u8>>,
    client_addr: SocketAddr,
    registry: &Arc<Mutex<ClientRegistry>>,
    broadcaster: &Broadcaster,
    config: &ServerConfig,
) -> Option<String> {
    let mut reader = BufReader::new(read_half);

    if outbound.send(protocol::WELCOME.to_vec()).await.is_err() {
        return None;
    }

    // Name negotiation: one line, read through a bounded window.
    let mut line = String::new();
    let read = {
        let mut limited = (&mut reader).take(config.name_buffer_size as u64);
        limited.read_line(&mut line).await
    };
    match read {
        Ok(0) => {
            info!("Client {} disconnected before sending a name", client_addr);
            return None;
        }
        Ok(_) => {}
        Err(e) => {
            warn!("Failed to read name from {}: {}", client_addr, e);
            return None;
        }
    }

    let name = protocol::trim_name(&line);
    if name.is_empty() {
        // Expected termination path: reject quietly, nothing is announced.
        let _ = outbound.send(protocol::NO_NAME.to_vec()).await;
        return None;
    }
    let name = name.to_string();

    registry.lock().await.set_name(&client_addr, name.clone());
    info!("Client {} joined as {}", client_addr, name);
    broadcaster.broadcast(&protocol::join_message(&name)).await;

    // Relay phase: every chunk read is tagged and broadcast verbatim.
    let mut buf = vec![0u8; config.message_buffer_size];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(n) => {
                broadcaster
                    .broadcast(&protocol::tag_payload(&name, &buf[..n]))
                    .await;
            }
            Err(e) => {
                warn!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        }
    }

    Some(name)
}

/// Drains one client's outbound queue onto its write half.
///
/// Exits when the queue closes (session cleanup dropped all senders) or the
/// peer becomes unwritable; dropping the write half closes the socket.
async fn write_outbound(
    mut write_half: OwnedWriteHalf,
    mut outbound_rx: mpsc::Receiver<Vec<u8>>,
    client_addr: SocketAddr,
) {
    while let Some(payload) = outbound_rx.recv().await {
        if let Err(e) = write_half.write_all(&payload).await {
            warn!("Failed to write to {}: {}", client_addr, e);
            break;
        }
    }
}
