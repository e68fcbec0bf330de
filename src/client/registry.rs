//! Client registry
//!
//! Tracks connected clients keyed by peer address. The registry itself is a
//! plain map; the server shares it as `Arc<Mutex<ClientRegistry>>` and every
//! access goes through that single lock.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::sync::mpsc;

use crate::client::ClientRecord;

/// Registry for tracking active clients
pub struct ClientRegistry {
    clients: HashMap<SocketAddr, ClientRecord>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Inserts a provisional record with an empty display name.
    pub fn register(&mut self, addr: SocketAddr, outbound: mpsc::Sender<Vec<u8>>) {
        self.clients.insert(addr, ClientRecord::new(outbound));
    }

    /// Sets the display name of a registered client.
    pub fn set_name(&mut self, addr: &SocketAddr, name: String) {
        if let Some(record) = self.clients.get_mut(addr) {
            record.set_display_name(name);
        }
    }

    /// Removes a client. A no-op when the address is not registered.
    pub fn unregister(&mut self, addr: &SocketAddr) {
        self.clients.remove(addr);
    }

    pub fn get(&self, addr: &SocketAddr) -> Option<&ClientRecord> {
        self.clients.get(addr)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Snapshot of the outbound handles of every named client.
    ///
    /// Clients still in name negotiation (empty display name) are excluded.
    /// Delivery happens outside the registry lock, against this possibly
    /// slightly stale view.
    pub fn named_senders(&self) -> Vec<(SocketAddr, mpsc::Sender<Vec<u8>>)> {
        self.clients
            .iter()
            .filter(|(_, record)| record.is_named())
            .map(|(addr, record)| (*addr, record.outbound().clone()))
            .collect()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
