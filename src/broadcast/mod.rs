//! Broadcast delivery
//!
//! Fans a payload out to every named client. The recipient list is
//! snapshotted under the registry lock; delivery happens outside it,
//! against each client's bounded outbound queue.

use std::sync::Arc;

use log::warn;
use tokio::sync::Mutex;
use tokio::sync::mpsc::error::TrySendError;

use crate::client::ClientRegistry;

/// Delivers payloads to every currently named client.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<Mutex<ClientRegistry>>,
}

impl Broadcaster {
    pub fn new(registry: Arc<Mutex<ClientRegistry>>) -> Self {
        Self { registry }
    }

    /// Queues `payload` to every named client.
    ///
    /// Best-effort, at-most-once per recipient: a client with a full
    /// outbound queue or a finished writer misses this payload. Individual
    /// delivery failures are logged and never escalated.
    pub async fn broadcast(&self, payload: &[u8]) {
        let recipients = self.registry.lock().await.named_senders();

        for (addr, sender) in recipients {
            match sender.try_send(payload.to_vec()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!("Dropping message for slow client {}", addr);
                }
                Err(TrySendError::Closed(_)) => {
                    warn!("Dropping message for disconnected client {}", addr);
                }
            }
        }
    }
}
