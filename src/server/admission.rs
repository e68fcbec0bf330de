//! Admission control
//!
//! Bounds the number of concurrently connected clients. The counter is
//! guarded by its own lock, independent of the client registry lock.

use tokio::sync::Mutex;

/// Bounded counter of admitted clients.
pub struct AdmissionGate {
    max_clients: usize,
    admitted: Mutex<usize>,
}

impl AdmissionGate {
    pub fn new(max_clients: usize) -> Self {
        Self {
            max_clients,
            admitted: Mutex::new(0),
        }
    }

    /// Reserves a capacity slot.
    ///
    /// Returns `false`, with no side effect, when the server is already at
    /// capacity.
    pub async fn try_admit(&self) -> bool {
        let mut admitted = self.admitted.lock().await;
        if *admitted >= self.max_clients {
            return false;
        }
        *admitted += 1;
        true
    }

    /// Returns a previously reserved slot.
    ///
    /// Called exactly once per successful `try_admit`, on the session's
    /// cleanup path. The count never underflows.
    pub async fn release(&self) {
        let mut admitted = self.admitted.lock().await;
        *admitted = admitted.saturating_sub(1);
    }

    /// Number of currently admitted clients.
    pub async fn admitted(&self) -> usize {
        *self.admitted.lock().await
    }

    pub fn max_clients(&self) -> usize {
        self.max_clients
    }
}
