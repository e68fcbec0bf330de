//! Module `client`
//!
//! Defines the `ClientRecord` struct tracking one connected client's display
//! name and outbound message queue.

use tokio::sync::mpsc;

/// State of one connected client.
///
/// A record starts with an empty display name; only records with a
/// non-empty name are broadcast targets. The name is set once, after
/// successful name negotiation, and the record is removed when the session
/// ends.
pub struct ClientRecord {
    display_name: String,
    outbound: mpsc::Sender<Vec<u8>>,
}

impl ClientRecord {
    pub fn new(outbound: mpsc::Sender<Vec<u8>>) -> Self {
        Self {
            display_name: String::new(),
            outbound,
        }
    }

    /// Returns the display name, empty until name negotiation completes.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns whether this client has completed name negotiation.
    pub fn is_named(&self) -> bool {
        !self.display_name.is_empty()
    }

    /// Handle for queueing outbound bytes to this client.
    pub fn outbound(&self) -> &mpsc::Sender<Vec<u8>> {
        &self.outbound
    }

    pub fn set_display_name(&mut self, name: String) {
        self.display_name = name;
    }
}
