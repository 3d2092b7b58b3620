//! Host channel.
//!
//! Every message travels with its own [`HostResponder`]. The bridge answers
//! through it at most once; a responder dropped unanswered tells the sender
//! that no response is coming.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::bridge::Bridge;
use crate::error::{Error, Result};

// ============================================================================
// HostResponder
// ============================================================================

/// One-shot reply handle for a host message.
#[derive(Debug)]
pub struct HostResponder {
    tx: oneshot::Sender<Value>,
}

impl HostResponder {
    /// Wraps a oneshot sender.
    #[inline]
    #[must_use]
    pub fn new(tx: oneshot::Sender<Value>) -> Self {
        Self { tx }
    }

    /// Delivers the response, consuming the responder.
    pub fn respond(self, response: Value) {
        if self.tx.send(response).is_err() {
            debug!("Host sender went away before the response");
        }
    }
}

// ============================================================================
// HostRequest
// ============================================================================

/// A host message plus its responder.
#[derive(Debug)]
pub struct HostRequest {
    /// Raw message object.
    pub message: Value,
    /// Reply handle.
    pub responder: HostResponder,
}

// ============================================================================
// HostChannel
// ============================================================================

/// Sending half of the host channel.
#[derive(Debug, Clone)]
pub struct HostChannel {
    tx: mpsc::UnboundedSender<HostRequest>,
}

impl HostChannel {
    /// Sends a message and waits for the response.
    ///
    /// Returns `Ok(None)` if the bridge ignored the message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the bridge loop has stopped.
    pub async fn send_message(&self, message: Value) -> Result<Option<Value>> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(HostRequest {
                message,
                responder: HostResponder::new(tx),
            })
            .map_err(|_| Error::ConnectionClosed)?;

        Ok(rx.await.ok())
    }
}

/// Creates a host channel.
#[must_use]
pub fn host_channel() -> (HostChannel, mpsc::UnboundedReceiver<HostRequest>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (HostChannel { tx }, rx)
}

/// Serves host requests until every [`HostChannel`] is dropped.
pub async fn serve_host(bridge: Bridge, mut requests: mpsc::UnboundedReceiver<HostRequest>) {
    while let Some(HostRequest { message, responder }) = requests.recv().await {
        let pending = bridge.handle_host_message(&message, responder);
        trace!(pending, "Host message handled");
    }
    debug!("Host channel closed");
}

// ============================================================================
// Tests
// ============================================================================
