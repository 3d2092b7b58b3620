//! Host channel adapter.
//!
//! Host messages carry the bare operation tag. The responder is answered
//! exactly once for recognized operations and dropped unanswered for
//! anything else.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tracing::{debug, trace};

use crate::protocol::parse_host_message;
use crate::transport::HostResponder;

use super::Bridge;

// ============================================================================
// Host Adapter
// ============================================================================

impl Bridge {
    /// Handles one host-channel message.
    ///
    /// Returns `true` when the response will be delivered later (the
    /// "keep the channel open" signal), `false` when it was delivered
    /// already or will never be.
    ///
    /// Must be called from within a tokio runtime.
    pub fn handle_host_message(&self, message: &Value, responder: HostResponder) -> bool {
        let Some(operation) = parse_host_message(message) else {
            debug!(%message, "Ignoring unrecognized host message");
            return false;
        };
        trace!(operation = operation.kind().tag(), "Host request");

        if let Some(result) = self.execute_now(&operation) {
            responder.respond(result.into_value());
            return false;
        }

        let bridge = self.clone();
        tokio::spawn(async move {
            let result = bridge.execute(operation).await;
            responder.respond(result.into_value());
        });
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
