//! Page channel.
//!
//! The page channel is shared with arbitrary page scripts and frames, so
//! every inbound message is tagged with its [`MessageSource`]. Only
//! messages from the page's own window are served.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use crate::bridge::Bridge;
use crate::error::{Error, Result};

// ============================================================================
// PageMessage
// ============================================================================

/// Origin of a page-channel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    /// The page's own window.
    Window,
    /// Another frame or window.
    Foreign,
}

/// A page-channel message plus its source.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMessage {
    /// Where the message came from.
    pub source: MessageSource,
    /// Message payload.
    pub data: Value,
}

impl PageMessage {
    /// Creates a message from `source`.
    #[inline]
    #[must_use]
    pub fn new(source: MessageSource, data: Value) -> Self {
        Self { source, data }
    }

    /// Creates a message from the page's own window.
    #[inline]
    #[must_use]
    pub fn window(data: Value) -> Self {
        Self::new(MessageSource::Window, data)
    }
}

// ============================================================================
// PageChannel
// ============================================================================

/// Sending half of the page channel.
#[derive(Debug, Clone)]
pub struct PageChannel {
    tx: mpsc::UnboundedSender<PageMessage>,
}

impl PageChannel {
    /// Posts a message from the page's own window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the bridge loop has stopped.
    pub fn post(&self, data: Value) -> Result<()> {
        self.post_from(MessageSource::Window, data)
    }

    /// Posts a message from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the bridge loop has stopped.
    pub fn post_from(&self, source: MessageSource, data: Value) -> Result<()> {
        self.tx
            .send(PageMessage::new(source, data))
            .map_err(|_| Error::ConnectionClosed)
    }
}

/// Creates a page channel.
#[must_use]
pub fn page_channel() -> (PageChannel, mpsc::UnboundedReceiver<PageMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PageChannel { tx }, rx)
}

/// Serves page messages in arrival order until every [`PageChannel`] is
/// dropped.
///
/// Fetches are handed off to their own task and answer out of band.
pub async fn serve_page(bridge: Bridge, mut messages: mpsc::UnboundedReceiver<PageMessage>) {
    while let Some(message) = messages.recv().await {
        bridge.handle_page_message(message).await;
    }
    debug!("Page channel closed");
}

// ============================================================================
// Tests
// ============================================================================
