//! The bridge: shared state plus the request router.
//!
//! A [`Bridge`] is a cheap handle around one document, one optional
//! annotation service and the single-slot interaction state. Clones share
//! everything, so transport loops and click listeners can each hold one.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | [`BridgeBuilder`] and validation |
//! | `state` | [`Interaction`] (highlight + capture slots) |
//! | `router` | Operation dispatch shared by both channels |
//! | `host` | Host channel adapter |
//! | `page` | Page channel adapter |
//! | `click` | Document click handling |

// ============================================================================
// Submodules
// ============================================================================

mod builder;
mod click;
mod host;
mod page;
mod router;
mod state;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::warn;

use crate::annotation::Annotator;
use crate::capture::CaptureState;
use crate::config::BridgeConfig;
use crate::dom::Document;
use crate::fetch::FetchProxy;
use crate::highlight::HighlightState;
use crate::protocol::PageEvent;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::BridgeBuilder;
pub use state::Interaction;

// ============================================================================
// BridgeInner
// ============================================================================

/// Shared bridge state.
pub(crate) struct BridgeInner {
    /// Page document.
    pub document: Arc<dyn Document>,

    /// Annotation service, if loaded.
    pub annotator: Option<Arc<dyn Annotator>>,

    /// Highlight and click-capture slots.
    pub interaction: Mutex<Interaction>,

    /// HTTP proxy for `FETCH_API_REQUEST`.
    pub fetch: FetchProxy,

    /// Resolved configuration.
    pub config: BridgeConfig,

    /// Outbound page channel (responses and events).
    pub page_tx: mpsc::UnboundedSender<Value>,
}

// ============================================================================
// Bridge
// ============================================================================

/// Content-context message bridge.
///
/// Use [`Bridge::builder()`] to create one.
#[derive(Clone)]
pub struct Bridge {
    pub(crate) inner: Arc<BridgeInner>,
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("annotator_loaded", &self.inner.annotator.is_some())
            .field("config", &self.inner.config)
            .field("interaction", &*self.inner.interaction.lock())
            .finish_non_exhaustive()
    }
}

impl Bridge {
    /// Creates a new bridge builder.
    #[inline]
    #[must_use]
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    /// Returns the bridge configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Returns the page document.
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Arc<dyn Document> {
        &self.inner.document
    }

    /// Returns `true` if an annotation service is loaded.
    #[inline]
    #[must_use]
    pub fn has_annotator(&self) -> bool {
        self.inner.annotator.is_some()
    }

    /// Returns a snapshot of the current highlight.
    #[must_use]
    pub fn highlighted(&self) -> Option<HighlightState> {
        self.inner.interaction.lock().highlight.current().cloned()
    }

    /// Returns a snapshot of the click-capture state.
    #[must_use]
    pub fn capture_state(&self) -> CaptureState {
        self.inner.interaction.lock().capture.state().clone()
    }

    /// Posts a message to the page channel.
    pub(crate) fn post(&self, message: Value) {
        if self.inner.page_tx.send(message).is_err() {
            warn!("Page channel closed, message dropped");
        }
    }

    /// Posts an unsolicited event to the page channel.
    pub(crate) fn post_event(&self, event: &PageEvent) {
        self.post(event.to_value());
    }
}
