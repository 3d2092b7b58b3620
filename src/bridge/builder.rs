//! Builder pattern for bridge configuration.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use content_bridge::{Bridge, MemoryDocument};
//! use tokio::sync::mpsc;
//!
//! # fn example() -> content_bridge::Result<()> {
//! let (page_tx, _page_rx) = mpsc::unbounded_channel();
//! let bridge = Bridge::builder()
//!     .document(Arc::new(MemoryDocument::new()))
//!     .page_sink(page_tx)
//!     .build()?;
//! assert!(!bridge.has_annotator());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use crate::annotation::Annotator;
use crate::config::BridgeConfig;
use crate::dom::Document;
use crate::error::{Error, Result};
use crate::fetch::FetchProxy;

use super::state::Interaction;
use super::{Bridge, BridgeInner};

// ============================================================================
// BridgeBuilder
// ============================================================================

/// Builder for configuring a [`Bridge`].
///
/// Use [`Bridge::builder()`] to create a new builder.
#[derive(Default)]
pub struct BridgeBuilder {
    /// Page document.
    document: Option<Arc<dyn Document>>,
    /// Annotation service.
    annotator: Option<Arc<dyn Annotator>>,
    /// Configuration.
    config: BridgeConfig,
    /// Outbound page channel.
    page_sink: Option<mpsc::UnboundedSender<Value>>,
}

impl fmt::Debug for BridgeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeBuilder")
            .field("document", &self.document.is_some())
            .field("annotator", &self.annotator.is_some())
            .field("config", &self.config)
            .field("page_sink", &self.page_sink.is_some())
            .finish()
    }
}

// ============================================================================
// BridgeBuilder Implementation
// ============================================================================

impl BridgeBuilder {
    /// Creates a new builder with the default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page document.
    #[inline]
    #[must_use]
    pub fn document<D>(mut self, document: Arc<D>) -> Self
    where
        D: Document + 'static,
    {
        self.document = Some(document);
        self
    }

    /// Sets the annotation service.
    ///
    /// Without one, `GET_ANNOTATED_HTML` returns an empty list and
    /// `HIGHLIGHT_ELEMENT` fails.
    #[inline]
    #[must_use]
    pub fn annotator<A>(mut self, annotator: Arc<A>) -> Self
    where
        A: Annotator + 'static,
    {
        self.annotator = Some(annotator);
        self
    }

    /// Sets the configuration.
    #[inline]
    #[must_use]
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the channel that receives page-bound responses and events.
    #[inline]
    #[must_use]
    pub fn page_sink(mut self, sink: mpsc::UnboundedSender<Value>) -> Self {
        self.page_sink = Some(sink);
        self
    }

    /// Builds the bridge with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the document or page sink is not set
    /// - [`Error::Config`] if the configuration is invalid
    /// - [`Error::Http`] if the fetch client cannot be built
    pub fn build(self) -> Result<Bridge> {
        let document = self.document.ok_or_else(|| {
            Error::config(
                "Document is required. Use .document() to set it.\n\
                 Example: Bridge::builder().document(Arc::new(MemoryDocument::new()))",
            )
        })?;
        let page_tx = self.page_sink.ok_or_else(|| {
            Error::config(
                "Page sink is required. Use .page_sink() to set it.\n\
                 Example: let (tx, rx) = mpsc::unbounded_channel(); builder.page_sink(tx)",
            )
        })?;

        self.config.validate()?;
        let fetch = FetchProxy::new(&self.config.fetch)?;

        debug!(
            lookup_attribute = %self.config.lookup_attribute,
            annotator = self.annotator.is_some(),
            "Bridge created"
        );

        Ok(Bridge {
            inner: Arc::new(BridgeInner {
                document,
                annotator: self.annotator,
                interaction: Mutex::new(Interaction::default()),
                fetch,
                config: self.config,
                page_tx,
            }),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
