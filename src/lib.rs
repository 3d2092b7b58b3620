//! Content Bridge - message bridge between a host extension and a page.
//!
//! This library routes UI-automation requests into a live document and
//! reports results back to whichever side asked.
//!
//! # Architecture
//!
//! The bridge sits between two transports:
//!
//! - **Host channel**: `{type: OP, ...}` messages, one responder each
//! - **Page channel**: `{type: OP_REQUEST, requestId, ...}` posts, correlated
//!   responses, plus unsolicited `ELEMENT_CLICKED` events
//!
//! Key design principles:
//!
//! - One operation table shared by both channels
//! - At most one highlighted node and one click capture at any time
//! - Untrusted input is validated, never trusted
//! - No failure escapes the router; callers get `success: false`
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use content_bridge::{Bridge, MemoryDocument, PageClient, Result};
//! use content_bridge::transport::{page_channel, serve_page};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let document = Arc::new(MemoryDocument::new());
//!     document.append_element(document.body(), "button", &[("data-id", "42")]);
//!
//!     let (page_tx, page_rx) = mpsc::unbounded_channel();
//!     let bridge = Bridge::builder()
//!         .document(Arc::clone(&document))
//!         .page_sink(page_tx)
//!         .build()?;
//!
//!     let (channel, inbound) = page_channel();
//!     tokio::spawn(serve_page(bridge, inbound));
//!
//!     let client = PageClient::new(channel, page_rx);
//!     client.setup_click_listener("42").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | [`Bridge`], builder, router and channel adapters |
//! | [`highlight`] | Single-slot highlight manager |
//! | [`capture`] | Single-slot click-capture manager |
//! | [`fetch`] | HTTP fetch proxy |
//! | [`annotation`] | Annotation service contract |
//! | [`dom`] | [`Document`] trait and [`MemoryDocument`] |
//! | [`config`] | [`BridgeConfig`] and [`FetchConfig`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Message types and envelopes |
//! | [`transport`] | Host and page channels, [`PageClient`] |

// ============================================================================
// Modules
// ============================================================================

/// Annotation service contract.
pub mod annotation;

/// The bridge: shared state and request router.
///
/// Use [`Bridge::builder()`] to create one.
pub mod bridge;

/// Click-capture state machine.
pub mod capture;

/// Bridge configuration.
pub mod config;

/// Document abstraction and in-memory implementation.
pub mod dom;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// HTTP fetch proxy.
pub mod fetch;

/// Highlight state.
pub mod highlight;

/// Type-safe identifiers.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Protocol message types.
pub mod protocol;

/// In-process transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Bridge types
pub use bridge::{Bridge, BridgeBuilder, Interaction};

// Component types
pub use annotation::{AnnotatedElement, Annotator};
pub use capture::{CaptureState, ClickCaptureManager, ClickOutcome};
pub use config::{BridgeConfig, DEFAULT_LOOKUP_ATTRIBUTE, FetchConfig};
pub use fetch::{FetchOutcome, FetchParams, FetchProxy};
pub use highlight::{HighlightManager, HighlightState};

// DOM types
pub use dom::{
    AttributeSelector, ClickEvent, Document, HighlightStyle, MemoryDocument, ScrollBehavior,
    ScrollLogicalPosition, ScrollOptions,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ElementId, ListenerId, NodeId, RequestId};

// Protocol types
pub use protocol::{Operation, OperationKind, OperationResult, PageEvent, PageRequest};

// Transport types
pub use transport::{HostChannel, PageChannel, PageClient, PageMessage};
