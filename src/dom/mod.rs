//! Document abstraction.
//!
//! The bridge never touches a concrete DOM. Everything it needs from the
//! page goes through the [`Document`] trait:
//!
//! | Capability | Method |
//! |------------|--------|
//! | Lookup by attribute selector | [`Document::query_selector`] |
//! | Ancestor matching for clicks | [`Document::closest`] |
//! | Inline style writes | [`Document::set_style_property`] |
//! | Viewport scrolling | [`Document::scroll_into_view`] |
//! | Click listener registry | [`Document::add_click_listener`], [`Document::remove_click_listener`] |
//!
//! [`MemoryDocument`] is a complete in-process implementation.

// ============================================================================
// Submodules
// ============================================================================

/// In-memory document tree.
pub mod memory;

/// Attribute selector construction and parsing.
pub mod selector;

/// Highlight marker and scroll options.
pub mod style;

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;
use crate::identifiers::{ListenerId, NodeId};

// ============================================================================
// Re-exports
// ============================================================================

pub use memory::{MAX_RECORDED_SCROLLS, MemoryDocument};
pub use selector::AttributeSelector;
pub use style::{HighlightStyle, ScrollBehavior, ScrollLogicalPosition, ScrollOptions};

// ============================================================================
// Document
// ============================================================================

/// A live document the bridge can inspect and decorate.
///
/// Implementations report their own failures as
/// [`Error::Internal`](crate::Error::Internal). A selector that matches
/// nothing is `Ok(None)`, never an error.
pub trait Document: Send + Sync {
    /// Returns the first node in document order matching `selector`.
    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>>;

    /// Returns `node` or its nearest ancestor matching `selector`.
    fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>>;

    /// Sets one inline style property. An empty `value` unsets it.
    fn set_style_property(&self, node: NodeId, property: &str, value: &str) -> Result<()>;

    /// Scrolls `node` into the viewport. Does not wait for the animation.
    fn scroll_into_view(&self, node: NodeId, options: &ScrollOptions) -> Result<()>;

    /// Registers a click listener on the document root.
    ///
    /// Clicks observed by the listener are delivered back to the bridge as
    /// [`ClickEvent`]s carrying the returned id.
    fn add_click_listener(&self, capture: bool) -> Result<ListenerId>;

    /// Unregisters a click listener. Unknown ids are ignored.
    fn remove_click_listener(&self, listener: ListenerId) -> Result<()>;
}

// ============================================================================
// ClickEvent
// ============================================================================

/// A click observed by a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// Listener that observed the click.
    pub listener: ListenerId,
    /// Node the user clicked.
    pub target: NodeId,
}
