//! Highlight manager.
//!
//! Owns the single highlight slot. At most one node carries the marker at
//! any time; the manager records a node before decorating it so a partial
//! failure is still undone by the next [`HighlightManager::clear`].

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, warn};

use crate::dom::{Document, HighlightStyle, ScrollOptions};
use crate::error::Result;
use crate::identifiers::{ElementId, NodeId};

// ============================================================================
// HighlightState
// ============================================================================

/// The currently highlighted node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightState {
    /// Live node carrying the marker.
    pub node: NodeId,
    /// Lookup id the node was resolved from.
    pub element_id: ElementId,
}

// ============================================================================
// HighlightManager
// ============================================================================

/// Single-slot highlight owner.
#[derive(Debug, Default)]
pub struct HighlightManager {
    current: Option<HighlightState>,
}

impl HighlightManager {
    /// Creates an empty manager.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Returns the current highlight, if any.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&HighlightState> {
        self.current.as_ref()
    }

    /// Returns `true` if a node is highlighted.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Marks `node` and scrolls it into view.
    ///
    /// Any previous highlight is cleared first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`](crate::Error::Internal) if styling or
    /// scrolling fails. The node stays recorded so a later clear undoes
    /// whatever was applied.
    pub fn apply(
        &mut self,
        document: &dyn Document,
        node: NodeId,
        element_id: ElementId,
        style: &HighlightStyle,
        scroll: &ScrollOptions,
    ) -> Result<()> {
        self.clear(document);

        self.current = Some(HighlightState {
            node,
            element_id: element_id.clone(),
        });

        for (property, value) in style.declarations() {
            document.set_style_property(node, property, value)?;
        }
        document.scroll_into_view(node, scroll)?;

        debug!(%element_id, %node, "Element highlighted");
        Ok(())
    }

    /// Removes the marker from the current node.
    ///
    /// Returns `true` if something was highlighted. A property that fails
    /// to reset is logged and skipped; the slot is cleared regardless.
    pub fn clear(&mut self, document: &dyn Document) -> bool {
        let Some(state) = self.current.take() else {
            return false;
        };

        for property in HighlightStyle::PROPERTIES {
            if let Err(e) = document.set_style_property(state.node, property, "") {
                warn!(error = %e, node = %state.node, property, "Failed to reset highlight property");
            }
        }

        debug!(element_id = %state.element_id, "Highlight removed");
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dom::MemoryDocument;

    fn id(s: &str) -> ElementId {
        ElementId::new(s).expect("valid id")
    }

    #[test]
    fn test_apply_marks_and_scrolls() {
        let doc = MemoryDocument::new();
        let node = doc.append_element(doc.body(), "button", &[]);
        let mut manager = HighlightManager::new();

        manager
            .apply(&doc, node, id("b"), &HighlightStyle::default(), &ScrollOptions::default())
            .expect("apply");

        assert_eq!(doc.style(node, "outline"), "3px solid #4CAF50");
        assert_eq!(doc.style(node, "cursor"), "pointer");
        assert_eq!(doc.scrolls(), vec![(node, ScrollOptions::default())]);
        assert_eq!(manager.current().map(|s| s.node), Some(node));
    }

    #[test]
    fn test_second_apply_clears_first() {
        let doc = MemoryDocument::new();
        let first = doc.append_element(doc.body(), "a", &[]);
        let second = doc.append_element(doc.body(), "a", &[]);
        let mut manager = HighlightManager::new();
        let style = HighlightStyle::default();
        let scroll = ScrollOptions::default();

        manager.apply(&doc, first, id("1"), &style, &scroll).expect("apply");
        manager.apply(&doc, second, id("2"), &style, &scroll).expect("apply");

        assert!(!doc.has_inline_style(first));
        assert_eq!(doc.nodes_with_style("outline"), vec![second]);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let doc = MemoryDocument::new();
        let node = doc.append_element(doc.body(), "a", &[]);
        let mut manager = HighlightManager::new();

        manager
            .apply(&doc, node, id("1"), &HighlightStyle::default(), &ScrollOptions::default())
            .expect("apply");

        assert!(manager.clear(&doc));
        assert!(!manager.clear(&doc));
        assert!(!doc.has_inline_style(node));
        assert!(!manager.is_active());
    }

    #[test]
    fn test_scroll_failure_keeps_state_for_cleanup() {
        let doc = MemoryDocument::new();
        let node = doc.append_element(doc.body(), "a", &[]);
        let mut manager = HighlightManager::new();
        doc.fail_scroll(true);

        let err = manager
            .apply(&doc, node, id("1"), &HighlightStyle::default(), &ScrollOptions::default())
            .expect_err("scroll fails");
        assert!(err.is_internal());
        assert!(manager.is_active());

        manager.clear(&doc);
        assert!(!doc.has_inline_style(node));
    }
}
