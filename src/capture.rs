//! Click-capture manager.
//!
//! ```text
//! Idle ──arm──► Armed ──matching click / disarm / re-arm──► Idle
//! ```
//!
//! While armed, exactly one capture-phase listener is registered on the
//! document. Clicks never have their default action or propagation
//! suppressed; the manager only observes them.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, trace, warn};

use crate::dom::{AttributeSelector, ClickEvent, Document};
use crate::error::Result;
use crate::identifiers::{ElementId, ListenerId};

// ============================================================================
// CaptureState
// ============================================================================

/// Click-capture state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CaptureState {
    /// No listener registered.
    #[default]
    Idle,
    /// Waiting for a click on `target`.
    Armed {
        /// Lookup id the click must land on (or inside).
        target: ElementId,
        /// Registered listener.
        listener: ListenerId,
    },
}

// ============================================================================
// ClickOutcome
// ============================================================================

/// How an observed click relates to the armed capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Listener is not the armed one (stale delivery or idle manager).
    Ignored,
    /// Click landed outside the target; still armed.
    Missed,
    /// Click landed on the target.
    Matched(ElementId),
}

// ============================================================================
// ClickCaptureManager
// ============================================================================

/// Single-slot click listener owner.
#[derive(Debug, Default)]
pub struct ClickCaptureManager {
    state: CaptureState,
}

impl ClickCaptureManager {
    /// Creates an idle manager.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: CaptureState::Idle,
        }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Returns `true` if a listener is registered.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        matches!(self.state, CaptureState::Armed { .. })
    }

    /// Registers a capture listener for `target`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns the document's error if registration fails; the manager is
    /// left idle.
    pub fn arm(&mut self, document: &dyn Document, target: ElementId) -> Result<ListenerId> {
        self.disarm(document);

        let listener = document.add_click_listener(true)?;
        debug!(%target, %listener, "Click capture armed");

        self.state = CaptureState::Armed { target, listener };
        Ok(listener)
    }

    /// Unregisters the listener. Returns `true` if one was registered.
    pub fn disarm(&mut self, document: &dyn Document) -> bool {
        let CaptureState::Armed { target, listener } = std::mem::take(&mut self.state) else {
            return false;
        };

        if let Err(e) = document.remove_click_listener(listener) {
            warn!(error = %e, %listener, "Failed to remove click listener");
        }
        debug!(%target, %listener, "Click capture disarmed");
        true
    }

    /// Classifies a click delivered to one of the document's listeners.
    ///
    /// Does not change state; the caller disarms on a match.
    ///
    /// # Errors
    ///
    /// Returns the document's error if the ancestor lookup fails.
    pub fn classify(
        &self,
        document: &dyn Document,
        event: &ClickEvent,
        lookup_attribute: &str,
    ) -> Result<ClickOutcome> {
        let CaptureState::Armed { target, listener } = &self.state else {
            return Ok(ClickOutcome::Ignored);
        };
        if *listener != event.listener {
            trace!(listener = %event.listener, "Click for stale listener");
            return Ok(ClickOutcome::Ignored);
        }

        let selector = AttributeSelector::new(lookup_attribute, target.as_str()).to_css();
        match document.closest(event.target, &selector)? {
            Some(_) => Ok(ClickOutcome::Matched(target.clone())),
            None => Ok(ClickOutcome::Missed),
        }
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
    fn test_arm_registers_one_listener() {
        let doc = MemoryDocument::new();
        let mut manager = ClickCaptureManager::new();

        let first = manager.arm(&doc, id("a")).expect("arm");
        let second = manager.arm(&doc, id("b")).expect("re-arm");

        assert_eq!(doc.listener_count(), 1);
        assert!(!doc.has_listener(first));
        assert!(doc.has_listener(second));
    }

    #[test]
    fn test_arm_failure_leaves_idle() {
        let doc = MemoryDocument::new();
        let mut manager = ClickCaptureManager::new();
        manager.arm(&doc, id("a")).expect("arm");

        doc.fail_listener_attach(true);
        assert!(manager.arm(&doc, id("b")).is_err());
        assert_eq!(manager.state(), &CaptureState::Idle);
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_classify_matches_ancestor() {
        let doc = MemoryDocument::new();
        let button = doc.append_element(doc.body(), "button", &[("data-id", "join")]);
        let label = doc.append_element(button, "span", &[]);
        let other = doc.append_element(doc.body(), "p", &[]);
        let mut manager = ClickCaptureManager::new();
        manager.arm(&doc, id("join")).expect("arm");

        let hit = doc.click(label)[0];
        let miss = doc.click(other)[0];

        assert_eq!(
            manager.classify(&doc, &hit, "data-id").expect("classify"),
            ClickOutcome::Matched(id("join"))
        );
        assert_eq!(
            manager.classify(&doc, &miss, "data-id").expect("classify"),
            ClickOutcome::Missed
        );
    }

    #[test]
    fn test_classify_ignores_stale_listener() {
        let doc = MemoryDocument::new();
        let node = doc.append_element(doc.body(), "a", &[("data-id", "x")]);
        let mut manager = ClickCaptureManager::new();
        let stale = manager.arm(&doc, id("x")).expect("arm");
        manager.arm(&doc, id("x")).expect("re-arm");

        let event = ClickEvent {
            listener: stale,
            target: node,
        };
        assert_eq!(
            manager.classify(&doc, &event, "data-id").expect("classify"),
            ClickOutcome::Ignored
        );
    }

    #[test]
    fn test_disarm_when_idle() {
        let doc = MemoryDocument::new();
        let mut manager = ClickCaptureManager::new();
        assert!(!manager.disarm(&doc));
    }
}
