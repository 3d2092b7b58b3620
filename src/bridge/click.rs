//! Document click handling.
//!
//! The embedder forwards every click its document listeners observe.
//! A click on (or inside) the armed target posts `ELEMENT_CLICKED` and
//! runs the full cleanup. The click itself is never suppressed.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, trace, warn};

use crate::capture::ClickOutcome;
use crate::dom::ClickEvent;
use crate::identifiers::ElementId;
use crate::protocol::PageEvent;

use super::Bridge;

// ============================================================================
// Click Handling
// ============================================================================

impl Bridge {
    /// Handles a click delivered to a document listener.
    ///
    /// Returns the captured element id when the click matched.
    pub fn handle_click(&self, event: ClickEvent) -> Option<ElementId> {
        let inner = &*self.inner;
        let outcome = inner.interaction.lock().click(
            inner.document.as_ref(),
            &event,
            &inner.config.lookup_attribute,
        );

        match outcome {
            Ok(ClickOutcome::Matched(element_id)) => {
                debug!(%element_id, "Captured click on target");
                self.post_event(&PageEvent::ElementClicked {
                    element_id: element_id.clone(),
                });
                Some(element_id)
            }
            Ok(ClickOutcome::Missed) => {
                trace!(target = %event.target, "Click outside capture target");
                None
            }
            Ok(ClickOutcome::Ignored) => None,
            Err(e) => {
                warn!(error = %e, "Failed to classify click");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    use crate::capture::CaptureState;
    use crate::dom::MemoryDocument;

    use super::*;

    fn bridge() -> (Bridge, Arc<MemoryDocument>, mpsc::UnboundedReceiver<Value>) {
        let doc = Arc::new(MemoryDocument::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let bridge = Bridge::builder()
            .document(Arc::clone(&doc))
            .page_sink(tx)
            .build()
            .expect("bridge");
        (bridge, doc, rx)
    }

    #[test]
    fn test_click_inside_target_matches() {
        let (bridge, doc, mut rx) = bridge();
        let button = doc.append_element(doc.body(), "button", &[("data-id", "submit")]);
        let icon = doc.append_element(button, "span", &[]);

        bridge
            .setup_click_listener(Some(&json!("submit")))
            .expect("armed");

        let events = doc.click(icon);
        assert_eq!(events.len(), 1);
        assert_eq!(
            bridge.handle_click(events[0]),
            Some(ElementId::new("submit").expect("id"))
        );

        assert_eq!(
            rx.try_recv().expect("event"),
            json!({"type": "ELEMENT_CLICKED", "elementId": "submit"})
        );
        assert_eq!(bridge.capture_state(), CaptureState::Idle);
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_click_elsewhere_keeps_capture() {
        let (bridge, doc, mut rx) = bridge();
        doc.append_element(doc.body(), "button", &[("data-id", "submit")]);
        let other = doc.append_element(doc.body(), "div", &[]);

        bridge
            .setup_click_listener(Some(&json!("submit")))
            .expect("armed");

        for event in doc.click(other) {
            assert_eq!(bridge.handle_click(event), None);
        }
        assert!(rx.try_recv().is_err());
        assert!(matches!(bridge.capture_state(), CaptureState::Armed { .. }));
    }

    #[test]
    fn test_stale_listener_is_ignored() {
        let (bridge, doc, mut rx) = bridge();
        let button = doc.append_element(doc.body(), "button", &[("data-id", "a")]);

        let stale = bridge.setup_click_listener(Some(&json!("a"))).expect("armed");
        bridge.setup_click_listener(Some(&json!("a"))).expect("re-armed");

        let event = ClickEvent {
            listener: stale,
            target: button,
        };
        assert_eq!(bridge.handle_click(event), None);
        assert!(rx.try_recv().is_err());
    }
}
