//! Shared interaction state.
//!
//! Highlight and click capture are torn down together, so both slots live in
//! one [`Interaction`] behind one lock. Every mutating call runs to
//! completion under that lock.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::capture::{ClickCaptureManager, ClickOutcome};
use crate::config::BridgeConfig;
use crate::dom::{AttributeSelector, ClickEvent, Document};
use crate::error::{Error, Result};
use crate::highlight::HighlightManager;
use crate::identifiers::{ElementId, ListenerId};

// ============================================================================
// Interaction
// ============================================================================

/// Highlight slot plus click-capture slot.
#[derive(Debug, Default)]
pub struct Interaction {
    /// Highlighted node owner.
    pub highlight: HighlightManager,
    /// Click listener owner.
    pub capture: ClickCaptureManager,
}

impl Interaction {
    /// Highlights the element referenced by `element`.
    ///
    /// The previous highlight (and capture) is always torn down first, even
    /// when the new reference turns out to be unusable.
    ///
    /// # Errors
    ///
    /// - [`Error::Unavailable`] if no annotation service is loaded
    /// - [`Error::Malformed`] if `element` is not `{id: <non-empty string>}`
    /// - [`Error::NotFound`] if no live node carries the id
    /// - [`Error::Internal`] if the document rejects styling or scrolling
    pub fn highlight(
        &mut self,
        document: &dyn Document,
        config: &BridgeConfig,
        element: Option<&Value>,
        annotator_loaded: bool,
    ) -> Result<()> {
        self.remove_highlight(document);

        if !annotator_loaded {
            return Err(Error::unavailable("annotation service"));
        }

        let element_id = parse_element_ref(element)?;
        let selector = AttributeSelector::new(&config.lookup_attribute, element_id.as_str()).to_css();
        let node = document
            .query_selector(&selector)?
            .ok_or_else(|| Error::not_found(element_id.clone()))?;

        self.highlight.apply(
            document,
            node,
            element_id,
            &config.highlight_style,
            &config.scroll,
        )
    }

    /// Clears the highlight and disarms any click capture.
    pub fn remove_highlight(&mut self, document: &dyn Document) {
        self.highlight.clear(document);
        self.capture.disarm(document);
    }

    /// Arms the click capture for the id in `element_id`.
    ///
    /// An unrelated active highlight is left alone.
    ///
    /// # Errors
    ///
    /// - [`Error::Malformed`] if `element_id` is not a non-empty string
    /// - [`Error::Internal`] if the listener cannot be registered
    pub fn setup_click_listener(
        &mut self,
        document: &dyn Document,
        element_id: Option<&Value>,
    ) -> Result<ListenerId> {
        let target = ElementId::from_value(element_id)?;
        self.capture.arm(document, target)
    }

    /// Handles a click seen by a document listener.
    ///
    /// Returns the target id when the armed capture matched. Matching runs
    /// the full cleanup, leaving both slots empty.
    ///
    /// # Errors
    ///
    /// Returns the document's error if ancestor matching fails.
    pub fn click(
        &mut self,
        document: &dyn Document,
        event: &ClickEvent,
        lookup_attribute: &str,
    ) -> Result<ClickOutcome> {
        let outcome = self.capture.classify(document, event, lookup_attribute)?;
        if matches!(outcome, ClickOutcome::Matched(_)) {
            self.remove_highlight(document);
        }
        Ok(outcome)
    }
}

/// Validates an untrusted `{id: "..."}` element reference.
fn parse_element_ref(element: Option<&Value>) -> Result<ElementId> {
    match element {
        Some(Value::Object(fields)) => ElementId::from_value(fields.get("id")),
        None | Some(Value::Null) => Err(Error::malformed("element reference is missing")),
        Some(other) => Err(Error::malformed(format!(
            "element reference must be an object, got {other}"
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================
