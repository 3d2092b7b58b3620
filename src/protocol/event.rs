//! Unsolicited page-channel events.
//!
//! Events are posted without a preceding request and carry no
//! correlation id.
//!
//! | Type | Fields | Emitted when |
//! |------|--------|--------------|
//! | `ELEMENT_CLICKED` | `elementId` | An armed click capture matched |

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Value, json};

use crate::identifiers::ElementId;

use super::message::message_type;

// ============================================================================
// Constants
// ============================================================================

/// Click capture notification tag.
pub const ELEMENT_CLICKED: &str = "ELEMENT_CLICKED";

// ============================================================================
// PageEvent
// ============================================================================

/// An event posted by the bridge to the page channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// The armed capture target was clicked.
    ElementClicked {
        /// Lookup id of the clicked element.
        element_id: ElementId,
    },
}

impl PageEvent {
    /// Returns the wire tag.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ElementClicked { .. } => ELEMENT_CLICKED,
        }
    }

    /// Serializes the event as a page message.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::ElementClicked { element_id } => json!({
                "type": ELEMENT_CLICKED,
                "elementId": element_id.as_str(),
            }),
        }
    }

    /// Parses a page message as an event.
    ///
    /// Returns `None` for requests, responses and malformed events.
    #[must_use]
    pub fn parse(message: &Value) -> Option<Self> {
        let fields = message.as_object()?;
        match message_type(fields)? {
            ELEMENT_CLICKED => {
                let element_id = ElementId::from_value(fields.get("elementId")).ok()?;
                Some(Self::ElementClicked { element_id })
            }
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
