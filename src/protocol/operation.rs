//! The transport-agnostic operation table.
//!
//! | Tag | Arguments | Result fields |
//! |-----|-----------|---------------|
//! | `GET_ANNOTATED_HTML` | none | `annotatedHTML` |
//! | `HIGHLIGHT_ELEMENT` | `element: {id}` | `success` |
//! | `REMOVE_HIGHLIGHT` | none | `success` |
//! | `SETUP_CLICK_LISTENER` | `elementId` | `success` |
//!
//! Arguments are kept as raw JSON here; validation happens when the
//! operation executes so every shape violation ends up as `success: false`.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value, json};

use crate::annotation::AnnotatedElement;

// ============================================================================
// Constants
// ============================================================================

/// Result field carrying the annotated element sequence.
pub const ANNOTATED_HTML_FIELD: &str = "annotatedHTML";

/// Result field carrying the status flag.
pub const SUCCESS_FIELD: &str = "success";

/// Suffix of page-channel request tags.
pub const REQUEST_SUFFIX: &str = "_REQUEST";

/// Suffix of page-channel response tags.
pub const RESPONSE_SUFFIX: &str = "_RESPONSE";

// ============================================================================
// OperationKind
// ============================================================================

/// Operation discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Annotate the current document.
    GetAnnotatedHtml,
    /// Highlight one element.
    HighlightElement,
    /// Clear the highlight (and any click capture).
    RemoveHighlight,
    /// Arm the click capture for one element.
    SetupClickListener,
}

impl OperationKind {
    /// Every operation, in table order.
    pub const ALL: [Self; 4] = [
        Self::GetAnnotatedHtml,
        Self::HighlightElement,
        Self::RemoveHighlight,
        Self::SetupClickListener,
    ];

    /// Host-channel tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::GetAnnotatedHtml => "GET_ANNOTATED_HTML",
            Self::HighlightElement => "HIGHLIGHT_ELEMENT",
            Self::RemoveHighlight => "REMOVE_HIGHLIGHT",
            Self::SetupClickListener => "SETUP_CLICK_LISTENER",
        }
    }

    /// Looks up an operation by host-channel tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Page-channel request tag, e.g. `HIGHLIGHT_ELEMENT_REQUEST`.
    #[must_use]
    pub fn request_tag(self) -> String {
        format!("{}{REQUEST_SUFFIX}", self.tag())
    }

    /// Page-channel response tag, e.g. `HIGHLIGHT_ELEMENT_RESPONSE`.
    #[must_use]
    pub fn response_tag(self) -> String {
        format!("{}{RESPONSE_SUFFIX}", self.tag())
    }

    /// Returns `true` if the operation suspends before answering.
    #[inline]
    #[must_use]
    pub const fn is_async(self) -> bool {
        matches!(self, Self::GetAnnotatedHtml)
    }
}

// ============================================================================
// Operation
// ============================================================================

/// A request for one operation, with its untrusted arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// `GET_ANNOTATED_HTML`
    GetAnnotatedHtml,
    /// `HIGHLIGHT_ELEMENT`
    HighlightElement {
        /// Element reference, expected to be `{"id": "..."}`.
        element: Option<Value>,
    },
    /// `REMOVE_HIGHLIGHT`
    RemoveHighlight,
    /// `SETUP_CLICK_LISTENER`
    SetupClickListener {
        /// Target lookup id, expected to be a string.
        element_id: Option<Value>,
    },
}

impl Operation {
    /// Builds an operation from a message object's argument fields.
    #[must_use]
    pub fn from_fields(kind: OperationKind, fields: &Map<String, Value>) -> Self {
        match kind {
            OperationKind::GetAnnotatedHtml => Self::GetAnnotatedHtml,
            OperationKind::HighlightElement => Self::HighlightElement {
                element: fields.get("element").cloned(),
            },
            OperationKind::RemoveHighlight => Self::RemoveHighlight,
            OperationKind::SetupClickListener => Self::SetupClickListener {
                element_id: fields.get("elementId").cloned(),
            },
        }
    }

    /// Returns the operation discriminator.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::GetAnnotatedHtml => OperationKind::GetAnnotatedHtml,
            Self::HighlightElement { .. } => OperationKind::HighlightElement,
            Self::RemoveHighlight => OperationKind::RemoveHighlight,
            Self::SetupClickListener { .. } => OperationKind::SetupClickListener,
        }
    }

    /// Serializes the arguments as message fields (without `type`).
    #[must_use]
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        match self {
            Self::HighlightElement {
                element: Some(element),
            } => {
                fields.insert("element".to_string(), element.clone());
            }
            Self::SetupClickListener {
                element_id: Some(element_id),
            } => {
                fields.insert("elementId".to_string(), element_id.clone());
            }
            _ => {}
        }
        fields
    }

    /// Convenience constructor for a highlight request by id.
    #[must_use]
    pub fn highlight(id: &str) -> Self {
        Self::HighlightElement {
            element: Some(json!({ "id": id })),
        }
    }

    /// Convenience constructor for a click capture request by id.
    #[must_use]
    pub fn setup_click_listener(id: &str) -> Self {
        Self::SetupClickListener {
            element_id: Some(Value::String(id.to_string())),
        }
    }
}

// ============================================================================
// OperationResult
// ============================================================================

/// Result of one operation, before transport wrapping.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    /// Annotated elements (empty on any failure).
    Annotated(Vec<AnnotatedElement>),
    /// Status flag.
    Status(bool),
}

impl OperationResult {
    /// Returns the status flag, if this is a status result.
    #[inline]
    #[must_use]
    pub fn success(&self) -> Option<bool> {
        match self {
            Self::Status(ok) => Some(*ok),
            Self::Annotated(_) => None,
        }
    }

    /// Converts the result into its wire fields.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        match self {
            Self::Annotated(elements) => {
                let elements = elements
                    .into_iter()
                    .filter_map(|e| serde_json::to_value(e).ok())
                    .collect();
                fields.insert(ANNOTATED_HTML_FIELD.to_string(), Value::Array(elements));
            }
            Self::Status(ok) => {
                fields.insert(SUCCESS_FIELD.to_string(), Value::Bool(ok));
            }
        }
        fields
    }

    /// Converts the result into a host-channel response object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.into_fields())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::identifiers::ElementId;

    #[test]
    fn test_tags() {
        assert_eq!(OperationKind::HighlightElement.tag(), "HIGHLIGHT_ELEMENT");
        assert_eq!(
            OperationKind::SetupClickListener.request_tag(),
            "SETUP_CLICK_LISTENER_REQUEST"
        );
        assert_eq!(
            OperationKind::GetAnnotatedHtml.response_tag(),
            "GET_ANNOTATED_HTML_RESPONSE"
        );
    }

    #[test]
    fn test_from_tag() {
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(OperationKind::from_tag("highlight_element"), None);
        assert_eq!(OperationKind::from_tag("FETCH_API"), None);
    }

    #[test]
    fn test_only_annotation_is_async() {
        let async_ops: Vec<_> = OperationKind::ALL.into_iter().filter(|k| k.is_async()).collect();
        assert_eq!(async_ops, vec![OperationKind::GetAnnotatedHtml]);
    }

    #[test]
    fn test_from_fields_extracts_arguments() {
        let fields = json!({"element": {"id": "3"}, "elementId": "9", "extra": 1});
        let fields = fields.as_object().expect("object");

        assert_eq!(
            Operation::from_fields(OperationKind::HighlightElement, fields),
            Operation::highlight("3")
        );
        assert_eq!(
            Operation::from_fields(OperationKind::SetupClickListener, fields),
            Operation::setup_click_listener("9")
        );
        assert_eq!(
            Operation::from_fields(OperationKind::RemoveHighlight, fields),
            Operation::RemoveHighlight
        );
    }

    #[test]
    fn test_result_fields() {
        assert_eq!(OperationResult::Status(true).into_value(), json!({"success": true}));

        let element = AnnotatedElement::new(ElementId::new("1").expect("id")).with("tag", "a");
        assert_eq!(
            OperationResult::Annotated(vec![element]).into_value(),
            json!({"annotatedHTML": [{"id": "1", "tag": "a"}]})
        );
        assert_eq!(
            OperationResult::Annotated(Vec::new()).into_value(),
            json!({"annotatedHTML": []})
        );
    }
}
