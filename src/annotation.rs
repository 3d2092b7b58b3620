//! Annotation service contract.
//!
//! The annotation algorithm lives outside the bridge. It walks a document
//! and returns one [`AnnotatedElement`] per interesting node, in traversal
//! order, having tagged each node with its lookup attribute.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dom::Document;
use crate::error::Result;
use crate::identifiers::ElementId;

// ============================================================================
// AnnotatedElement
// ============================================================================

/// One annotated node.
///
/// Serializes as a flat object: `{"id": "...", "tag": "button", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedElement {
    /// Lookup id written onto the node.
    pub id: ElementId,

    /// Descriptive metadata (tag, text, role, ...), opaque to the bridge.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl AnnotatedElement {
    /// Creates an element with no metadata.
    #[inline]
    #[must_use]
    pub fn new(id: ElementId) -> Self {
        Self {
            id,
            metadata: Map::new(),
        }
    }

    /// Adds one metadata field.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Annotator
// ============================================================================

/// The annotation service.
#[async_trait]
pub trait Annotator: Send + Sync {
    /// Annotates `document` and returns the elements in traversal order.
    async fn create_annotated_html(&self, document: &dyn Document) -> Result<Vec<AnnotatedElement>>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_metadata_is_flattened() {
        let element = AnnotatedElement::new(ElementId::new("7").expect("id"))
            .with("tag", "button")
            .with("text", "Join");

        let value = serde_json::to_value(&element).expect("serialize");
        assert_eq!(value, json!({"id": "7", "tag": "button", "text": "Join"}));
    }

    #[test]
    fn test_deserialize_keeps_unknown_fields() {
        let element: AnnotatedElement =
            serde_json::from_value(json!({"id": "a", "aria": {"role": "link"}})).expect("parse");
        assert_eq!(element.id.as_str(), "a");
        assert_eq!(element.metadata.get("aria"), Some(&json!({"role": "link"})));
    }
}
