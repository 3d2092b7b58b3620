//! Type-safe identifiers.
//!
//! | Type | Origin | Meaning |
//! |------|--------|---------|
//! | [`ElementId`] | Annotation service | Value of the lookup attribute on a node |
//! | [`RequestId`] | Page caller | Opaque correlation token, echoed verbatim |
//! | [`ListenerId`] | Document | Registration handle of a click listener |
//! | [`NodeId`] | Document | Handle to a live node |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};

// ============================================================================
// ElementId
// ============================================================================

/// Identifier assigned to a node by the annotation service.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElementId(String);

impl ElementId {
    /// Creates an element id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::malformed("element id is empty"));
        }
        Ok(Self(id))
    }

    /// Reads an element id from an untrusted JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] unless `value` is a non-empty string.
    pub fn from_value(value: Option<&Value>) -> Result<Self> {
        match value {
            Some(Value::String(s)) => Self::new(s.as_str()),
            Some(other) => Err(Error::malformed(format!(
                "element id must be a string, got {other}"
            ))),
            None => Err(Error::malformed("element id is missing")),
        }
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ElementId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// RequestId
// ============================================================================

/// Caller-supplied correlation identifier.
///
/// The bridge never interprets it. Any non-null JSON value is accepted and
/// echoed back exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Value);

impl RequestId {
    /// Extracts a correlation id from an untrusted field.
    ///
    /// Returns `None` when the field is absent or `null`.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Option<Self> {
        match value {
            None | Some(Value::Null) => None,
            Some(v) => Some(Self(v.clone())),
        }
    }

    /// Generates a fresh string id (used by page-side callers).
    #[must_use]
    pub fn generate() -> Self {
        Self(Value::String(Uuid::new_v4().to_string()))
    }

    /// Returns the id if it is a string.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// Returns the raw JSON value.
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(Value::String(s.to_string()))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

// ============================================================================
// ListenerId
// ============================================================================

/// Handle returned by a document when a click listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Generates a new random listener id.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// NodeId
// ============================================================================

/// Handle to a node inside a [`Document`](crate::dom::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Wraps a raw node handle.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw handle.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_element_id_rejects_empty() {
        assert!(ElementId::new("").is_err());
        assert_eq!(ElementId::new("a1").expect("valid").as_str(), "a1");
    }

    #[test]
    fn test_element_id_from_value() {
        let ok = ElementId::from_value(Some(&json!("submit")));
        assert_eq!(ok.expect("valid").as_str(), "submit");

        assert!(ElementId::from_value(Some(&json!(42))).is_err());
        assert!(ElementId::from_value(Some(&json!(""))).is_err());
        assert!(ElementId::from_value(None).is_err());
    }

    #[test]
    fn test_element_id_deserialize_checks_empty() {
        assert!(serde_json::from_str::<ElementId>(r#""""#).is_err());
        let id: ElementId = serde_json::from_str(r#""x""#).expect("parse");
        assert_eq!(id.as_str(), "x");
    }

    #[test]
    fn test_request_id_null_is_absent() {
        assert!(RequestId::from_value(None).is_none());
        assert!(RequestId::from_value(Some(&Value::Null)).is_none());
    }

    #[test]
    fn test_request_id_echoes_verbatim() {
        let id = RequestId::from_value(Some(&json!(17))).expect("present");
        assert_eq!(serde_json::to_value(&id).expect("serialize"), json!(17));
        assert_eq!(id.to_string(), "17");
        assert!(id.as_str().is_none());
    }

    #[test]
    fn test_generated_request_ids_differ() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().is_some());
    }

    #[test]
    fn test_listener_ids_unique() {
        assert_ne!(ListenerId::generate(), ListenerId::generate());
    }
}
