//! Inbound message parsing and response envelopes.
//!
//! Host channel request:
//! ```json
//! { "type": "HIGHLIGHT_ELEMENT", "element": { "id": "12" } }
//! ```
//!
//! Page channel request and response:
//! ```json
//! { "type": "HIGHLIGHT_ELEMENT_REQUEST", "requestId": "r-1", "element": { "id": "12" } }
//! { "type": "HIGHLIGHT_ELEMENT_RESPONSE", "requestId": "r-1", "success": true }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value};

use crate::fetch::FetchParams;
use crate::identifiers::RequestId;

use super::operation::{Operation, OperationKind, REQUEST_SUFFIX};

// ============================================================================
// Constants
// ============================================================================

/// Page-channel fetch proxy request tag.
pub const FETCH_API_REQUEST: &str = "FETCH_API_REQUEST";

/// Page-channel fetch proxy response tag.
pub const FETCH_API_RESPONSE: &str = "FETCH_API_RESPONSE";

/// Message type field.
pub const TYPE_FIELD: &str = "type";

/// Correlation id field.
pub const REQUEST_ID_FIELD: &str = "requestId";

// ============================================================================
// Host Messages
// ============================================================================

/// Parses a host-channel message.
///
/// Returns `None` for non-objects and unknown or missing `type` tags.
#[must_use]
pub fn parse_host_message(message: &Value) -> Option<Operation> {
    let fields = message.as_object()?;
    let kind = OperationKind::from_tag(message_type(fields)?)?;
    Some(Operation::from_fields(kind, fields))
}

// ============================================================================
// Page Messages
// ============================================================================

/// A recognized page-channel request.
#[derive(Debug, Clone, PartialEq)]
pub enum PageRequest {
    /// One of the shared operations.
    Operation {
        /// Caller correlation id.
        request_id: Option<RequestId>,
        /// Operation with its arguments.
        operation: Operation,
    },

    /// `FETCH_API_REQUEST`
    Fetch {
        /// Caller correlation id.
        request_id: Option<RequestId>,
        /// Raw fetch arguments.
        params: FetchParams,
    },
}

impl PageRequest {
    /// Parses a page-channel message.
    ///
    /// Returns `None` for anything that is not a request this bridge
    /// serves, including its own responses and events.
    #[must_use]
    pub fn parse(message: &Value) -> Option<Self> {
        let fields = message.as_object()?;
        let tag = message_type(fields)?;
        let request_id = RequestId::from_value(fields.get(REQUEST_ID_FIELD));

        if tag == FETCH_API_REQUEST {
            return Some(Self::Fetch {
                request_id,
                params: FetchParams::from_fields(fields),
            });
        }

        let kind = OperationKind::from_tag(tag.strip_suffix(REQUEST_SUFFIX)?)?;
        Some(Self::Operation {
            request_id,
            operation: Operation::from_fields(kind, fields),
        })
    }

    /// Returns the caller correlation id.
    #[must_use]
    pub fn request_id(&self) -> Option<&RequestId> {
        match self {
            Self::Operation { request_id, .. } | Self::Fetch { request_id, .. } => {
                request_id.as_ref()
            }
        }
    }

    /// Returns the tag of the matching response.
    #[must_use]
    pub fn response_tag(&self) -> String {
        match self {
            Self::Operation { operation, .. } => operation.kind().response_tag(),
            Self::Fetch { .. } => FETCH_API_RESPONSE.to_string(),
        }
    }
}

// ============================================================================
// Envelopes
// ============================================================================

/// Builds a page-channel request message.
#[must_use]
pub fn request_envelope(tag: &str, request_id: &RequestId, fields: Map<String, Value>) -> Value {
    envelope(tag, request_id, fields)
}

/// Builds a page-channel response message.
///
/// `type` and `requestId` always win over same-named result fields.
#[must_use]
pub fn response_envelope(tag: &str, request_id: &RequestId, fields: Map<String, Value>) -> Value {
    envelope(tag, request_id, fields)
}

fn envelope(tag: &str, request_id: &RequestId, mut fields: Map<String, Value>) -> Value {
    fields.insert(TYPE_FIELD.to_string(), Value::String(tag.to_string()));
    fields.insert(REQUEST_ID_FIELD.to_string(), request_id.as_value().clone());
    Value::Object(fields)
}

/// Reads the `type` tag of a message object.
#[inline]
pub(crate) fn message_type(fields: &Map<String, Value>) -> Option<&str> {
    fields.get(TYPE_FIELD).and_then(Value::as_str)
}

// ============================================================================
// Tests
// ============================================================================
