//! Bridge protocol message types.
//!
//! Both channels share one operation table and differ only in framing.
//!
//! # Protocol Overview
//!
//! | Message | Channel | Direction | Format |
//! |---------|---------|-----------|--------|
//! | Request | Host | Extension → Bridge | `{type: OP, ...args}` |
//! | Response | Host | Bridge → Extension | callback with result object |
//! | Request | Page | Page → Bridge | `{type: OP_REQUEST, requestId?, ...args}` |
//! | Response | Page | Bridge → Page | `{type: OP_RESPONSE, requestId, ...result}` |
//! | Event | Page | Bridge → Page | `{type: ELEMENT_CLICKED, elementId}` |
//!
//! `FETCH_API_REQUEST` / `FETCH_API_RESPONSE` exist on the page channel only.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `operation` | Operation table and results |
//! | `message` | Inbound parsing and envelopes |
//! | `event` | Unsolicited page events |

// ============================================================================
// Submodules
// ============================================================================

/// Unsolicited page events.
pub mod event;

/// Inbound message parsing and envelopes.
pub mod message;

/// Operation table and results.
pub mod operation;

// ============================================================================
// Re-exports
// ============================================================================

pub use event::{ELEMENT_CLICKED, PageEvent};
pub use message::{
    FETCH_API_REQUEST, FETCH_API_RESPONSE, PageRequest, parse_host_message, request_envelope,
    response_envelope,
};
pub use operation::{Operation, OperationKind, OperationResult};
