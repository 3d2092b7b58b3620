//! Error types for the content bridge.
//!
//! Every fallible operation returns [`Result<T>`] which uses [`Error`].
//! Operation failures never escape the bridge: the router maps them onto the
//! `success` flag (and, for the fetch proxy, an `error` string) before
//! anything reaches a transport.
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Operation | [`Error::NotFound`], [`Error::Unavailable`], [`Error::Malformed`], [`Error::Internal`] |
//! | Fetch proxy | [`Error::Fetch`], [`Error::Http`] |
//! | Configuration | [`Error::Config`] |
//! | Channel | [`Error::ConnectionClosed`], [`Error::RequestTimeout`] |
//! | Protocol | [`Error::Protocol`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::{ElementId, RequestId};

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Operation Errors
    // ========================================================================
    /// No live node carries the lookup attribute for this id.
    ///
    /// The DOM changed since annotation; this is not a fault.
    #[error("Element not found: {element_id}")]
    NotFound {
        /// The id that failed to resolve.
        element_id: ElementId,
    },

    /// A collaborator service is not loaded.
    #[error("Service unavailable: {service}")]
    Unavailable {
        /// Name of the missing service.
        service: String,
    },

    /// Missing or invalid request field.
    ///
    /// Returned for every shape violation found at the untrusted boundary.
    #[error("Malformed request: {message}")]
    Malformed {
        /// What was wrong with the request.
        message: String,
    },

    /// Unexpected failure inside styling, scrolling or listener attachment.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // Fetch Errors
    // ========================================================================
    /// Proxied fetch failed after the request was accepted.
    #[error("Fetch failed: {message}")]
    Fetch {
        /// Underlying failure message.
        message: String,
    },

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Bridge configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Channel Errors
    // ========================================================================
    /// The other end of a transport went away.
    #[error("Connection closed")]
    ConnectionClosed,

    /// A page-side request got no response in time.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The correlation id that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or unexpected envelope.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an element not found error.
    #[inline]
    pub fn not_found(element_id: ElementId) -> Self {
        Self::NotFound { element_id }
    }

    /// Creates a service unavailable error.
    #[inline]
    pub fn unavailable(service: impl Into<String>) -> Self {
        Self::Unavailable {
            service: service.into(),
        }
    }

    /// Creates a malformed request error.
    #[inline]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a fetch error.
    #[inline]
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if the target element did not resolve.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if a collaborator service was missing.
    #[inline]
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Returns `true` if the request failed validation.
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// Returns `true` if this is an unexpected internal failure.
    #[inline]
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns `true` if this is a channel error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionClosed | Self::RequestTimeout { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
