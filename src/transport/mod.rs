//! In-process transport layer.
//!
//! Both channels are tokio mpsc queues standing in for the browser's
//! messaging primitives.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   HostChannel    ┌─────────────────┐   PageChannel    ┌─────────────────┐
//! │  Extension      │ ───────────────► │     Bridge      │ ◄─────────────── │  Page script    │
//! │  (host side)    │ ◄─── responder ─ │                 │ ── page sink ──► │  (PageClient)   │
//! └─────────────────┘                  └─────────────────┘                  └─────────────────┘
//! ```
//!
//! # Channel Lifecycle
//!
//! 1. `host_channel` / `page_channel` - Create the inbound queues
//! 2. `Bridge::builder().page_sink(tx)` - Wire the outbound page queue
//! 3. `serve_host` / `serve_page` - Run one loop per channel
//! 4. Dropping every sender ends the loop
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `host` | Host channel with per-message responders |
//! | `page` | Page channel with source tagging |
//! | `client` | Page-side client with `requestId` correlation |

// ============================================================================
// Submodules
// ============================================================================

/// Page-side request/response client.
pub mod client;

/// Host channel (runtime messaging).
pub mod host;

/// Page channel (window messaging).
pub mod page;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{EventHandler, PageClient};
pub use host::{HostChannel, HostRequest, HostResponder, host_channel, serve_host};
pub use page::{MessageSource, PageChannel, PageMessage, page_channel, serve_page};
