//! Page channel adapter.
//!
//! Page requests carry `<OP>_REQUEST` plus an optional `requestId`.
//! Responses echo the id verbatim. Without an id the operation still runs
//! but nothing is posted back, except for fetches, which are skipped.
//!
//! Fetches run on their own task so a slow upstream never holds up the
//! messages behind it. Every other request completes before the next
//! message is read.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, trace, warn};

use crate::protocol::{PageRequest, response_envelope};
use crate::transport::{MessageSource, PageMessage};

use super::Bridge;

// ============================================================================
// Page Adapter
// ============================================================================

impl Bridge {
    /// Handles one page-channel message.
    ///
    /// Returns `true` if a response was posted, or will be once a spawned
    /// fetch completes.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn handle_page_message(&self, message: PageMessage) -> bool {
        if message.source != MessageSource::Window {
            trace!("Ignoring message from foreign source");
            return false;
        }

        let Some(request) = PageRequest::parse(&message.data) else {
            trace!("Ignoring page message that is not a bridge request");
            return false;
        };
        let response_tag = request.response_tag();

        match request {
            PageRequest::Fetch {
                request_id: None, ..
            } => {
                warn!("Fetch request without requestId dropped");
                false
            }

            PageRequest::Fetch {
                request_id: Some(request_id),
                params,
            } => {
                let bridge = self.clone();
                tokio::spawn(async move {
                    let outcome = bridge.inner.fetch.execute(&params).await;
                    bridge.post(response_envelope(
                        &response_tag,
                        &request_id,
                        outcome.into_fields(),
                    ));
                });
                true
            }

            PageRequest::Operation {
                request_id,
                operation,
            } => {
                let result = self.execute(operation).await;
                match request_id {
                    Some(request_id) => {
                        self.post(response_envelope(
                            &response_tag,
                            &request_id,
                            result.into_fields(),
                        ));
                        true
                    }
                    None => {
                        debug!(response = %response_tag, "No requestId, response not posted");
                        false
                    }
                }
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
    use std::time::Duration;

    use serde_json::{Value, json};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

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

    #[tokio::test]
    async fn test_response_echoes_request_id() {
        let (bridge, _doc, mut rx) = bridge();
        let posted = bridge
            .handle_page_message(PageMessage::window(json!({
                "type": "REMOVE_HIGHLIGHT_REQUEST",
                "requestId": "abc"
            })))
            .await;

        assert!(posted);
        assert_eq!(
            rx.try_recv().expect("response"),
            json!({"type": "REMOVE_HIGHLIGHT_RESPONSE", "requestId": "abc", "success": true})
        );
    }

    #[tokio::test]
    async fn test_foreign_source_ignored() {
        let (bridge, doc, mut rx) = bridge();
        let posted = bridge
            .handle_page_message(PageMessage::new(
                MessageSource::Foreign,
                json!({"type": "SETUP_CLICK_LISTENER_REQUEST", "requestId": "1", "elementId": "x"}),
            ))
            .await;

        assert!(!posted);
        assert!(rx.try_recv().is_err());
        assert_eq!(doc.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_request_id_runs_without_reply() {
        let (bridge, doc, mut rx) = bridge();
        let posted = bridge
            .handle_page_message(PageMessage::window(json!({
                "type": "SETUP_CLICK_LISTENER_REQUEST",
                "elementId": "x"
            })))
            .await;

        assert!(!posted);
        assert!(rx.try_recv().is_err());
        assert_eq!(doc.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_without_request_id_is_skipped() {
        let (bridge, _doc, mut rx) = bridge();
        let posted = bridge
            .handle_page_message(PageMessage::window(json!({
                "type": "FETCH_API_REQUEST",
                "url": "ftp://nowhere.test"
            })))
            .await;

        assert!(!posted);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_fetch_validation_failure_is_reported() {
        let (bridge, _doc, mut rx) = bridge();
        let posted = bridge
            .handle_page_message(PageMessage::window(json!({
                "type": "FETCH_API_REQUEST",
                "requestId": 12,
                "url": "ftp://nowhere.test"
            })))
            .await;

        assert!(posted);
        assert_eq!(
            rx.recv().await.expect("response"),
            json!({
                "type": "FETCH_API_RESPONSE",
                "requestId": 12,
                "success": false,
                "error": "unsupported url scheme: ftp"
            })
        );
    }

    #[tokio::test]
    async fn test_pending_fetch_does_not_block_later_requests() {
        let (bridge, _doc, mut rx) = bridge();

        // Accepts the connection and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        let _silent = tokio::spawn(async move {
            let conn = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(conn);
        });

        let fetch = timeout(
            Duration::from_secs(1),
            bridge.handle_page_message(PageMessage::window(json!({
                "type": "FETCH_API_REQUEST",
                "requestId": "slow",
                "url": format!("http://{addr}/hang")
            }))),
        )
        .await;
        assert_eq!(fetch, Ok(true));

        bridge
            .handle_page_message(PageMessage::window(json!({
                "type": "REMOVE_HIGHLIGHT_REQUEST",
                "requestId": "next"
            })))
            .await;

        let response = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("reply in time")
            .expect("response");
        assert_eq!(
            response,
            json!({"type": "REMOVE_HIGHLIGHT_RESPONSE", "requestId": "next", "success": true})
        );
    }

    #[tokio::test]
    async fn test_own_responses_are_ignored() {
        let (bridge, _doc, mut rx) = bridge();
        let posted = bridge
            .handle_page_message(PageMessage::window(json!({
                "type": "HIGHLIGHT_ELEMENT_RESPONSE",
                "requestId": "1",
                "success": true
            })))
            .await;

        assert!(!posted);
        assert!(rx.try_recv().is_err());
    }
}
