//! Page-side client with `requestId` correlation.
//!
//! [`PageClient`] plays the page script: it posts `<OP>_REQUEST` messages
//! and matches `<OP>_RESPONSE` messages back to callers by `requestId`.
//! Unsolicited events go to the registered [`EventHandler`].
//!
//! # Listener Loop
//!
//! The client spawns a tokio task that handles:
//!
//! - Responses (correlated by `requestId`)
//! - Events (`ELEMENT_CLICKED`)
//! - Failing pending requests once the bridge goes away

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::annotation::AnnotatedElement;
use crate::error::{Error, Result};
use crate::fetch::{FetchOutcome, FetchParams};
use crate::identifiers::RequestId;
use crate::protocol::operation::{ANNOTATED_HTML_FIELD, RESPONSE_SUFFIX, SUCCESS_FIELD};
use crate::protocol::{FETCH_API_REQUEST, Operation, PageEvent, request_envelope};

use super::page::PageChannel;

// ============================================================================
// Constants
// ============================================================================

/// Default time to wait for a response.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum pending requests before rejecting new ones.
const MAX_PENDING_REQUESTS: usize = 100;

// ============================================================================
// Types
// ============================================================================

/// Map of request ids to response channels.
type CorrelationMap = FxHashMap<String, oneshot::Sender<Value>>;

/// Event handler callback type.
///
/// Called for each event the bridge posts.
pub type EventHandler = Box<dyn Fn(PageEvent) + Send + Sync>;

// ============================================================================
// PageClient
// ============================================================================

/// Page-side client for the bridge.
///
/// # Thread Safety
///
/// `PageClient` is `Send + Sync`; clones share the correlation map and
/// event handler.
#[derive(Clone)]
pub struct PageClient {
    /// Outbound page channel.
    channel: PageChannel,
    /// Correlation map (shared with the listener).
    correlation: Arc<Mutex<CorrelationMap>>,
    /// Event handler (shared with the listener).
    event_handler: Arc<Mutex<Option<EventHandler>>>,
}

impl PageClient {
    /// Creates a client over `channel`, reading bridge posts from `posts`.
    ///
    /// Spawns the listener task internally.
    #[must_use]
    pub fn new(channel: PageChannel, posts: mpsc::UnboundedReceiver<Value>) -> Self {
        let correlation = Arc::new(Mutex::new(CorrelationMap::default()));
        let event_handler: Arc<Mutex<Option<EventHandler>>> = Arc::new(Mutex::new(None));

        tokio::spawn(Self::run_listener(
            posts,
            Arc::clone(&correlation),
            Arc::clone(&event_handler),
        ));

        Self {
            channel,
            correlation,
            event_handler,
        }
    }

    /// Sets the event handler callback.
    pub fn set_event_handler(&self, handler: EventHandler) {
        *self.event_handler.lock() = Some(handler);
    }

    /// Clears the event handler.
    pub fn clear_event_handler(&self) {
        *self.event_handler.lock() = None;
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.lock().len()
    }

    /// Sends a request and waits for the response with the default timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the bridge has gone away
    /// - [`Error::RequestTimeout`] if no response arrives in 30s
    /// - [`Error::Protocol`] if too many requests are pending
    pub async fn request(&self, tag: &str, fields: Map<String, Value>) -> Result<Value> {
        self.request_with_timeout(tag, fields, DEFAULT_REQUEST_TIMEOUT)
            .await
    }

    /// Sends a request and waits for the response.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the bridge has gone away
    /// - [`Error::RequestTimeout`] if no response arrives in time
    /// - [`Error::Protocol`] if too many requests are pending
    pub async fn request_with_timeout(
        &self,
        tag: &str,
        fields: Map<String, Value>,
        request_timeout: Duration,
    ) -> Result<Value> {
        let request_id = RequestId::generate();
        let key = request_id.to_string();
        let (response_tx, response_rx) = oneshot::channel();

        {
            let mut correlation = self.correlation.lock();
            if correlation.len() >= MAX_PENDING_REQUESTS {
                warn!(
                    pending = correlation.len(),
                    max = MAX_PENDING_REQUESTS,
                    "Too many pending requests"
                );
                return Err(Error::protocol(format!(
                    "Too many pending requests: {}/{}",
                    correlation.len(),
                    MAX_PENDING_REQUESTS
                )));
            }
            correlation.insert(key.clone(), response_tx);
        }

        if let Err(e) = self
            .channel
            .post(request_envelope(tag, &request_id, fields))
        {
            self.correlation.lock().remove(&key);
            return Err(e);
        }
        trace!(%request_id, tag, "Request posted");

        match timeout(request_timeout, response_rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                self.correlation.lock().remove(&key);
                Err(Error::request_timeout(
                    request_id,
                    request_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Sends one operation and returns the raw response.
    async fn operation(&self, operation: &Operation) -> Result<Value> {
        self.request(&operation.kind().request_tag(), operation.to_fields())
            .await
    }

    /// Requests the annotated element list.
    ///
    /// # Errors
    ///
    /// Returns transport errors, or [`Error::Json`] for a malformed list.
    pub async fn get_annotated_html(&self) -> Result<Vec<AnnotatedElement>> {
        let mut response = self.operation(&Operation::GetAnnotatedHtml).await?;
        let elements = response
            .get_mut(ANNOTATED_HTML_FIELD)
            .map(Value::take)
            .unwrap_or_else(|| Value::Array(Vec::new()));
        Ok(serde_json::from_value(elements)?)
    }

    /// Highlights the element with lookup id `element_id`.
    ///
    /// # Errors
    ///
    /// Returns transport errors, or [`Error::Protocol`] if the response
    /// carries no `success` flag.
    pub async fn highlight(&self, element_id: &str) -> Result<bool> {
        let response = self.operation(&Operation::highlight(element_id)).await?;
        success_flag(&response)
    }

    /// Clears the highlight and any click capture.
    ///
    /// # Errors
    ///
    /// Same as [`PageClient::highlight`].
    pub async fn remove_highlight(&self) -> Result<bool> {
        let response = self.operation(&Operation::RemoveHighlight).await?;
        success_flag(&response)
    }

    /// Arms a one-shot click capture for `element_id`.
    ///
    /// # Errors
    ///
    /// Same as [`PageClient::highlight`].
    pub async fn setup_click_listener(&self, element_id: &str) -> Result<bool> {
        let response = self
            .operation(&Operation::setup_click_listener(element_id))
            .await?;
        success_flag(&response)
    }

    /// Proxies an HTTP request through the bridge.
    ///
    /// HTTP and network failures come back as an unsuccessful outcome, not
    /// as an error.
    ///
    /// # Errors
    ///
    /// Returns transport errors, or [`Error::Json`] for a malformed response.
    pub async fn fetch(&self, params: &FetchParams) -> Result<FetchOutcome> {
        let response = self.request(FETCH_API_REQUEST, params.to_fields()).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Listener loop over bridge posts.
    async fn run_listener(
        mut posts: mpsc::UnboundedReceiver<Value>,
        correlation: Arc<Mutex<CorrelationMap>>,
        event_handler: Arc<Mutex<Option<EventHandler>>>,
    ) {
        while let Some(message) = posts.recv().await {
            Self::handle_post(message, &correlation, &event_handler);
        }

        Self::fail_pending_requests(&correlation);
        debug!("Page listener terminated");
    }

    /// Routes one bridge post to a waiting caller or the event handler.
    fn handle_post(
        message: Value,
        correlation: &Arc<Mutex<CorrelationMap>>,
        event_handler: &Arc<Mutex<Option<EventHandler>>>,
    ) {
        if let Some(event) = PageEvent::parse(&message) {
            if let Some(handler) = event_handler.lock().as_ref() {
                handler(event);
            }
            return;
        }

        let is_response = message
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|tag| tag.ends_with(RESPONSE_SUFFIX));
        let request_id = message
            .get("requestId")
            .and_then(Value::as_str)
            .map(str::to_owned);

        match (is_response, request_id) {
            (true, Some(request_id)) => {
                let tx = correlation.lock().remove(&request_id);
                match tx {
                    Some(tx) => {
                        let _ = tx.send(message);
                    }
                    None => warn!(%request_id, "Response for unknown request"),
                }
            }
            _ => trace!(%message, "Ignoring page post"),
        }
    }

    /// Drops all pending senders so waiting callers see `ConnectionClosed`.
    fn fail_pending_requests(correlation: &Arc<Mutex<CorrelationMap>>) {
        let pending: Vec<_> = correlation.lock().drain().collect();
        if !pending.is_empty() {
            debug!(count = pending.len(), "Failed pending requests on shutdown");
        }
    }
}

/// Reads the `success` flag of a status response.
fn success_flag(response: &Value) -> Result<bool> {
    response
        .get(SUCCESS_FIELD)
        .and_then(Value::as_bool)
        .ok_or_else(|| Error::protocol(format!("response has no success flag: {response}")))
}

// ============================================================================
// Tests
// ============================================================================
