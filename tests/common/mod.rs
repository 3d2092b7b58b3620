//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Once};

use async_trait::async_trait;
use content_bridge::transport::{
    HostChannel, host_channel, page_channel, serve_host, serve_page,
};
use content_bridge::{
    AnnotatedElement, Annotator, Bridge, BridgeConfig, Document, ElementId, MemoryDocument,
    PageClient, Result,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a test subscriber honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Annotator that returns a fixed list of ids.
pub struct StaticAnnotator {
    ids: Vec<&'static str>,
}

impl StaticAnnotator {
    pub fn new(ids: &[&'static str]) -> Self {
        Self { ids: ids.to_vec() }
    }
}

#[async_trait]
impl Annotator for StaticAnnotator {
    async fn create_annotated_html(&self, _document: &dyn Document) -> Result<Vec<AnnotatedElement>> {
        self.ids
            .iter()
            .map(|id| Ok(AnnotatedElement::new(ElementId::new(*id)?).with("tag", "button")))
            .collect()
    }
}

/// A bridge wired to both channels.
pub struct Harness {
    pub document: Arc<MemoryDocument>,
    pub bridge: Bridge,
    pub host: HostChannel,
    pub client: PageClient,
}

impl Harness {
    /// Builds a harness over a document with `ids` as `data-id` buttons.
    pub fn new(ids: &[&'static str], with_annotator: bool) -> Self {
        Self::with_config(ids, with_annotator, BridgeConfig::default())
    }

    pub fn with_config(ids: &[&'static str], with_annotator: bool, config: BridgeConfig) -> Self {
        init_tracing();

        let document = Arc::new(MemoryDocument::new());
        for id in ids {
            document.append_element(document.body(), "button", &[("data-id", *id)]);
        }

        let (page_tx, page_rx) = mpsc::unbounded_channel();
        let mut builder = Bridge::builder()
            .document(Arc::clone(&document))
            .config(config)
            .page_sink(page_tx);
        if with_annotator {
            builder = builder.annotator(Arc::new(StaticAnnotator::new(ids)));
        }
        let bridge = builder.build().expect("bridge");

        let (host, host_rx) = host_channel();
        tokio::spawn(serve_host(bridge.clone(), host_rx));

        let (channel, page_inbound) = page_channel();
        tokio::spawn(serve_page(bridge.clone(), page_inbound));

        let client = PageClient::new(channel, page_rx);

        Self {
            document,
            bridge,
            host,
            client,
        }
    }

    /// Returns the node carrying `data-id="id"`.
    pub fn node(&self, id: &str) -> content_bridge::NodeId {
        self.document
            .query_selector(&format!("[data-id=\"{id}\"]"))
            .expect("query")
            .expect("node exists")
    }

    /// Simulates a user click and forwards it to the bridge.
    pub fn click(&self, target: content_bridge::NodeId) -> Vec<Option<ElementId>> {
        self.document
            .click(target)
            .into_iter()
            .map(|event| self.bridge.handle_click(event))
            .collect()
    }
}

/// Serves exactly one HTTP response.
///
/// Returns the bound address and a receiver yielding the raw request text.
pub async fn one_shot_http(
    status_line: &'static str,
    body: &'static str,
) -> (SocketAddr, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (request_tx, request_rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let Ok(request) = read_request(&mut socket).await else {
            return;
        };
        let _ = request_tx.send(String::from_utf8_lossy(&request).into_owned());

        let response = format!(
            "HTTP/1.1 {status_line}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    (addr, request_rx)
}

/// Reads one request (headers plus `Content-Length` body) off the socket.
async fn read_request(socket: &mut tokio::net::TcpStream) -> std::io::Result<Vec<u8>> {
    let mut request = Vec::new();
    let mut chunk = [0_u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(request);
        }
        request.extend_from_slice(&chunk[..n]);

        let Some(header_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        if request.len() >= header_end + 4 + content_length {
            return Ok(request);
        }
    }
}

/// Returns an address nothing is listening on.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    addr
}
