//! WebSocket transport abstraction
//!
//! The connection talks to the socket through two halves: a [`FrameSink`]
//! shared by control writes and the heartbeat, and a [`FrameSource`] owned
//! by the reader task. Tests swap in [`MockTransport`] instead of a socket.
//!
//! # Example
//!
//! ```no_run
//! use blocktrade_ws::transport::{FrameSink, FrameSource, TransportError, WsTransport};
//!
//! async fn example() -> Result<(), TransportError> {
//!     let (mut sink, mut source) = WsTransport::new("wss://trade.blocktrade.com/ws/v1/notification")
//!         .connect()
//!         .await?;
//!     sink.send_text(r#"{"subscribe_ticker":{"trading_pair_id":1}}"#.to_string()).await?;
//!     if let Some(frame) = source.recv().await? {
//!         println!("Received: {:?}", frame);
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, instrument, trace};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport layer errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection timeout
    #[error("connection timeout after {0:?}")]
    Timeout(Duration),

    /// Send failed
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// A frame read from the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Text or binary payload
    Data(Vec<u8>),
    /// Server ping
    Ping,
    /// Reply to one of our pings
    Pong,
}

/// Write half of a stream transport
#[async_trait]
pub trait FrameSink: Send {
    /// Send a text frame
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Send a protocol-level ping
    async fn send_ping(&mut self) -> Result<(), TransportError>;

    /// Send a close frame
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Read half of a stream transport
#[async_trait]
pub trait FrameSource: Send {
    /// Receive the next frame
    ///
    /// Returns `None` once the peer has closed the connection.
    async fn recv(&mut self) -> Result<Option<Frame>, TransportError>;
}

/// Dials a WebSocket endpoint using tokio-tungstenite
pub struct WsTransport {
    url: String,
    connect_timeout: Duration,
}

impl WsTransport {
    /// Create a new WebSocket transport
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.url
    }

    /// Connect and split the socket into its two halves
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn connect(self) -> Result<(WsSink, WsSource), TransportError> {
        debug!("Connecting to WebSocket");

        let (socket, _response) = timeout(self.connect_timeout, connect_async(&self.url))
            .await
            .map_err(|_| TransportError::Timeout(self.connect_timeout))?
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        debug!("WebSocket connected");

        let (write, read) = socket.split();
        Ok((WsSink { inner: write }, WsSource { inner: read }))
    }
}

/// Write half of a tungstenite socket
pub struct WsSink {
    inner: SplitSink<Socket, Message>,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.inner
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn send_ping(&mut self) -> Result<(), TransportError> {
        self.inner
            .send(Message::Ping(Vec::new()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.inner
            .send(Message::Close(None))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }
}

/// Read half of a tungstenite socket
pub struct WsSource {
    inner: SplitStream<Socket>,
}

#[async_trait]
impl FrameSource for WsSource {
    async fn recv(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(Frame::Data(text.into_bytes()))),
                Some(Ok(Message::Binary(data))) => return Ok(Some(Frame::Data(data))),
                Some(Ok(Message::Ping(_))) => return Ok(Some(Frame::Ping)),
                Some(Ok(Message::Pong(_))) => return Ok(Some(Frame::Pong)),
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Close frame received");
                    return Ok(None);
                }
                Some(Ok(Message::Frame(_))) => trace!("Raw frame skipped"),
                Some(Err(e)) => return Err(TransportError::ReceiveFailed(e.to_string())),
                None => return Ok(None),
            }
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockHandle, MockSink, MockSource, MockTransport, SentFrame};

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    type Inbound = Result<Option<Frame>, TransportError>;

    /// A frame written through a [`MockSink`]
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SentFrame {
        Text(String),
        Ping,
        Close,
    }

    /// In-memory transport for tests
    ///
    /// Frames pushed through the [`MockHandle`] come out of the [`MockSource`];
    /// everything written to the [`MockSink`] is recorded on the handle.
    pub struct MockTransport;

    impl MockTransport {
        /// Create a connected sink/source pair and its control handle
        pub fn pair() -> (MockSink, MockSource, MockHandle) {
            let (tx, rx) = mpsc::unbounded_channel();
            let sent = Arc::new(Mutex::new(Vec::new()));
            let fail_send = Arc::new(AtomicBool::new(false));

            let sink = MockSink {
                sent: Arc::clone(&sent),
                fail_send: Arc::clone(&fail_send),
            };
            let source = MockSource { incoming: rx };
            let handle = MockHandle {
                incoming: tx,
                sent,
                fail_send,
            };

            (sink, source, handle)
        }
    }

    /// Test-side control of a [`MockTransport`]
    #[derive(Clone)]
    pub struct MockHandle {
        incoming: mpsc::UnboundedSender<Inbound>,
        sent: Arc<Mutex<Vec<SentFrame>>>,
        fail_send: Arc<AtomicBool>,
    }

    impl MockHandle {
        /// Deliver a text frame to the reader
        pub fn push_text(&self, text: impl Into<String>) {
            self.push(Ok(Some(Frame::Data(text.into().into_bytes()))));
        }

        /// Deliver a pong frame to the reader
        pub fn push_pong(&self) {
            self.push(Ok(Some(Frame::Pong)));
        }

        /// Deliver a ping frame to the reader
        pub fn push_ping(&self) {
            self.push(Ok(Some(Frame::Ping)));
        }

        /// Simulate the peer closing the connection
        pub fn push_close(&self) {
            self.push(Ok(None));
        }

        /// Simulate a receive error
        pub fn push_error(&self, error: TransportError) {
            self.push(Err(error));
        }

        /// Make every following write fail
        pub fn set_fail_send(&self, fail: bool) {
            self.fail_send.store(fail, Ordering::SeqCst);
        }

        /// All frames written so far
        pub fn sent(&self) -> Vec<SentFrame> {
            self.sent.lock().clone()
        }

        /// Text frames written so far
        pub fn sent_texts(&self) -> Vec<String> {
            self.sent
                .lock()
                .iter()
                .filter_map(|f| match f {
                    SentFrame::Text(text) => Some(text.clone()),
                    _ => None,
                })
                .collect()
        }

        /// Number of pings written so far
        pub fn ping_count(&self) -> usize {
            self.sent
                .lock()
                .iter()
                .filter(|f| **f == SentFrame::Ping)
                .count()
        }

        fn push(&self, item: Inbound) {
            // The source may already be gone after a terminal frame
            let _ = self.incoming.send(item);
        }
    }

    /// Write half of a [`MockTransport`]
    pub struct MockSink {
        sent: Arc<Mutex<Vec<SentFrame>>>,
        fail_send: Arc<AtomicBool>,
    }

    impl MockSink {
        fn record(&self, frame: SentFrame) -> Result<(), TransportError> {
            if self.fail_send.load(Ordering::SeqCst) {
                return Err(TransportError::SendFailed("mock send failure".into()));
            }
            self.sent.lock().push(frame);
            Ok(())
        }
    }

    #[async_trait]
    impl FrameSink for MockSink {
        async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
            self.record(SentFrame::Text(text))
        }

        async fn send_ping(&mut self) -> Result<(), TransportError> {
            self.record(SentFrame::Ping)
        }

        async fn close(&mut self) -> Result<(), TransportError> {
            self.record(SentFrame::Close)
        }
    }

    /// Read half of a [`MockTransport`]
    pub struct MockSource {
        incoming: mpsc::UnboundedReceiver<Inbound>,
    }

    #[async_trait]
    impl FrameSource for MockSource {
        async fn recv(&mut self) -> Result<Option<Frame>, TransportError> {
            // A dropped handle reads as a closed peer
            self.incoming.recv().await.unwrap_or(Ok(None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_send_recv() {
        let (mut sink, mut source, handle) = MockTransport::pair();
        handle.push_text(r#"{"message_type":"ticker"}"#);

        sink.send_text(r#"{"subscribe_ticker":{"trading_pair_id":1}}"#.to_string())
            .await
            .unwrap();
        assert_eq!(handle.sent_texts().len(), 1);
        assert!(handle.sent_texts()[0].contains("subscribe_ticker"));

        let frame = source.recv().await.unwrap().unwrap();
        assert_eq!(frame, Frame::Data(br#"{"message_type":"ticker"}"#.to_vec()));
    }

    #[tokio::test]
    async fn test_mock_transport_send_failure() {
        let (mut sink, _source, handle) = MockTransport::pair();
        handle.set_fail_send(true);

        assert!(sink.send_ping().await.is_err());
        assert_eq!(handle.ping_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_transport_close() {
        let (_sink, mut source, handle) = MockTransport::pair();
        handle.push_close();
        assert!(source.recv().await.unwrap().is_none());

        drop(handle);
        assert!(source.recv().await.unwrap().is_none());
    }
}
