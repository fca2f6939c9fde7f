//! Notification stream client for the Blocktrade exchange
//!
//! This crate connects to the Blocktrade notification stream, sends
//! subscribe/unsubscribe control messages and routes inbound frames to
//! per-topic handlers.
//!
//! # Features
//!
//! - Bounded queue between the socket reader and handler dispatch
//! - One handler per topic, called once per list item in arrival order
//! - Single terminal error reported through a [`CloseSignal`]
//! - Optional protocol-level heartbeat with cancellation
//!
//! # Example
//!
//! ```no_run
//! use blocktrade_ws::{ConnectionConfig, StreamConnection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConnectionConfig::new();
//!     let (conn, closed) = StreamConnection::connect(&config).await?;
//!
//!     conn.subscribe_ticker(1, |update| match update {
//!         Ok(update) => println!("{}: {:?}", update.trading_pair_id, update.data.last_price),
//!         Err(e) => eprintln!("bad ticker payload: {}", e),
//!     })
//!     .await?;
//!
//!     let reason = closed.await;
//!     println!("stream ended: {}", reason);
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod transport;

// Re-export main types
pub use connection::{
    CloseSignal, ConnectionConfig, HeartbeatHandle, StreamConnection, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_STREAM_URL,
};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{StreamError, StreamResult};
pub use registry::{Handler, OrderHandler, SubscriptionRegistry, TickerHandler, TradeHandler};
pub use transport::{Frame, FrameSink, FrameSource, TransportError, WsTransport};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::{MockHandle, MockSink, MockSource, MockTransport, SentFrame};
