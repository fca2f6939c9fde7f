//! Stream connection management
//!
//! A connection runs two tasks: the reader pulls frames off the socket into a
//! bounded queue, the dispatcher drains the queue through the [`Dispatcher`].
//! The first read error or close travels through the queue like any frame and
//! ends up on the [`CloseSignal`].

use crate::dispatch::Dispatcher;
use crate::error::{StreamError, StreamResult};
use crate::registry::{Handler, SubscriptionRegistry};
use crate::transport::{Frame, FrameSink, FrameSource, WsTransport};

use blocktrade_types::{ControlMessage, Order, TickerUpdate, Topic, Trade};
use chrono::Utc;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

/// Production notification stream
pub const DEFAULT_STREAM_URL: &str = "wss://trade.blocktrade.com/ws/v1/notification";

/// Default number of frames buffered between reader and dispatcher
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

type SharedSink = Arc<Mutex<Box<dyn FrameSink>>>;
type QueueItem = Result<Vec<u8>, StreamError>;

/// Configuration for the stream connection
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// WebSocket endpoint
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Frames buffered between reader and dispatcher
    pub queue_capacity: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_STREAM_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ConnectionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the reader-to-dispatcher queue capacity (at least 1)
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }
}

/// Resolves to the error that ended the connection
///
/// Yields exactly one error. If the connection is dropped before the reader
/// saw an error, it resolves to [`StreamError::Closed`].
#[derive(Debug)]
pub struct CloseSignal {
    rx: oneshot::Receiver<StreamError>,
}

impl CloseSignal {
    /// Check for the terminal error without waiting
    pub fn try_recv(&mut self) -> Option<StreamError> {
        match self.rx.try_recv() {
            Ok(err) => Some(err),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(StreamError::Closed),
        }
    }
}

impl Future for CloseSignal {
    type Output = StreamError;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or(StreamError::Closed))
    }
}

/// Periodic ping task started by [`StreamConnection::start_heartbeat`]
///
/// The task keeps running after the connection ends; cancel it when the
/// close signal fires.
#[derive(Debug)]
pub struct HeartbeatHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl HeartbeatHandle {
    /// Stop sending pings
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if the heartbeat was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token that stops the heartbeat when cancelled
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel and wait for the task to finish
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Heartbeat task ended abnormally");
        }
    }
}

/// One notification stream connection
///
/// Subscriptions live as long as this connection. After the close signal
/// fires, connect again and re-subscribe.
pub struct StreamConnection {
    sink: SharedSink,
    registry: Arc<SubscriptionRegistry>,
    reader: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

impl StreamConnection {
    /// Dial the endpoint and start the reader and dispatcher tasks
    #[instrument(skip(config), fields(url = %config.url))]
    pub async fn connect(config: &ConnectionConfig) -> StreamResult<(Self, CloseSignal)> {
        let (sink, source) = WsTransport::new(&config.url)
            .with_timeout(config.connect_timeout)
            .connect()
            .await?;

        info!("Stream connected");
        Ok(Self::with_transport(sink, source, config))
    }

    /// Start a connection over an existing transport
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_transport<S, R>(sink: S, source: R, config: &ConnectionConfig) -> (Self, CloseSignal)
    where
        S: FrameSink + 'static,
        R: FrameSource + 'static,
    {
        let registry = Arc::new(SubscriptionRegistry::new());
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity.max(1));
        let (close_tx, close_rx) = oneshot::channel();

        let reader = tokio::spawn(read_loop(source, queue_tx));
        let dispatcher = tokio::spawn(dispatch_loop(
            Dispatcher::new(Arc::clone(&registry)),
            queue_rx,
            close_tx,
        ));

        let sink: Box<dyn FrameSink> = Box::new(sink);
        let conn = Self {
            sink: Arc::new(Mutex::new(sink)),
            registry,
            reader,
            dispatcher,
        };

        (conn, CloseSignal { rx: close_rx })
    }

    /// Handlers registered on this connection
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Check if `topic` has a handler
    pub fn is_subscribed(&self, topic: Topic) -> bool {
        self.registry.is_registered(topic)
    }

    /// Check if the reader and dispatcher are still running
    pub fn is_running(&self) -> bool {
        !self.dispatcher.is_finished()
    }

    /// Serialize and send one control message
    pub async fn send_control(&self, message: &ControlMessage) -> StreamResult<()> {
        let text = message.to_json().map_err(StreamError::Serialization)?;
        debug!(topic = %message.topic(), subscribe = message.is_subscribe(), "Sending control message");
        self.sink.lock().await.send_text(text).await?;
        Ok(())
    }

    /// Start sending protocol pings every `interval`
    ///
    /// The first ping goes out one `interval` after the call. A failed ping is
    /// logged and the heartbeat keeps running.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn start_heartbeat(&self, interval: Duration) -> HeartbeatHandle {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let sink = Arc::clone(&self.sink);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = sink.lock().await.send_ping().await {
                            warn!(error = %e, "Heartbeat ping failed");
                        }
                    }
                }
            }

            debug!("Heartbeat stopped");
        });

        HeartbeatHandle { token, task }
    }

    // ========================================================================
    // Topics
    // ========================================================================

    /// Subscribe to the user's order updates
    ///
    /// The handler is registered before the request is written and stays
    /// registered if the write fails.
    pub async fn subscribe_user_orders(
        &self,
        auth_token: &str,
        handler: impl FnMut(Result<Order, StreamError>) + Send + 'static,
    ) -> StreamResult<()> {
        self.subscribe(
            Handler::user_orders(handler),
            ControlMessage::SubscribeUserOrders {
                auth_token: auth_token.to_string(),
            },
        )
        .await
    }

    /// Stop order updates
    pub async fn unsubscribe_user_orders(&self) -> StreamResult<()> {
        self.unsubscribe(ControlMessage::UnsubscribeUserOrders {})
            .await
    }

    /// Subscribe to the user's trade executions
    ///
    /// With `replay`, trades since `now - replay` are sent first.
    pub async fn subscribe_user_trades(
        &self,
        auth_token: &str,
        replay: Option<Duration>,
        handler: impl FnMut(Result<Trade, StreamError>) + Send + 'static,
    ) -> StreamResult<()> {
        self.subscribe(
            Handler::user_trades(handler),
            ControlMessage::SubscribeUserTrades {
                auth_token: auth_token.to_string(),
                start_time: replay.map(replay_start),
            },
        )
        .await
    }

    /// Stop trade executions
    pub async fn unsubscribe_user_trades(&self) -> StreamResult<()> {
        self.unsubscribe(ControlMessage::UnsubscribeUserTrades {})
            .await
    }

    /// Subscribe to ticker updates of a trading pair
    ///
    /// All ticker subscriptions share one handler; the latest one wins.
    pub async fn subscribe_ticker(
        &self,
        trading_pair_id: i64,
        handler: impl FnMut(Result<TickerUpdate, StreamError>) + Send + 'static,
    ) -> StreamResult<()> {
        self.subscribe(
            Handler::ticker(handler),
            ControlMessage::SubscribeTicker { trading_pair_id },
        )
        .await
    }

    /// Stop ticker updates of a trading pair and drop the ticker handler
    pub async fn unsubscribe_ticker(&self, trading_pair_id: i64) -> StreamResult<()> {
        self.unsubscribe(ControlMessage::UnsubscribeTicker { trading_pair_id })
            .await
    }

    /// Send a close frame
    pub async fn close(&self) -> StreamResult<()> {
        info!("Closing stream");
        self.sink.lock().await.close().await?;
        Ok(())
    }

    async fn subscribe(&self, handler: Handler, message: ControlMessage) -> StreamResult<()> {
        if self.registry.register(handler).is_some() {
            debug!(topic = %message.topic(), "Replaced existing handler");
        }
        self.send_control(&message).await
    }

    async fn unsubscribe(&self, message: ControlMessage) -> StreamResult<()> {
        self.send_control(&message).await?;
        self.registry.unregister(message.topic());
        Ok(())
    }
}

impl Drop for StreamConnection {
    fn drop(&mut self) {
        self.reader.abort();
        self.dispatcher.abort();
    }
}

impl std::fmt::Debug for StreamConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamConnection")
            .field("registry", &self.registry)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Epoch milliseconds of `now - replay`
fn replay_start(replay: Duration) -> i64 {
    let replay_ms = i64::try_from(replay.as_millis()).unwrap_or(i64::MAX);
    Utc::now().timestamp_millis().saturating_sub(replay_ms)
}

async fn read_loop<R: FrameSource>(mut source: R, queue: mpsc::Sender<QueueItem>) {
    loop {
        let item = match source.recv().await {
            Ok(Some(Frame::Data(bytes))) => Ok(bytes),
            Ok(Some(Frame::Pong)) | Ok(Some(Frame::Ping)) => {
                trace!("Control frame skipped");
                continue;
            }
            Ok(None) => Err(StreamError::Closed),
            Err(e) => Err(StreamError::from(e)),
        };

        let terminal = item.is_err();
        if queue.send(item).await.is_err() {
            debug!("Dispatcher gone, reader stopping");
            return;
        }
        if terminal {
            debug!("Reader stopped");
            return;
        }
    }
}

async fn dispatch_loop(
    dispatcher: Dispatcher,
    mut queue: mpsc::Receiver<QueueItem>,
    close: oneshot::Sender<StreamError>,
) {
    while let Some(item) = queue.recv().await {
        match item {
            Ok(bytes) => {
                dispatcher.dispatch(&bytes);
            }
            Err(e) => {
                warn!(error = %e, "Stream terminated");
                let _ = close.send(e);
                return;
            }
        }
    }

    let _ = close.send(StreamError::Closed);
}
