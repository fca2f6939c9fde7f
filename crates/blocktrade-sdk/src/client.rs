//! High-level Blocktrade client

use crate::builder::BlocktradeClientBuilder;
use crate::error::BlocktradeResult;
use blocktrade_rest::BlocktradeRestClient;
use blocktrade_types::{
    CustomerOrderRequest, FeeSchedule, Order, OrderBook, Portfolio, Ticker, TickerUpdate, Trade,
    TradingAsset, TradingPair, User,
};
use blocktrade_ws::{
    CloseSignal, ConnectionConfig, FrameSink, FrameSource, HeartbeatHandle, StreamConnection,
    StreamError,
};
use std::time::Duration;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{debug, info, instrument};

/// High-level client for the Blocktrade REST API and notification stream
///
/// REST calls go through the shared [`BlocktradeRestClient`]. The stream is
/// opened explicitly; subscriptions last until the close signal fires, after
/// which the caller reconnects and subscribes again.
///
/// # Example
///
/// ```no_run
/// use blocktrade_sdk::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = BlocktradeClient::builder()
///         .with_credentials(Credentials::from_env()?)
///         .build()?;
///
///     let pair = client.trading_pair(1).await?;
///     println!("Trading pair {} -> {}", pair.base_asset_id, pair.quote_asset_id);
///
///     let closed = client.connect_stream().await?;
///     client
///         .subscribe_user_orders(|order| match order {
///             Ok(order) => println!("order {} updated", order.id),
///             Err(e) => eprintln!("bad order payload: {}", e),
///         })
///         .await?;
///
///     println!("stream ended: {}", closed.await);
///     Ok(())
/// }
/// ```
pub struct BlocktradeClient {
    rest: BlocktradeRestClient,
    stream_config: ConnectionConfig,
    stream: Mutex<Option<StreamConnection>>,
}

impl BlocktradeClient {
    /// Create a new client builder
    pub fn builder() -> BlocktradeClientBuilder {
        BlocktradeClientBuilder::new()
    }

    pub(crate) fn from_parts(rest: BlocktradeRestClient, stream_config: ConnectionConfig) -> Self {
        Self {
            rest,
            stream_config,
            stream: Mutex::new(None),
        }
    }

    /// Underlying REST client
    pub fn rest(&self) -> &BlocktradeRestClient {
        &self.rest
    }

    /// Check if the client has credentials for signed endpoints
    pub fn has_credentials(&self) -> bool {
        self.rest.has_credentials()
    }

    /// Stream connection settings
    pub fn stream_config(&self) -> &ConnectionConfig {
        &self.stream_config
    }

    // ========================================================================
    // Market Data
    // ========================================================================

    /// All trading assets (not cached)
    pub async fn trading_assets(&self) -> BlocktradeResult<Vec<TradingAsset>> {
        Ok(self.rest.trading_assets().await?)
    }

    /// All trading pairs (not cached)
    pub async fn trading_pairs(&self) -> BlocktradeResult<Vec<TradingPair>> {
        Ok(self.rest.trading_pairs().await?)
    }

    /// Order book of a trading pair
    pub async fn order_book(&self, trading_pair_id: i64) -> BlocktradeResult<OrderBook> {
        Ok(self.rest.order_book(trading_pair_id).await?)
    }

    /// Ticker of a trading pair
    pub async fn ticker(&self, trading_pair_id: i64) -> BlocktradeResult<Ticker> {
        Ok(self.rest.ticker(trading_pair_id).await?)
    }

    /// Trading asset by id, served from cache when possible
    pub async fn trading_asset(&self, id: i64) -> BlocktradeResult<TradingAsset> {
        Ok(self.rest.trading_asset(id).await?)
    }

    /// Trading asset by ISO code, served from cache when possible
    pub async fn trading_asset_by_iso_code(&self, iso_code: &str) -> BlocktradeResult<TradingAsset> {
        Ok(self.rest.trading_asset_by_iso_code(iso_code).await?)
    }

    /// Trading pair by id, served from cache when possible
    pub async fn trading_pair(&self, id: i64) -> BlocktradeResult<TradingPair> {
        Ok(self.rest.trading_pair(id).await?)
    }

    /// Trading pair by base and quote asset, served from cache when possible
    pub async fn trading_pair_by_assets(
        &self,
        base_asset_id: i64,
        quote_asset_id: i64,
    ) -> BlocktradeResult<TradingPair> {
        Ok(self
            .rest
            .trading_pair_by_assets(base_asset_id, quote_asset_id)
            .await?)
    }

    // ========================================================================
    // Account
    // ========================================================================

    /// Fee schedule of the account
    pub async fn fees(&self) -> BlocktradeResult<FeeSchedule> {
        Ok(self.rest.fees().await?)
    }

    /// Profile of the authenticated user
    pub async fn user(&self) -> BlocktradeResult<User> {
        Ok(self.rest.user().await?)
    }

    /// Portfolios and balances
    pub async fn portfolios(&self) -> BlocktradeResult<Vec<Portfolio>> {
        Ok(self.rest.portfolios().await?)
    }

    // ========================================================================
    // Trading
    // ========================================================================

    /// Place an order
    pub async fn create_customer_order(
        &self,
        request: &CustomerOrderRequest,
    ) -> BlocktradeResult<Order> {
        Ok(self.rest.create_customer_order(request).await?)
    }

    /// Order by exchange id
    pub async fn order(&self, id: i64) -> BlocktradeResult<Order> {
        Ok(self.rest.order(id).await?)
    }

    /// Order by client-assigned id
    pub async fn customer_order(&self, customer_order_id: &str) -> BlocktradeResult<Order> {
        Ok(self.rest.customer_order(customer_order_id).await?)
    }

    /// Cancel an order by client-assigned id
    pub async fn cancel_customer_order(&self, customer_order_id: &str) -> BlocktradeResult<Order> {
        Ok(self.rest.cancel_customer_order(customer_order_id).await?)
    }

    // ========================================================================
    // Notification Stream
    // ========================================================================

    /// Open the notification stream
    ///
    /// Replaces any previous connection; its subscriptions are dropped.
    #[instrument(skip(self), fields(url = %self.stream_config.url))]
    pub async fn connect_stream(&self) -> BlocktradeResult<CloseSignal> {
        let (conn, closed) = StreamConnection::connect(&self.stream_config).await?;
        self.install(conn).await;
        Ok(closed)
    }

    /// Open the notification stream over a caller-supplied transport
    pub async fn connect_stream_with<S, R>(&self, sink: S, source: R) -> CloseSignal
    where
        S: FrameSink + 'static,
        R: FrameSource + 'static,
    {
        let (conn, closed) = StreamConnection::with_transport(sink, source, &self.stream_config);
        self.install(conn).await;
        closed
    }

    /// Check if a stream connection is open and running
    pub async fn is_stream_connected(&self) -> bool {
        self.stream
            .lock()
            .await
            .as_ref()
            .map(StreamConnection::is_running)
            .unwrap_or(false)
    }

    /// Start protocol pings on the open stream
    pub async fn start_heartbeat(&self, interval: Duration) -> BlocktradeResult<HeartbeatHandle> {
        let conn = self.connection().await?;
        Ok(conn.start_heartbeat(interval))
    }

    /// Subscribe to the user's order updates
    ///
    /// Fetches the stream auth token from the user profile first; if that
    /// fails nothing is registered or sent.
    pub async fn subscribe_user_orders(
        &self,
        handler: impl FnMut(Result<Order, StreamError>) + Send + 'static,
    ) -> BlocktradeResult<()> {
        self.connection().await?;
        let token = self.stream_auth_token().await?;
        let conn = self.connection().await?;
        Ok(conn.subscribe_user_orders(&token, handler).await?)
    }

    /// Stop order updates
    pub async fn unsubscribe_user_orders(&self) -> BlocktradeResult<()> {
        let conn = self.connection().await?;
        Ok(conn.unsubscribe_user_orders().await?)
    }

    /// Subscribe to the user's trade executions
    ///
    /// With `replay`, trades since `now - replay` are sent first.
    pub async fn subscribe_user_trades(
        &self,
        replay: Option<Duration>,
        handler: impl FnMut(Result<Trade, StreamError>) + Send + 'static,
    ) -> BlocktradeResult<()> {
        self.connection().await?;
        let token = self.stream_auth_token().await?;
        let conn = self.connection().await?;
        Ok(conn.subscribe_user_trades(&token, replay, handler).await?)
    }

    /// Stop trade executions
    pub async fn unsubscribe_user_trades(&self) -> BlocktradeResult<()> {
        let conn = self.connection().await?;
        Ok(conn.unsubscribe_user_trades().await?)
    }

    /// Subscribe to ticker updates of a trading pair
    pub async fn subscribe_ticker(
        &self,
        trading_pair_id: i64,
        handler: impl FnMut(Result<TickerUpdate, StreamError>) + Send + 'static,
    ) -> BlocktradeResult<()> {
        let conn = self.connection().await?;
        Ok(conn.subscribe_ticker(trading_pair_id, handler).await?)
    }

    /// Stop ticker updates of a trading pair
    pub async fn unsubscribe_ticker(&self, trading_pair_id: i64) -> BlocktradeResult<()> {
        let conn = self.connection().await?;
        Ok(conn.unsubscribe_ticker(trading_pair_id).await?)
    }

    /// Send a close frame and drop the stream connection
    #[instrument(skip(self))]
    pub async fn close_stream(&self) -> BlocktradeResult<()> {
        let conn = self
            .stream
            .lock()
            .await
            .take()
            .ok_or(StreamError::NotConnected)?;

        let result = conn.close().await;
        drop(conn);
        info!("Stream closed");
        Ok(result?)
    }

    async fn install(&self, conn: StreamConnection) {
        if self.stream.lock().await.replace(conn).is_some() {
            debug!("Previous stream connection dropped");
        }
    }

    async fn connection(&self) -> BlocktradeResult<MappedMutexGuard<'_, StreamConnection>> {
        let guard = self.stream.lock().await;
        MutexGuard::try_map(guard, |slot| slot.as_mut())
            .map_err(|_| StreamError::NotConnected.into())
    }

    async fn stream_auth_token(&self) -> BlocktradeResult<String> {
        let user = self.rest.user().await?;
        debug!(user_id = user.user_id, "Fetched stream auth token");
        Ok(user.websocket_auth_token)
    }
}

impl std::fmt::Debug for BlocktradeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlocktradeClient")
            .field("rest", &self.rest)
            .field("stream_url", &self.stream_config.url)
            .finish()
    }
}
