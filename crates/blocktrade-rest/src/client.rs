//! Main REST client implementation

use crate::cache::{LookupKey, ReferenceCache};
use crate::endpoints::{AccountEndpoints, MarketEndpoints, TradingEndpoints};
use crate::error::{RestError, RestResult};
use crate::transport::HttpTransport;
use blocktrade_auth::Credentials;
use blocktrade_types::{
    CustomerOrderRequest, FeeSchedule, Order, OrderBook, Portfolio, Ticker, TradingAsset,
    TradingPair, User,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Production REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://trade.blocktrade.com/api/v1";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_USER_AGENT: &str = concat!("blocktrade-rest/", env!("CARGO_PKG_VERSION"));

/// Blocktrade REST API client
///
/// Public market endpoints work without credentials. Clones share the same
/// connection pool, nonce sequence and reference caches.
///
/// # Example
///
/// ```no_run
/// use blocktrade_rest::{BlocktradeRestClient, ClientConfig};
/// use blocktrade_auth::Credentials;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Public endpoints only
///     let client = BlocktradeRestClient::new()?;
///     let btc = client.trading_asset_by_iso_code("BTC").await?;
///
///     // With authentication for private endpoints
///     let config = ClientConfig::new().with_credentials(Credentials::from_env()?);
///     let auth_client = BlocktradeRestClient::with_config(config)?;
///     let portfolios = auth_client.portfolios().await?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BlocktradeRestClient {
    transport: Arc<HttpTransport>,
    assets: Arc<ReferenceCache<TradingAsset>>,
    pairs: Arc<ReferenceCache<TradingPair>>,
}

impl BlocktradeRestClient {
    /// Create a new client without authentication
    ///
    /// Only public endpoints will be available.
    pub fn new() -> RestResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with credentials
    pub fn with_credentials(credentials: Credentials) -> RestResult<Self> {
        Self::with_config(ClientConfig::default().with_credentials(credentials))
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> RestResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
            .build()?;

        let transport = HttpTransport::new(http_client, &config.base_url, config.credentials)?;

        info!(base_url = transport.base_url(), "Created Blocktrade REST client");

        Ok(Self {
            transport: Arc::new(transport),
            assets: Arc::new(ReferenceCache::new()),
            pairs: Arc::new(ReferenceCache::new()),
        })
    }

    /// Check if the client has credentials for private endpoints
    pub fn has_credentials(&self) -> bool {
        self.transport.has_credentials()
    }

    /// Underlying transport
    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    // ========================================================================
    // Public Market Endpoints
    // ========================================================================

    /// Get market endpoints
    pub fn market(&self) -> MarketEndpoints<'_> {
        MarketEndpoints::new(&self.transport)
    }

    /// Get all tradable assets (uncached)
    pub async fn trading_assets(&self) -> RestResult<Vec<TradingAsset>> {
        self.market().trading_assets().await
    }

    /// Get all trading pairs (uncached)
    pub async fn trading_pairs(&self) -> RestResult<Vec<TradingPair>> {
        self.market().trading_pairs().await
    }

    /// Get the order book of a trading pair
    pub async fn order_book(&self, trading_pair_id: i64) -> RestResult<OrderBook> {
        self.market().order_book(trading_pair_id).await
    }

    /// Get the ticker of a trading pair
    pub async fn ticker(&self, trading_pair_id: i64) -> RestResult<Ticker> {
        self.market().ticker(trading_pair_id).await
    }

    // ========================================================================
    // Cached Reference Data
    // ========================================================================

    /// Get a trading asset by id, fetching the asset list on a cache miss
    pub async fn trading_asset(&self, id: i64) -> RestResult<TradingAsset> {
        self.cached_asset(LookupKey::Id(id)).await
    }

    /// Get a trading asset by ISO code (exact match), fetching on a cache miss
    pub async fn trading_asset_by_iso_code(&self, iso_code: &str) -> RestResult<TradingAsset> {
        self.cached_asset(LookupKey::IsoCode(iso_code.to_string()))
            .await
    }

    /// Get a trading pair by id, fetching the pair list on a cache miss
    pub async fn trading_pair(&self, id: i64) -> RestResult<TradingPair> {
        self.cached_pair(LookupKey::Id(id)).await
    }

    /// Get the trading pair of `base` against `quote`, fetching on a cache miss
    pub async fn trading_pair_by_assets(
        &self,
        base_asset_id: i64,
        quote_asset_id: i64,
    ) -> RestResult<TradingPair> {
        self.cached_pair(LookupKey::Pair {
            base: base_asset_id,
            quote: quote_asset_id,
        })
        .await
    }

    /// Number of cached trading assets
    pub fn cached_asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Number of cached trading pairs
    pub fn cached_pair_count(&self) -> usize {
        self.pairs.len()
    }

    async fn cached_asset(&self, key: LookupKey) -> RestResult<TradingAsset> {
        self.assets
            .get_or_fetch(&key, || async move { self.market().trading_assets().await })
            .await
    }

    async fn cached_pair(&self, key: LookupKey) -> RestResult<TradingPair> {
        self.pairs
            .get_or_fetch(&key, || async move { self.market().trading_pairs().await })
            .await
    }

    // ========================================================================
    // Private Account Endpoints
    // ========================================================================

    /// Get account endpoints (requires credentials)
    pub fn account(&self) -> RestResult<AccountEndpoints<'_>> {
        self.require_credentials()?;
        Ok(AccountEndpoints::new(&self.transport))
    }

    /// Get the fee schedule
    pub async fn fees(&self) -> RestResult<FeeSchedule> {
        self.account()?.fees().await
    }

    /// Get the user profile
    pub async fn user(&self) -> RestResult<User> {
        self.account()?.user().await
    }

    /// Get all portfolios
    pub async fn portfolios(&self) -> RestResult<Vec<Portfolio>> {
        self.account()?.portfolios().await
    }

    // ========================================================================
    // Private Trading Endpoints
    // ========================================================================

    /// Get trading endpoints (requires credentials)
    pub fn trading(&self) -> RestResult<TradingEndpoints<'_>> {
        self.require_credentials()?;
        Ok(TradingEndpoints::new(&self.transport))
    }

    /// Place an order with a client-assigned id
    pub async fn create_customer_order(&self, request: &CustomerOrderRequest) -> RestResult<Order> {
        self.trading()?.create_customer_order(request).await
    }

    /// Get an order by exchange id
    pub async fn order(&self, id: i64) -> RestResult<Order> {
        self.trading()?.order(id).await
    }

    /// Get an order by client-assigned id
    pub async fn customer_order(&self, customer_order_id: &str) -> RestResult<Order> {
        self.trading()?.customer_order(customer_order_id).await
    }

    /// Cancel an order by client-assigned id
    pub async fn cancel_customer_order(&self, customer_order_id: &str) -> RestResult<Order> {
        self.trading()?.cancel_customer_order(customer_order_id).await
    }

    fn require_credentials(&self) -> RestResult<()> {
        if self.has_credentials() {
            Ok(())
        } else {
            Err(RestError::MissingCredentials)
        }
    }
}

impl std::fmt::Debug for BlocktradeRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlocktradeRestClient")
            .field("base_url", &self.transport.base_url())
            .field("has_credentials", &self.has_credentials())
            .field("cached_assets", &self.cached_asset_count())
            .field("cached_pairs", &self.cached_pair_count())
            .finish()
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API credentials (optional)
    pub credentials: Option<Credentials>,
    /// REST base URL
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Custom user agent
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the REST base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_without_credentials() {
        let client = BlocktradeRestClient::new().unwrap();
        assert!(!client.has_credentials());
        assert_eq!(client.transport().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_base_url("http://localhost:8080/api/v1")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("test-agent");

        assert_eq!(config.base_url, "http://localhost:8080/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, Some("test-agent".to_string()));
    }

    #[test]
    fn test_missing_credentials_error() {
        let client = BlocktradeRestClient::new().unwrap();
        assert!(matches!(client.account(), Err(RestError::MissingCredentials)));
        assert!(matches!(client.trading(), Err(RestError::MissingCredentials)));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = BlocktradeRestClient::with_config(ClientConfig::new().with_base_url("::"));
        assert!(matches!(result, Err(RestError::InvalidUrl(_))));
    }

    #[test]
    fn test_clones_share_caches() {
        let client = BlocktradeRestClient::new().unwrap();
        let clone = client.clone();
        assert!(Arc::ptr_eq(&client.assets, &clone.assets));
        assert!(Arc::ptr_eq(&client.transport, &clone.transport));
    }
}
