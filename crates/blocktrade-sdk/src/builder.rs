//! Client Builder Pattern
//!
//! Provides a fluent builder API for configuring the Blocktrade SDK client
//! with sensible defaults and validation.
//!
//! # Example
//!
//! ```
//! use blocktrade_sdk::builder::BlocktradeClientBuilder;
//! use std::time::Duration;
//!
//! let builder = BlocktradeClientBuilder::new()
//!     .with_base_url("https://trade.blocktrade.com/api/v1")
//!     .with_timeout(Duration::from_secs(15))
//!     .with_queue_capacity(512);
//! assert!(builder.validate().is_ok());
//! ```

use crate::client::BlocktradeClient;
use crate::error::BlocktradeResult;
use blocktrade_auth::Credentials;
use blocktrade_rest::{BlocktradeRestClient, ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use blocktrade_ws::{ConnectionConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_STREAM_URL};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Configuration validation error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// REST base URL did not parse or is not http(s)
    #[error("invalid base URL: {url} (expected http:// or https://)")]
    InvalidBaseUrl { url: String },

    /// Stream URL did not parse or is not ws(s)
    #[error("invalid stream URL: {url} (expected ws:// or wss://)")]
    InvalidStreamUrl { url: String },

    /// Request timeout of zero
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    /// Connect timeout of zero
    #[error("connection timeout must be greater than zero")]
    ZeroConnectTimeout,

    /// Queue without room for a single frame
    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,
}

/// Builder for configuring a Blocktrade client
#[derive(Debug, Clone)]
pub struct BlocktradeClientBuilder {
    /// API credentials for signed endpoints and private topics
    pub credentials: Option<Credentials>,

    /// REST base URL
    pub base_url: String,

    /// Notification stream URL
    pub stream_url: String,

    /// HTTP request timeout
    pub timeout: Duration,

    /// Stream connection timeout
    pub connect_timeout: Duration,

    /// Frames buffered between stream reader and dispatcher
    pub queue_capacity: usize,

    /// Custom HTTP user agent
    pub user_agent: Option<String>,
}

impl Default for BlocktradeClientBuilder {
    fn default() -> Self {
        Self {
            credentials: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            stream_url: DEFAULT_STREAM_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: Duration::from_secs(10),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            user_agent: None,
        }
    }
}

impl BlocktradeClientBuilder {
    /// Create a new builder with production endpoints
    pub fn new() -> Self {
        Self::default()
    }

    /// Set API credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the REST base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the notification stream URL
    pub fn with_stream_url(mut self, url: impl Into<String>) -> Self {
        self.stream_url = url.into();
        self
    }

    /// Set the HTTP request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the stream connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the stream queue capacity
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set a custom HTTP user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Validate the configuration
    ///
    /// Returns `Ok(())` if the configuration is valid, otherwise returns
    /// a `ConfigError` describing the problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !has_scheme(&self.base_url, &["http", "https"]) {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
            });
        }

        if !has_scheme(&self.stream_url, &["ws", "wss"]) {
            return Err(ConfigError::InvalidStreamUrl {
                url: self.stream_url.clone(),
            });
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroConnectTimeout);
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }

        Ok(())
    }

    /// Convert to REST client config
    pub fn to_client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new()
            .with_base_url(&self.base_url)
            .with_timeout(self.timeout);

        if let Some(credentials) = &self.credentials {
            config = config.with_credentials(credentials.clone());
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent);
        }

        config
    }

    /// Convert to stream connection config
    pub fn to_connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new()
            .with_url(&self.stream_url)
            .with_timeout(self.connect_timeout)
            .with_queue_capacity(self.queue_capacity)
    }

    /// Validate and create the client
    ///
    /// No network traffic happens here; the stream is opened with
    /// [`BlocktradeClient::connect_stream`].
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub fn build(self) -> BlocktradeResult<BlocktradeClient> {
        self.validate()?;

        let rest = BlocktradeRestClient::with_config(self.to_client_config())?;
        info!(
            authenticated = rest.has_credentials(),
            "Blocktrade client created"
        );

        Ok(BlocktradeClient::from_parts(rest, self.to_connection_config()))
    }
}

fn has_scheme(url: &str, schemes: &[&str]) -> bool {
    Url::parse(url)
        .map(|parsed| schemes.contains(&parsed.scheme()) && parsed.has_host())
        .unwrap_or(false)
}
