//! Unified error type for the SDK

use crate::builder::ConfigError;
use blocktrade_rest::RestError;
use blocktrade_ws::StreamError;

/// Any error the high-level client can return
#[derive(Debug, thiserror::Error)]
pub enum BlocktradeError {
    /// REST request failed
    #[error(transparent)]
    Rest(#[from] RestError),

    /// Stream operation failed
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Builder configuration was rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BlocktradeError {
    /// Check if the exchange answered with 429
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Rest(e) if e.is_rate_limited())
    }

    /// Check if a lookup found nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Rest(e) if e.is_not_found())
    }

    /// Check if a stream operation ran without a connection
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::Stream(StreamError::NotConnected))
    }
}

/// Result type for SDK operations
pub type BlocktradeResult<T> = Result<T, BlocktradeError>;
