//! Public market data endpoints
//!
//! These endpoints don't require authentication.

use crate::error::RestResult;
use crate::transport::{Access, HttpTransport};
use blocktrade_types::{OrderBook, Ticker, TradingAsset, TradingPair};
use tracing::{debug, instrument};

/// Public market data endpoints
pub struct MarketEndpoints<'a> {
    transport: &'a HttpTransport,
}

impl<'a> MarketEndpoints<'a> {
    pub fn new(transport: &'a HttpTransport) -> Self {
        Self { transport }
    }

    /// Get all tradable assets
    #[instrument(skip(self))]
    pub async fn trading_assets(&self) -> RestResult<Vec<TradingAsset>> {
        debug!("Fetching trading assets");
        self.transport.get_json("/trading_assets", Access::Public).await
    }

    /// Get all trading pairs
    #[instrument(skip(self))]
    pub async fn trading_pairs(&self) -> RestResult<Vec<TradingPair>> {
        debug!("Fetching trading pairs");
        self.transport.get_json("/trading_pairs", Access::Public).await
    }

    /// Get the aggregated order book of a trading pair
    #[instrument(skip(self))]
    pub async fn order_book(&self, trading_pair_id: i64) -> RestResult<OrderBook> {
        debug!("Fetching order book for pair {}", trading_pair_id);
        self.transport
            .get_json(&format!("/order_book/{}", trading_pair_id), Access::Public)
            .await
    }

    /// Get the 24h ticker of a trading pair
    #[instrument(skip(self))]
    pub async fn ticker(&self, trading_pair_id: i64) -> RestResult<Ticker> {
        debug!("Fetching ticker for pair {}", trading_pair_id);
        self.transport
            .get_json(&format!("/ticker/{}", trading_pair_id), Access::Public)
            .await
    }
}
