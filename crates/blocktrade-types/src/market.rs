//! Reference data and public market data records

use crate::enums::{CurrencyType, DepositMethod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Reference Data
// ============================================================================

/// A tradable asset (currency) listed on the exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingAsset {
    /// Asset id
    pub id: i64,
    /// Human readable name, e.g. "Bitcoin"
    #[serde(default)]
    pub full_name: String,
    /// ISO code, e.g. "BTC"
    pub iso_code: String,
    #[serde(default)]
    pub icon_path: String,
    #[serde(default)]
    pub icon_path_png: String,
    #[serde(default)]
    pub color: String,
    /// Display sign, e.g. "€"
    #[serde(default)]
    pub sign: String,
    pub currency_type: CurrencyType,
    #[serde(default, deserialize_with = "crate::decimal::exact_opt")]
    pub minimal_withdrawal_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "crate::decimal::exact_opt")]
    pub minimal_order_value: Option<Decimal>,
    #[serde(default, deserialize_with = "crate::decimal::exact_opt")]
    pub maximum_order_value: Option<Decimal>,
    /// Number of decimals used for amounts of this asset
    pub decimal_precision: u32,
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub lot_size: Decimal,
    #[serde(default)]
    pub deposit_methods: Vec<DepositMethod>,
}

/// A market between two trading assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingPair {
    /// Pair id
    pub id: i64,
    /// Id of the base asset
    pub base_asset_id: i64,
    /// Id of the quote asset
    pub quote_asset_id: i64,
    /// Number of decimals used for prices
    pub decimal_precision: u32,
    /// Smallest amount increment
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub lot_size: Decimal,
    /// Smallest price increment
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub tick_size: Decimal,
}

impl TradingPair {
    /// Returns true if this pair trades `base` against `quote`
    pub fn is_market(&self, base_asset_id: i64, quote_asset_id: i64) -> bool {
        self.base_asset_id == base_asset_id && self.quote_asset_id == quote_asset_id
    }
}

// ============================================================================
// Market Data
// ============================================================================

/// Single price level of the order book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookEntry {
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub amount: Decimal,
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub price: Decimal,
    /// amount × price, as computed by the exchange
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub value: Decimal,
}

/// Aggregated order book for one trading pair
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderBook {
    #[serde(default)]
    pub asks: Vec<OrderBookEntry>,
    #[serde(default)]
    pub bids: Vec<OrderBookEntry>,
}

impl OrderBook {
    /// Lowest ask, if any
    pub fn best_ask(&self) -> Option<&OrderBookEntry> {
        self.asks.iter().min_by_key(|e| e.price)
    }

    /// Highest bid, if any
    pub fn best_bid(&self) -> Option<&OrderBookEntry> {
        self.bids.iter().max_by_key(|e| e.price)
    }

    /// Best ask minus best bid
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()?.price - self.best_bid()?.price)
    }
}

/// 24h ticker data for a trading pair
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ticker {
    #[serde(default, deserialize_with = "crate::decimal::exact_opt")]
    pub ask_price: Option<Decimal>,
    #[serde(default, deserialize_with = "crate::decimal::exact_opt")]
    pub bid_price: Option<Decimal>,
    #[serde(default, deserialize_with = "crate::decimal::exact_opt")]
    pub last_price: Option<Decimal>,
    #[serde(default, deserialize_with = "crate::decimal::exact_opt")]
    pub volume: Option<Decimal>,
    #[serde(default, deserialize_with = "crate::decimal::exact_opt")]
    pub high: Option<Decimal>,
    #[serde(default, deserialize_with = "crate::decimal::exact_opt")]
    pub low: Option<Decimal>,
}

impl Ticker {
    /// Get the mid price (average of bid and ask)
    pub fn mid_price(&self) -> Option<Decimal> {
        let ask = self.ask_price?;
        let bid = self.bid_price?;
        Some((ask + bid) / Decimal::TWO)
    }

    /// Ask minus bid
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.ask_price? - self.bid_price?)
    }
}

/// Ticker update pushed on the `ticker` stream topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerUpdate {
    pub trading_pair_id: i64,
    pub data: Ticker,
}
