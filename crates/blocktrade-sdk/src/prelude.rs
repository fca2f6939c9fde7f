//! Re-exports for convenience
//!
//! Import everything you need with:
//! ```
//! use blocktrade_sdk::prelude::*;
//! ```

// Client
pub use crate::builder::{BlocktradeClientBuilder, ConfigError};
pub use crate::client::BlocktradeClient;
pub use crate::error::{BlocktradeError, BlocktradeResult};

// Credentials
pub use blocktrade_auth::{AuthError, Credentials};

// Types from blocktrade-types
pub use blocktrade_types::{
    CustomerOrderRequest, Direction, FeeSchedule, Order, OrderBook, OrderBookEntry, OrderType,
    Portfolio, Ticker, TickerUpdate, TimeInForce, Topic, Trade, TradingAsset, TradingPair, User,
};

// REST types
pub use blocktrade_rest::{BlocktradeRestClient, RestError};

// Stream types
pub use blocktrade_ws::{CloseSignal, HeartbeatHandle, StreamError};

// Decimal for prices/quantities
pub use rust_decimal::Decimal;
