//! Shared wire types for the Blocktrade REST and WebSocket APIs
//!
//! This crate holds the record shapes exchanged with the exchange. It has no
//! networking dependencies and can be used on its own.
//!
//! # Key Types
//!
//! - [`TradingAsset`], [`TradingPair`] - Reference data
//! - [`OrderBook`], [`Ticker`] - Public market data
//! - [`User`], [`Portfolio`], [`FeeSchedule`] - Account data
//! - [`CustomerOrderRequest`], [`Order`], [`Trade`] - Trading records
//! - [`Envelope`], [`Topic`], [`ControlMessage`] - Stream messages
//!
//! All amounts and prices are [`Decimal`] values that travel as JSON strings,
//! so no precision is lost between the exchange and the caller. A value
//! that would need rounding to fit is a decode error (see [`decimal`]).

pub mod account;
pub mod decimal;
pub mod enums;
pub mod market;
pub mod stream;
pub mod trading;

pub use account::*;
pub use enums::*;
pub use market::*;
pub use stream::*;
pub use trading::*;

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;
