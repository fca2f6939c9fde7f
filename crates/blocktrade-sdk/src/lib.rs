//! High-level SDK for the Blocktrade exchange
//!
//! This crate ties together the signed REST client and the notification
//! stream behind one [`BlocktradeClient`]. Reference data lookups are cached,
//! private stream topics fetch their auth token automatically.
//!
//! # Quick Start
//!
//! ```no_run
//! use blocktrade_sdk::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BlocktradeClient::builder().build()?;
//!
//!     // Reference data is fetched once and cached
//!     let btc = client.trading_asset_by_iso_code("BTC").await?;
//!     let eur = client.trading_asset_by_iso_code("EUR").await?;
//!     let pair = client.trading_pair_by_assets(btc.id, eur.id).await?;
//!
//!     // Live ticker updates
//!     let closed = client.connect_stream().await?;
//!     client
//!         .subscribe_ticker(pair.id, |update| {
//!             if let Ok(update) = update {
//!                 println!("last price: {:?}", update.data.last_price);
//!             }
//!         })
//!         .await?;
//!
//!     println!("stream ended: {}", closed.await);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - **Signed requests**: HMAC-SHA256 with strictly increasing nonces
//! - **Reference cache**: asset and pair lookups fetched at most once
//! - **Notification stream**: per-topic handlers with ordered delivery
//! - **Explicit lifecycle**: one close signal per connection, no hidden retries

pub mod builder;
pub mod client;
pub mod error;
pub mod prelude;

// Re-export main types
pub use builder::{BlocktradeClientBuilder, ConfigError};
pub use client::BlocktradeClient;
pub use error::{BlocktradeError, BlocktradeResult};

// Re-export commonly used types from dependencies
pub use blocktrade_auth::Credentials;
pub use blocktrade_rest::RestError;
pub use blocktrade_types::{Decimal, Order, Ticker, TickerUpdate, Trade};
pub use blocktrade_ws::{CloseSignal, HeartbeatHandle, StreamError};
