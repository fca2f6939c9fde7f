//! REST API client for the Blocktrade cryptocurrency exchange
//!
//! # Features
//!
//! - **Market Data**: Trading assets, trading pairs, order book, ticker
//! - **Account**: User profile, portfolios, fee schedule
//! - **Trading**: Place, query and cancel customer orders
//! - **Reference cache**: Assets and pairs are fetched once and served from memory
//!
//! # Authentication
//!
//! Private endpoints require API credentials. Each signed request carries
//! `X-Api-Key`, `X-Nonce` and an HMAC-SHA256 `X-Signature`. Non-2xx responses
//! become [`RestError::Api`] with the exchange's status code and message.
//!
//! # Example
//!
//! ```no_run
//! use blocktrade_rest::BlocktradeRestClient;
//! use blocktrade_auth::Credentials;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Public endpoints (no auth required)
//!     let client = BlocktradeRestClient::new()?;
//!     let ticker = client.ticker(1).await?;
//!     println!("Last price: {:?}", ticker.last_price);
//!
//!     // Private endpoints (auth required)
//!     let auth_client = BlocktradeRestClient::with_credentials(Credentials::from_env()?)?;
//!     let user = auth_client.user().await?;
//!     println!("KYC: {:?}", user.kyc_status);
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod transport;

pub use cache::{CacheEntry, LookupKey, ReferenceCache};
pub use client::{BlocktradeRestClient, ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{RestError, RestResult};
pub use transport::{classify_response, Access, HttpTransport, TOO_MANY_REQUESTS};
