//! Request signing for the Blocktrade API
//!
//! Authenticated REST requests are signed with HMAC-SHA256 over
//! `api_key.nonce[.body]`, keyed by the API secret.
//!
//! # Example
//!
//! ```
//! use blocktrade_auth::{Credentials, NonceGenerator};
//!
//! let creds = Credentials::new("my-key", "my-secret").unwrap();
//! let mut nonces = NonceGenerator::new();
//!
//! let body = br#"{"customer_order_id":"c-1"}"#;
//! let headers = creds.signed_headers(nonces.next(), Some(body));
//! assert_eq!(headers.signature.len(), 64);
//! ```

mod credentials;
mod error;

pub use credentials::{
    sign, Credentials, NonceGenerator, SignedHeaders, ENV_API_KEY, ENV_API_SECRET,
    HEADER_API_KEY, HEADER_NONCE, HEADER_SIGNATURE,
};
pub use error::{AuthError, AuthResult};
