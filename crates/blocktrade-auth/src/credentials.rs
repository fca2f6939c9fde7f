//! API credentials and HMAC-SHA256 request signing
//!
//! Every authenticated request carries three headers:
//! - `X-Api-Key`: the API key
//! - `X-Nonce`: a strictly increasing microsecond timestamp
//! - `X-Signature`: uppercase hex HMAC-SHA256 of `key.nonce[.body]`
//!
//! # Security
//!
//! The API secret is stored using the `secrecy` crate which zeroizes the
//! memory on drop and keeps it out of `Debug` output.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::trace;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the API key
pub const HEADER_API_KEY: &str = "X-Api-Key";
/// Header carrying the request nonce
pub const HEADER_NONCE: &str = "X-Nonce";
/// Header carrying the request signature
pub const HEADER_SIGNATURE: &str = "X-Signature";

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "BLOCKTRADE_API_KEY";
/// Environment variable holding the API secret
pub const ENV_API_SECRET: &str = "BLOCKTRADE_API_SECRET";

/// Compute the request signature
///
/// The signed message is `api_key + "." + nonce`, followed by `"." + body`
/// when a body is sent. `body` must be the exact bytes put on the wire.
pub fn sign(api_key: &str, api_secret: &str, nonce: u64, body: Option<&[u8]>) -> String {
    let mut mac =
        HmacSha256::new_from_slice(api_secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(api_key.as_bytes());
    mac.update(b".");
    mac.update(nonce.to_string().as_bytes());
    if let Some(body) = body {
        mac.update(b".");
        mac.update(body);
    }
    hex::encode_upper(mac.finalize().into_bytes())
}

/// API credentials for authenticated requests
pub struct Credentials {
    /// API key (public)
    api_key: String,
    /// API secret (zeroized on drop)
    api_secret: SecretString,
}

impl Credentials {
    /// Create credentials from an API key and secret
    ///
    /// Fails with [`AuthError::MissingCredentials`] if either value is empty.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> AuthResult<Self> {
        let api_key = api_key.into();
        let api_secret = api_secret.into();

        if api_key.is_empty() || api_secret.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        Ok(Self {
            api_key,
            api_secret: SecretString::from(api_secret),
        })
    }

    /// Create credentials from environment variables
    ///
    /// Reads `BLOCKTRADE_API_KEY` and `BLOCKTRADE_API_SECRET`.
    pub fn from_env() -> AuthResult<Self> {
        let api_key = std::env::var(ENV_API_KEY)
            .map_err(|_| AuthError::EnvVarNotSet(ENV_API_KEY.to_string()))?;
        let api_secret = std::env::var(ENV_API_SECRET)
            .map_err(|_| AuthError::EnvVarNotSet(ENV_API_SECRET.to_string()))?;

        Self::new(api_key, api_secret)
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign a request with this key pair
    pub fn sign(&self, nonce: u64, body: Option<&[u8]>) -> String {
        sign(&self.api_key, self.api_secret.expose_secret(), nonce, body)
    }

    /// Build the authentication headers for one request
    pub fn signed_headers(&self, nonce: u64, body: Option<&[u8]>) -> SignedHeaders {
        SignedHeaders {
            api_key: self.api_key.clone(),
            nonce: nonce.to_string(),
            signature: self.sign(nonce, body),
        }
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            api_secret: SecretString::from(self.api_secret.expose_secret().to_owned()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "api_key",
                &format!("{}...", &self.api_key[..8.min(self.api_key.len())]),
            )
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Header values of one signed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub api_key: String,
    pub nonce: String,
    pub signature: String,
}

impl SignedHeaders {
    /// Header name/value pairs in the order they are sent
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (HEADER_API_KEY, self.api_key.as_str()),
            (HEADER_NONCE, self.nonce.as_str()),
            (HEADER_SIGNATURE, self.signature.as_str()),
        ]
        .into_iter()
    }
}

/// Strictly increasing microsecond nonces
///
/// If the clock has not advanced past the last issued value (or went
/// backwards), the next nonce is `last + 1`.
#[derive(Debug, Default)]
pub struct NonceGenerator {
    last: u64,
}

impl NonceGenerator {
    /// Create a new generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next nonce
    pub fn next(&mut self) -> u64 {
        self.next_at(now_micros())
    }

    /// Last issued nonce, 0 before the first call
    pub fn last(&self) -> u64 {
        self.last
    }

    fn next_at(&mut self, now: u64) -> u64 {
        let nonce = if now > self.last {
            now
        } else {
            trace!(last = self.last, now, "clock did not advance, bumping nonce");
            self.last + 1
        };
        self.last = nonce;
        nonce
    }
}

fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_sign_without_body() {
        assert_eq!(
            sign("key", "secret", 1_600_000_000_000_000, None),
            "18E22B3988D0256DF7012822494390BB892DBC68F446A6D5C4E5B9098EB2274F"
        );
    }

    #[test]
    fn test_sign_with_body() {
        assert_eq!(
            sign("key", "secret", 1_600_000_000_000_000, Some(br#"{"a":1}"#)),
            "2C46BD2991811A04E27B78EF3543B89B478D9CD1E864CF4CD91F8C673B9384E8"
        );
    }

    #[test]
    fn test_credentials_sign_matches_free_function() {
        let creds = Credentials::new("my-api-key", "topsecret").unwrap();
        let body = br#"{"customer_order_id":"c-1"}"#;
        assert_eq!(
            creds.sign(1_700_000_000_123_456, Some(body)),
            "965C7BD1F9CB733AEF444CE7BDBBCF192987265CB76111A67C282074CC33E8C9"
        );
    }

    #[test]
    fn test_signature_depends_on_every_input() {
        let base = sign("key", "secret", 10, Some(b"{}"));
        assert_ne!(base, sign("key2", "secret", 10, Some(b"{}")));
        assert_ne!(base, sign("key", "secret2", 10, Some(b"{}")));
        assert_ne!(base, sign("key", "secret", 11, Some(b"{}")));
        assert_ne!(base, sign("key", "secret", 10, Some(b"{ }")));
        assert_ne!(base, sign("key", "secret", 10, None));
    }

    #[test]
    fn test_signature_is_uppercase_hex() {
        let sig = sign("key", "secret", 1, None);
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(matches!(
            Credentials::new("", "secret"),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            Credentials::new("key", ""),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::new("test_api_key", "super_secret_value").unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("super_secret_value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_signed_headers() {
        let creds = Credentials::new("key", "secret").unwrap();
        let headers = creds.signed_headers(1_600_000_000_000_000, None);
        let pairs: Vec<_> = headers.iter().collect();
        assert_eq!(pairs[0], (HEADER_API_KEY, "key"));
        assert_eq!(pairs[1], (HEADER_NONCE, "1600000000000000"));
        assert_eq!(pairs[2].1, sign("key", "secret", 1_600_000_000_000_000, None));
    }

    #[test]
    fn test_nonce_bumps_when_clock_stalls() {
        let mut gen = NonceGenerator::new();
        assert_eq!(gen.next_at(100), 100);
        assert_eq!(gen.next_at(100), 101);
        assert_eq!(gen.next_at(50), 102);
        assert_eq!(gen.next_at(200), 200);
        assert_eq!(gen.last(), 200);
    }

    #[test]
    fn test_nonce_is_microseconds() {
        let mut gen = NonceGenerator::new();
        // 2020-01-01 in microseconds
        assert!(gen.next() > 1_577_836_800_000_000);
    }

    #[test]
    fn test_nonce_strictly_increasing_across_threads() {
        let gen = Arc::new(Mutex::new(NonceGenerator::new()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gen = Arc::clone(&gen);
                std::thread::spawn(move || {
                    (0..500)
                        .map(|_| gen.lock().unwrap().next())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = Vec::new();
        for handle in handles {
            let nonces = handle.join().unwrap();
            assert!(nonces.windows(2).all(|w| w[0] < w[1]));
            all.extend(nonces);
        }

        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }
}
