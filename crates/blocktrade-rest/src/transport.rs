//! HTTP transport: request signing, sending and status classification
//!
//! Signed requests take one nonce from the per-client [`NonceGenerator`]
//! under an async lock that stays held until the response headers arrive,
//! so requests reach the exchange in nonce order.

use crate::error::{RestError, RestResult};
use blocktrade_auth::{Credentials, NonceGenerator, SignedHeaders};
use reqwest::{header::CONTENT_TYPE, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use url::Url;

/// Message used for 429 responses that carry no message of their own
pub const TOO_MANY_REQUESTS: &str = "Too Many Requests";

/// Whether a request is sent with authentication headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No authentication headers
    Public,
    /// `X-Api-Key`, `X-Nonce` and `X-Signature` headers
    Signed,
}

/// Sends requests to the REST API
pub struct HttpTransport {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
    nonces: Mutex<NonceGenerator>,
}

impl HttpTransport {
    /// Create a transport for `base_url`
    ///
    /// Paths passed to [`send`](Self::send) are appended to the base URL.
    pub fn new(
        client: Client,
        base_url: &str,
        credentials: Option<Credentials>,
    ) -> RestResult<Self> {
        Url::parse(base_url)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            nonces: Mutex::new(NonceGenerator::new()),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if signed requests can be made
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Send a request and return the raw response body
    ///
    /// `body` is sent exactly as given and, for signed requests, is the
    /// buffer the signature covers.
    #[instrument(skip(self, body))]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        access: Access,
        body: Option<Vec<u8>>,
    ) -> RestResult<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);

        let response = match access {
            Access::Public => self.request(method, &url, None, body).send().await?,
            Access::Signed => {
                let credentials = self
                    .credentials
                    .as_ref()
                    .ok_or(RestError::MissingCredentials)?;

                let mut nonces = self.nonces.lock().await;
                let headers = credentials.signed_headers(nonces.next(), body.as_deref());
                debug!(nonce = %headers.nonce, "Signed request");

                let response = self.request(method, &url, Some(&headers), body).send().await?;
                drop(nonces);
                response
            }
        };

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        debug!(status, len = bytes.len(), "Received response");

        classify_response(status, &bytes)
    }

    /// GET `path` and decode the JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, access: Access) -> RestResult<T> {
        let bytes = self.send(Method::GET, path, access, None).await?;
        serde_json::from_slice(&bytes).map_err(RestError::Decode)
    }

    /// POST `body` as JSON to `path` and decode the JSON response
    ///
    /// `None` sends the request without a body.
    pub async fn post_json<B, T>(&self, path: &str, access: Access, body: Option<&B>) -> RestResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(RestError::Serialization)?;

        let bytes = self.send(Method::POST, path, access, body).await?;
        serde_json::from_slice(&bytes).map_err(RestError::Decode)
    }

    fn request(
        &self,
        method: Method,
        url: &str,
        headers: Option<&SignedHeaders>,
        body: Option<Vec<u8>>,
    ) -> RequestBuilder {
        debug!(%method, url, "Sending request");

        let mut request = self.client.request(method, url);

        if let Some(headers) = headers {
            for (name, value) in headers.iter() {
                request = request.header(name, value);
            }
        }

        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        request
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("has_credentials", &self.has_credentials())
            .finish()
    }
}

/// Turn a status and body into the response bytes or an [`RestError::Api`]
///
/// For failures the message starts empty (`"Too Many Requests"` for 429).
/// A non-blank body must be JSON; its `message` field either replaces the
/// default (string) or has every string element appended followed by `", "`
/// (array). Other shapes keep the default.
pub fn classify_response(status: u16, body: &[u8]) -> RestResult<Vec<u8>> {
    if status < 300 {
        return Ok(body.to_vec());
    }

    let mut message = if status == 429 {
        TOO_MANY_REQUESTS.to_string()
    } else {
        String::new()
    };

    if !body.iter().all(u8::is_ascii_whitespace) {
        let parsed: Value = serde_json::from_slice(body).map_err(RestError::Decode)?;

        match parsed.get("message") {
            Some(Value::String(text)) => message = text.clone(),
            Some(Value::Array(items)) => {
                for text in items.iter().filter_map(Value::as_str) {
                    message.push_str(text);
                    message.push_str(", ");
                }
            }
            _ => {}
        }
    }

    warn!(status, %message, "Request failed");

    Err(RestError::Api {
        code: status,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(result: RestResult<Vec<u8>>) -> (u16, String) {
        match result {
            Err(RestError::Api { code, message }) => (code, message),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_success_returns_body_verbatim() {
        let body = br#"{"id": 1}"#;
        assert_eq!(classify_response(200, body).unwrap(), body.to_vec());
        assert_eq!(classify_response(299, b"").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_string_message_replaces_default() {
        let (code, message) = api_error(classify_response(400, br#"{"message":"bad"}"#));
        assert_eq!(code, 400);
        assert_eq!(message, "bad");

        let (_, message) = api_error(classify_response(429, br#"{"message":"slow down"}"#));
        assert_eq!(message, "slow down");
    }

    #[test]
    fn test_array_message_is_appended() {
        let (_, message) = api_error(classify_response(422, br#"{"message":["a","b"]}"#));
        assert_eq!(message, "a, b, ");

        let (_, message) = api_error(classify_response(429, br#"{"message":["x", 5, "y"]}"#));
        assert_eq!(message, "Too Many Requestsx, y, ");
    }

    #[test]
    fn test_empty_429_uses_default() {
        let (code, message) = api_error(classify_response(429, b""));
        assert_eq!(code, 429);
        assert_eq!(message, TOO_MANY_REQUESTS);

        let (_, message) = api_error(classify_response(429, b"  \n"));
        assert_eq!(message, TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_other_shapes_keep_default() {
        let (_, message) = api_error(classify_response(500, br#"{"message":{"x":1}}"#));
        assert_eq!(message, "");

        let (_, message) = api_error(classify_response(503, br#"{"error":"down"}"#));
        assert_eq!(message, "");
    }

    #[test]
    fn test_unparseable_body_surfaces_decode_error() {
        let result = classify_response(502, b"<html>Bad Gateway</html>");
        assert!(matches!(result, Err(RestError::Decode(_))));
    }

    #[test]
    fn test_redirect_status_is_failure() {
        let (code, _) = api_error(classify_response(301, b""));
        assert_eq!(code, 301);
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpTransport::new(Client::new(), "not a url", None);
        assert!(matches!(result, Err(RestError::InvalidUrl(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport = HttpTransport::new(Client::new(), "https://example.com/api/v1/", None).unwrap();
        assert_eq!(transport.base_url(), "https://example.com/api/v1");
        assert!(!transport.has_credentials());
    }

    #[tokio::test]
    async fn test_signed_request_without_credentials_fails_fast() {
        // Port 9 (discard) is never contacted: the credential check comes first.
        let transport = HttpTransport::new(Client::new(), "http://127.0.0.1:9", None).unwrap();
        let result = transport.send(Method::GET, "/user", Access::Signed, None).await;
        assert!(matches!(result, Err(RestError::MissingCredentials)));
    }
}
