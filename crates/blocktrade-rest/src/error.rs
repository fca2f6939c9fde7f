//! Error types for REST API operations

/// Errors that can occur during REST API operations
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// Signed endpoint called without API key and secret
    #[error("API key and secret are required for this endpoint")]
    MissingCredentials,

    /// HTTP request failed before a status was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Exchange answered with a status of 300 or above
    #[error("API Error: Code({code}) {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Message extracted from the error body
        message: String,
    },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// Request body could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Reference data lookup found no matching entry
    #[error("{key} not found")]
    NotFound {
        /// Description of the lookup that failed
        key: String,
    },

    /// Base URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl RestError {
    /// HTTP status of an API error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Check if this error indicates rate limiting
    pub fn is_rate_limited(&self) -> bool {
        self.status_code() == Some(429)
    }

    /// Check if this error is a failed reference data lookup
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;
