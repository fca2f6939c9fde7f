//! Error types for stream operations

use crate::transport::TransportError;
use std::time::Duration;

/// Errors reported by the stream connection and delivered to handlers
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Connect, send or receive failed
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// Dialing the endpoint took too long
    #[error("connection timeout after {0:?}")]
    ConnectionTimeout(Duration),

    /// Peer closed the connection
    #[error("stream closed")]
    Closed,

    /// Payload did not match the shape of its topic
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// Control message could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Stream operation before a connection was established
    #[error("stream not connected")]
    NotConnected,
}

impl From<TransportError> for StreamError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(timeout) => Self::ConnectionTimeout(timeout),
            other => Self::Transport(other),
        }
    }
}

impl StreamError {
    /// Check if this error ended the connection
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Transport(TransportError::ReceiveFailed(_)) | Self::Closed
        )
    }
}

/// Result type for stream operations
pub type StreamResult<T> = Result<T, StreamError>;
