//! Error types for credential handling

/// Errors that can occur while loading credentials
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// API key or secret missing or empty
    #[error("API key and secret are required")]
    MissingCredentials,

    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),
}

/// Result type for credential operations
pub type AuthResult<T> = Result<T, AuthError>;
