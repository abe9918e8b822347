//! Gateway channel error types.

use mfe_crypto::CryptoError;
use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur while building, sending, or validating an envelope.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid key material: {0}")]
    KeyFormat(String),

    #[error("envelope crypto error: {0}")]
    Crypto(String),

    #[error("signature check failed: {0}")]
    Signature(String),

    #[error("gateway rejected request: code {code}: {message}")]
    Business { code: String, message: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("invalid envelope: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<CryptoError> for GatewayError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::KeyFormat(msg) => GatewayError::KeyFormat(msg),
            CryptoError::InvalidSignature(msg) => GatewayError::Signature(msg),
            CryptoError::EmptyInput(msg) => GatewayError::Validation(msg),
            CryptoError::Io(e) => GatewayError::Io(e),
            other @ (CryptoError::Encryption(_)
            | CryptoError::Decryption(_)
            | CryptoError::Encoding(_)) => GatewayError::Crypto(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}
