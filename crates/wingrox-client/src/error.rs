//! Error types for the WinGrox client.

use thiserror::Error;
use wingrox_types::ErrorKind;

use crate::fallback::{FallbackError, OperationError};

/// Errors that can occur when using the WinGrox client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Client configuration is unusable.
    #[error("Invalid client configuration: {0}")]
    Config(String),

    /// The underlying HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The operation could not be planned.
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// The operation was attempted and failed.
    #[error(transparent)]
    Fallback(#[from] FallbackError),

    /// Request body could not be serialized.
    #[error("Failed to encode request for {operation}: {message}")]
    Encode {
        /// Operation name
        operation: String,
        /// Serializer message
        message: String,
    },

    /// A successful envelope carried data of the wrong shape.
    #[error("Unexpected response data for {operation}: {message}")]
    Decode {
        /// Operation name
        operation: String,
        /// Deserializer message
        message: String,
    },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Http(_) | Self::Encode { .. } => ErrorKind::Internal,
            Self::Operation(_) => ErrorKind::InvalidOperation,
            Self::Fallback(e) => e.kind(),
            Self::Decode { .. } => ErrorKind::MalformedResponse,
        }
    }
}
