//! Error types for the streaming engine.
//!
//! - [`ProviderError`] - chain data provider failures, classified as
//!   transient or fatal
//! - [`DecodeError`] - a single raw transaction could not be decoded
//! - [`StreamError`] - errors returned by the engine itself

use thiserror::Error;

use crate::types::Height;

/// Failure reported by a chain data provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Requested data does not exist on the provider yet.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Data exists but is not yet available (e.g. results still being indexed).
    #[error("Not yet available: {0}")]
    Unavailable(String),

    /// Request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider answered with an error we do not recognize as transient.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Response could not be interpreted.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Transient errors are retried on the next tick instead of being published.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Unavailable(_))
    }

    pub fn block_not_found(height: Height) -> Self {
        Self::NotFound(format!("block at height {}", height))
    }
}

/// Failure to decode one raw transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Invalid {field} address: {reason}")]
    InvalidAddress { field: &'static str, reason: String },

    #[error("Unknown transaction status: {0}")]
    UnknownStatus(String),

    #[error("Invalid payload for event {index}: {reason}")]
    InvalidPayload { index: u32, reason: String },
}

/// Errors returned by [`crate::streamer::Streamer::run`].
#[derive(Debug, Error)]
pub enum StreamError {
    /// The initial tip could not be fetched; the loop never started.
    #[error("Failed to fetch initial tip: {0}")]
    Startup(#[source] ProviderError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::block_not_found(7).is_transient());
        assert!(ProviderError::Unavailable("results".into()).is_transient());
        assert!(!ProviderError::Transport("reset".into()).is_transient());
        assert!(!ProviderError::Malformed("bad json".into()).is_transient());
        assert!(!ProviderError::Rpc {
            code: -32000,
            message: "not found".into()
        }
        .is_transient());
    }
}
