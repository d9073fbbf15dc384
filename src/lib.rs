//! blockstream - block and transaction streaming engine
//!
//! This library polls a chain data provider, follows the chain from a
//! starting height up to the live tip, extracts and filters the
//! transactions of every block, and publishes one ordered result per block
//! on a bounded channel under cooperative shutdown.

pub mod config;
pub mod cursor;
pub mod decoder;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod provider;
pub mod publish;
pub mod rpc;
pub mod shutdown;
pub mod streamer;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export the main types for convenience
pub use config::StreamConfig;
pub use decoder::{Decoder, StandardDecoder};
pub use diagnostics::{DiagnosticContext, DiagnosticSink, TracingSink};
pub use error::{DecodeError, ProviderError, StreamError};
pub use provider::ChainProvider;
pub use publish::BlockResult;
pub use streamer::Streamer;
pub use types::{Block, Event, Height, RawTransactionPair, Transaction, TransactionStatus};
