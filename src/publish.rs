//! Result publishing
//!
//! Wraps the outcome of one tick into a [`BlockResult`] and delivers it on
//! the bounded output channel. The send blocks while the consumer is behind,
//! which is the engine's only backpressure mechanism.

use std::time::Instant;
use tokio::sync::mpsc;

use crate::diagnostics::DiagnosticContext;
use crate::error::ProviderError;
use crate::shutdown::Shutdown;
use crate::types::{Block, Transaction};

/// Per-block outcome delivered downstream.
#[derive(Debug, Clone)]
pub struct BlockResult {
    pub block: Block,
    /// Provider order. Empty when the block has no transactions or extraction failed.
    pub transactions: Vec<Transaction>,
    /// Set when the block's transactions could not be fetched.
    pub error: Option<ProviderError>,
    pub context: DiagnosticContext,
    /// Beginning of the tick that produced this result.
    pub started_at: Instant,
}

impl BlockResult {
    pub fn success(
        block: Block,
        transactions: Vec<Transaction>,
        context: DiagnosticContext,
        started_at: Instant,
    ) -> Self {
        let context = context.with("transactions", transactions.len());
        Self {
            block,
            transactions,
            error: None,
            context,
            started_at,
        }
    }

    pub fn failure(
        block: Block,
        error: ProviderError,
        context: DiagnosticContext,
        started_at: Instant,
    ) -> Self {
        let context = context.with("transactions", 0);
        Self {
            block,
            transactions: Vec::new(),
            error: Some(error),
            context,
            started_at,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of [`publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Shutdown fired first or the consumer went away; the result was discarded.
    Stopped,
}

/// Send `result`, waiting for channel capacity unless shutdown wins first.
pub async fn publish(
    shutdown: &mut Shutdown,
    output: &mpsc::Sender<BlockResult>,
    result: BlockResult,
) -> Delivery {
    match shutdown.race(output.send(result)).await {
        Some(Ok(())) => Delivery::Delivered,
        Some(Err(_)) | None => Delivery::Stopped,
    }
}
