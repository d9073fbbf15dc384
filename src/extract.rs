//! Transaction extraction
//!
//! Retrieves a block's raw transaction/result pairs and filters them into
//! the ordered transaction list published for that block.

use tracing::Level;

use crate::decoder::Decoder;
use crate::diagnostics::{DiagnosticContext, DiagnosticSink};
use crate::error::ProviderError;
use crate::provider::ChainProvider;
use crate::types::{BlockId, Transaction};

/// Extract the transactions of one block, in provider order.
///
/// - System transactions (no collection) only report their events to the sink.
/// - A transaction that fails to decode is skipped; the rest of the block is kept.
/// - Placeholders (zero proposer, no events) are dropped.
///
/// Only the pair fetch can fail; callers decide whether that error is transient.
pub async fn extract<P, D>(
    provider: &P,
    decoder: &D,
    block_id: BlockId,
    context: &DiagnosticContext,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<Transaction>, ProviderError>
where
    P: ChainProvider + ?Sized,
    D: Decoder + ?Sized,
{
    let pairs = provider.transactions_by_block_id(block_id).await?;

    let mut transactions = Vec::with_capacity(pairs.len());
    for pair in &pairs {
        if pair.is_system() {
            for event in &pair.result.events {
                let ctx = context
                    .clone()
                    .with("tx_index", pair.index)
                    .with("event_type", &event.event_type)
                    .with("event_index", event.event_index);
                sink.emit(Level::INFO, &ctx, "System transaction event");
            }
            continue;
        }

        let tx = match decoder.decode(block_id, &pair.result, &pair.transaction, pair.index) {
            Ok(tx) => tx,
            Err(e) => {
                let ctx = context
                    .clone()
                    .with("tx_index", pair.index)
                    .with("tx_id", pair.transaction.id)
                    .with("error", &e);
                sink.emit(Level::WARN, &ctx, "Skipping transaction that failed to decode");
                continue;
            }
        };

        if tx.is_placeholder() {
            continue;
        }

        transactions.push(tx);
    }

    Ok(transactions)
}
