//! Chain data provider interface
//!
//! The streaming engine only depends on this trait. [`crate::rpc::RpcClient`]
//! is the JSON-RPC implementation.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{Block, BlockId, Height, RawTransactionPair};

/// Read-only access to an append-only chain.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Fetch the block the provider currently considers latest.
    async fn latest_block(&self) -> Result<Block, ProviderError>;

    /// Fetch the block at a given height.
    async fn block_at_height(&self, height: Height) -> Result<Block, ProviderError>;

    /// Fetch all transaction/result pairs of a block, in block order.
    async fn transactions_by_block_id(
        &self,
        block_id: BlockId,
    ) -> Result<Vec<RawTransactionPair>, ProviderError>;
}
