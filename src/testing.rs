//! Test doubles: scripted provider, recording sink and a decoder that
//! fails on chosen indexes.

use alloy_primitives::B256;
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tracing::Level;

use crate::decoder::{Decoder, StandardDecoder};
use crate::diagnostics::{DiagnosticContext, DiagnosticSink};
use crate::error::{DecodeError, ProviderError};
use crate::provider::ChainProvider;
use crate::types::{
    Block, BlockId, Height, RawEvent, RawResult, RawTransaction, RawTransactionPair, Transaction,
};

/// Deterministic block for a height.
pub fn block(height: Height) -> Block {
    let mut id = [0u8; 32];
    id[..8].copy_from_slice(&height.to_be_bytes());
    id[31] = 0xb1;
    Block {
        id: B256::from(id),
        height,
    }
}

fn raw_events(count: usize) -> Vec<RawEvent> {
    (0..count)
        .map(|i| RawEvent {
            event_type: format!("A.Test.Event{}", i),
            event_index: i as u32,
            payload: json!({}),
        })
        .collect()
}

/// Regular transaction pair inside a collection.
pub fn pair(index: u32, proposer: &str, events: usize) -> RawTransactionPair {
    RawTransactionPair {
        index,
        collection_id: id(0xcc),
        transaction: RawTransaction {
            id: id(index as u8),
            proposer: proposer.to_string(),
            payer: proposer.to_string(),
            script: "transaction {}".to_string(),
            arguments: vec![],
            gas_limit: 9999,
        },
        result: RawResult {
            status: "SEALED".to_string(),
            error_message: String::new(),
            events: raw_events(events),
        },
    }
}

/// System transaction pair (no collection).
pub fn system_pair(index: u32, events: usize) -> RawTransactionPair {
    RawTransactionPair {
        collection_id: B256::ZERO,
        ..pair(index, "", events)
    }
}

#[derive(Default)]
struct MockState {
    tip: Height,
    latest_error: Option<ProviderError>,
    block_errors: HashMap<Height, VecDeque<ProviderError>>,
    wrong_blocks: HashMap<Height, VecDeque<Height>>,
    pairs: HashMap<BlockId, Vec<RawTransactionPair>>,
    pair_errors: HashMap<BlockId, ProviderError>,
    pair_errors_once: HashMap<BlockId, VecDeque<ProviderError>>,
    hanging: HashSet<BlockId>,
    hanging_blocks: HashSet<Height>,
    hang_latest: bool,
    calls: Vec<String>,
}

/// Provider whose chain is `block(0..=tip)`, with scripted failures.
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    pub fn new(tip: Height) -> Self {
        let provider = Self::default();
        provider.set_tip(tip);
        provider
    }

    pub fn set_tip(&self, tip: Height) {
        self.state.lock().unwrap().tip = tip;
    }

    pub fn set_pairs(&self, block_id: BlockId, pairs: Vec<RawTransactionPair>) {
        self.state.lock().unwrap().pairs.insert(block_id, pairs);
    }

    pub fn fail_latest(&self, error: ProviderError) {
        self.state.lock().unwrap().latest_error = Some(error);
    }

    pub fn fail_block_once(&self, height: Height, error: ProviderError) {
        self.state
            .lock()
            .unwrap()
            .block_errors
            .entry(height)
            .or_default()
            .push_back(error);
    }

    /// Answer the next request for `height` with the block at `served` instead.
    pub fn serve_wrong_block_once(&self, height: Height, served: Height) {
        self.state
            .lock()
            .unwrap()
            .wrong_blocks
            .entry(height)
            .or_default()
            .push_back(served);
    }

    pub fn fail_pairs(&self, block_id: BlockId, error: ProviderError) {
        self.state.lock().unwrap().pair_errors.insert(block_id, error);
    }

    pub fn fail_pairs_once(&self, block_id: BlockId, error: ProviderError) {
        self.state
            .lock()
            .unwrap()
            .pair_errors_once
            .entry(block_id)
            .or_default()
            .push_back(error);
    }

    /// Make the pair fetch for `block_id` never complete.
    pub fn hang_pairs(&self, block_id: BlockId) {
        self.state.lock().unwrap().hanging.insert(block_id);
    }

    /// Make every latest-block call never complete.
    pub fn hang_latest(&self) {
        self.state.lock().unwrap().hang_latest = true;
    }

    /// Make the block fetch at `height` never complete.
    pub fn hang_block(&self, height: Height) {
        self.state.lock().unwrap().hanging_blocks.insert(height);
    }

    /// Calls in order: `latest:<height>`, `block:<height>`, `pairs:<block id>`.
    /// A hanging latest-block call is logged as `latest:hang`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, call: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| *c == call)
            .count()
    }
}

#[async_trait]
impl ChainProvider for MockProvider {
    async fn latest_block(&self) -> Result<Block, ProviderError> {
        {
            let mut state = self.state.lock().unwrap();
            if state.hang_latest {
                state.calls.push("latest:hang".to_string());
            } else if let Some(e) = state.latest_error.clone() {
                state.calls.push("latest:error".to_string());
                return Err(e);
            } else {
                let tip = state.tip;
                state.calls.push(format!("latest:{}", tip));
                return Ok(block(tip));
            }
        }
        std::future::pending().await
    }

    async fn block_at_height(&self, height: Height) -> Result<Block, ProviderError> {
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("block:{}", height));
            if let Some(e) = state.block_errors.get_mut(&height).and_then(|q| q.pop_front()) {
                return Err(e);
            }
            if let Some(served) = state.wrong_blocks.get_mut(&height).and_then(|q| q.pop_front()) {
                return Ok(block(served));
            }
            if height > state.tip {
                return Err(ProviderError::block_not_found(height));
            }
            if !state.hanging_blocks.contains(&height) {
                return Ok(block(height));
            }
        }
        std::future::pending().await
    }

    async fn transactions_by_block_id(
        &self,
        block_id: BlockId,
    ) -> Result<Vec<RawTransactionPair>, ProviderError> {
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("pairs:{}", block_id));
            if let Some(e) = state
                .pair_errors_once
                .get_mut(&block_id)
                .and_then(|q| q.pop_front())
            {
                return Err(e);
            }
            if let Some(e) = state.pair_errors.get(&block_id) {
                return Err(e.clone());
            }
            if !state.hanging.contains(&block_id) {
                return Ok(state.pairs.get(&block_id).cloned().unwrap_or_default());
            }
        }
        std::future::pending().await
    }
}

/// Sink that keeps every notice.
#[derive(Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<(Level, DiagnosticContext, String)>>,
}

impl RecordingSink {
    pub fn messages_containing(&self, needle: &str) -> Vec<DiagnosticContext> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, message)| message.contains(needle))
            .map(|(_, ctx, _)| ctx.clone())
            .collect()
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, level: Level, context: &DiagnosticContext, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push((level, context.clone(), message.to_string()));
    }
}

/// [`StandardDecoder`] that rejects the given transaction indexes.
pub struct FailingDecoder {
    failing: HashSet<u32>,
}

impl FailingDecoder {
    pub fn failing_on(indexes: &[u32]) -> Self {
        Self {
            failing: indexes.iter().copied().collect(),
        }
    }
}

impl Decoder for FailingDecoder {
    fn decode(
        &self,
        block_id: BlockId,
        raw_result: &RawResult,
        raw_transaction: &RawTransaction,
        index: u32,
    ) -> Result<Transaction, DecodeError> {
        if self.failing.contains(&index) {
            return Err(DecodeError::UnknownStatus("CORRUPT".to_string()));
        }
        StandardDecoder.decode(block_id, raw_result, raw_transaction, index)
    }
}

/// 32-byte identifier ending in `byte`.
pub fn id(byte: u8) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[31] = byte;
    B256::from(bytes)
}
