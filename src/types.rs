//! Chain data types
//!
//! Type definitions for blocks, raw transaction/result pairs returned by a
//! chain data provider, and the decoded transaction records handed to
//! consumers.

use alloy_primitives::{FixedBytes, B256};
use serde::{Deserialize, Deserializer};

/// Position of a block in the chain.
pub type Height = u64;

/// Block identifier.
pub type BlockId = B256;

/// Transaction identifier.
pub type TransactionId = B256;

/// Collection identifier. The zero id marks a system transaction.
pub type CollectionId = B256;

/// Account address (8 bytes). `Address::ZERO` is the null address.
pub type Address = FixedBytes<8>;

/// Block as seen by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Block {
    /// Block identifier (hex string in JSON)
    #[serde(rename = "id", deserialize_with = "deserialize_hex_b256")]
    pub id: BlockId,

    /// Block height (hex quantity in JSON)
    #[serde(rename = "height", deserialize_with = "deserialize_hex_u64")]
    pub height: Height,
}

/// A provider-supplied transaction together with its execution result.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransactionPair {
    /// Index of the transaction within the block
    #[serde(rename = "index")]
    pub index: u32,

    /// Collection the transaction was included in (empty for system transactions)
    #[serde(rename = "collectionId", default, deserialize_with = "deserialize_hex_b256_or_empty")]
    pub collection_id: CollectionId,

    #[serde(rename = "transaction")]
    pub transaction: RawTransaction,

    #[serde(rename = "result")]
    pub result: RawResult,
}

impl RawTransactionPair {
    /// System transactions are not part of any collection.
    pub fn is_system(&self) -> bool {
        self.collection_id == CollectionId::ZERO
    }
}

/// Transaction body as returned by the provider, not yet decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    /// Transaction identifier (hex string in JSON)
    #[serde(rename = "id", deserialize_with = "deserialize_hex_b256")]
    pub id: TransactionId,

    /// Proposer address (hex string, validated by the decoder)
    #[serde(rename = "proposer", default)]
    pub proposer: String,

    /// Payer address (hex string, validated by the decoder)
    #[serde(rename = "payer", default)]
    pub payer: String,

    #[serde(rename = "script", default)]
    pub script: String,

    #[serde(rename = "arguments", default)]
    pub arguments: Vec<serde_json::Value>,

    /// Gas limit (hex quantity in JSON)
    #[serde(rename = "gasLimit", default, deserialize_with = "deserialize_hex_u64_or_zero")]
    pub gas_limit: u64,
}

/// Execution result as returned by the provider, not yet decoded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResult {
    /// Status name, e.g. "SEALED"
    #[serde(rename = "status", default)]
    pub status: String,

    /// Empty when the transaction succeeded
    #[serde(rename = "errorMessage", default)]
    pub error_message: String,

    #[serde(rename = "events", default)]
    pub events: Vec<RawEvent>,
}

/// Event emitted during transaction execution.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(rename = "eventIndex", default)]
    pub event_index: u32,

    #[serde(rename = "payload", default)]
    pub payload: serde_json::Value,
}

/// Lifecycle status of a decoded transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Unknown,
    Pending,
    Finalized,
    Executed,
    Sealed,
    Expired,
}

/// Decoded event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_type: String,
    pub transaction_id: TransactionId,
    pub transaction_index: u32,
    pub event_index: u32,
    pub payload: serde_json::Value,
}

/// Decoded transaction record.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub block_id: BlockId,
    /// Index within the block, as reported by the provider
    pub index: u32,
    pub proposer: Address,
    pub payer: Address,
    pub status: TransactionStatus,
    /// Execution error, if the transaction failed
    pub error_message: Option<String>,
    pub events: Vec<Event>,
}

impl Transaction {
    /// Zero proposer and no events: an empty placeholder, not a real transaction.
    pub fn is_placeholder(&self) -> bool {
        self.proposer == Address::ZERO && self.events.is_empty()
    }
}

// Hex deserialization helpers

/// Pad an odd-length hex string with a leading zero.
fn pad_hex_string(s: &str) -> String {
    if s.is_empty() {
        return s.to_string();
    }
    if s.len() % 2 == 1 {
        format!("0{}", s)
    } else {
        s.to_string()
    }
}

/// Parse a hex quantity ("0x1a") into a u64.
pub(crate) fn parse_hex_u64(s: &str) -> Result<u64, String> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Err("empty hex quantity".to_string());
    }
    u64::from_str_radix(s, 16).map_err(|e| e.to_string())
}

/// Parse a fixed-size hex identifier, with or without 0x prefix.
pub(crate) fn parse_hex_fixed<const N: usize>(s: &str) -> Result<FixedBytes<N>, String> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let s = pad_hex_string(s);
    let bytes = hex::decode(&s).map_err(|e| e.to_string())?;
    if bytes.len() != N {
        return Err(format!("Expected {} bytes, got {}", N, bytes.len()));
    }
    Ok(FixedBytes::from_slice(&bytes))
}

/// Deserialize a hex string to u64.
fn deserialize_hex_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_hex_u64(&s).map_err(serde::de::Error::custom)
}

/// Deserialize an optional hex string to u64; null, missing or empty is zero.
fn deserialize_hex_u64_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim_start_matches("0x").is_empty() => {
            parse_hex_u64(&s).map_err(serde::de::Error::custom)
        }
        _ => Ok(0),
    }
}

/// Deserialize a hex string to B256.
fn deserialize_hex_b256<'de, D>(deserializer: D) -> Result<B256, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_hex_fixed::<32>(&s).map_err(serde::de::Error::custom)
}

/// Deserialize an optional hex string to B256; null or empty is the zero id.
fn deserialize_hex_b256_or_empty<'de, D>(deserializer: D) -> Result<B256, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim_start_matches("0x").is_empty() => {
            parse_hex_fixed::<32>(&s).map_err(serde::de::Error::custom)
        }
        _ => Ok(B256::ZERO),
    }
}
