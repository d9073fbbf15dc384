//! JSON-RPC client for chain access nodes
//!
//! Provides a typed [`ChainProvider`] over a JSON-RPC 2.0 endpoint.
//! Handles hex quantity formatting and maps RPC errors onto
//! [`ProviderError`] classes.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ProviderError;
use crate::provider::ChainProvider;
use crate::types::{Block, BlockId, Height, RawTransactionPair};

/// Error code for data the node does not have (yet).
pub const NOT_FOUND_CODE: i64 = -32001;

/// Error code for data the node knows about but cannot serve yet.
pub const UNAVAILABLE_CODE: i64 = -32002;

/// JSON-RPC client for access nodes.
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
}

impl RpcClient {
    /// Create a new RPC client.
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Make a JSON-RPC call and return the raw `result` value.
    async fn call(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("{}: {}", method, e)))?;

        let json: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(format!("{}: {}", method, e)))?;

        extract_result(json)
    }
}

/// Split a JSON-RPC response into its result or a classified error.
fn extract_result(json: Value) -> Result<Value, ProviderError> {
    if let Some(error) = json.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(classify_error(code, message));
    }

    json.get("result")
        .cloned()
        .ok_or_else(|| ProviderError::Malformed("RPC response missing 'result' field".into()))
}

/// Map a JSON-RPC error code onto a provider error class.
fn classify_error(code: i64, message: String) -> ProviderError {
    match code {
        NOT_FOUND_CODE => ProviderError::NotFound(message),
        UNAVAILABLE_CODE => ProviderError::Unavailable(message),
        _ => ProviderError::Rpc { code, message },
    }
}

/// Deserialize a result, treating `null` as "not found".
fn parse_result<T: DeserializeOwned>(result: Value, what: &str) -> Result<T, ProviderError> {
    if result.is_null() {
        return Err(ProviderError::NotFound(what.to_string()));
    }
    serde_json::from_value(result)
        .map_err(|e| ProviderError::Malformed(format!("Failed to deserialize {}: {}", what, e)))
}

#[async_trait]
impl ChainProvider for RpcClient {
    async fn latest_block(&self) -> Result<Block, ProviderError> {
        let result = self.call("chain_getLatestBlock", json!([])).await?;
        parse_result(result, "latest block")
    }

    async fn block_at_height(&self, height: Height) -> Result<Block, ProviderError> {
        let params = json!([format!("0x{:x}", height)]);
        let result = self.call("chain_getBlockByHeight", params).await?;
        parse_result(result, &format!("block at height {}", height))
    }

    async fn transactions_by_block_id(
        &self,
        block_id: BlockId,
    ) -> Result<Vec<RawTransactionPair>, ProviderError> {
        let params = json!([format!("0x{:x}", block_id)]);
        let result = self.call("chain_getTransactionsByBlockId", params).await?;
        parse_result(result, &format!("transactions of block {:x}", block_id))
    }
}
