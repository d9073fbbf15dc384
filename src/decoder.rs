//! Transaction decoding
//!
//! Turns a provider's raw transaction/result pair into a [`Transaction`].

use crate::error::DecodeError;
use crate::types::{
    parse_hex_fixed, Address, BlockId, Event, RawResult, RawTransaction, Transaction,
    TransactionStatus,
};

/// Decodes raw provider records into domain transactions.
pub trait Decoder: Send + Sync {
    fn decode(
        &self,
        block_id: BlockId,
        raw_result: &RawResult,
        raw_transaction: &RawTransaction,
        index: u32,
    ) -> Result<Transaction, DecodeError>;
}

/// Decoder for the JSON records served by [`crate::rpc::RpcClient`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDecoder;

impl Decoder for StandardDecoder {
    fn decode(
        &self,
        block_id: BlockId,
        raw_result: &RawResult,
        raw_transaction: &RawTransaction,
        index: u32,
    ) -> Result<Transaction, DecodeError> {
        let proposer = parse_address("proposer", &raw_transaction.proposer)?;
        let payer = parse_address("payer", &raw_transaction.payer)?;
        let status = parse_status(&raw_result.status)?;

        let mut events = Vec::with_capacity(raw_result.events.len());
        for raw in &raw_result.events {
            // Payloads are JSON-CDC objects; anything else is a corrupt record.
            if !(raw.payload.is_object() || raw.payload.is_null()) {
                return Err(DecodeError::InvalidPayload {
                    index: raw.event_index,
                    reason: format!("expected object, got {}", raw.payload),
                });
            }
            events.push(Event {
                event_type: raw.event_type.clone(),
                transaction_id: raw_transaction.id,
                transaction_index: index,
                event_index: raw.event_index,
                payload: raw.payload.clone(),
            });
        }

        let error_message = if raw_result.error_message.is_empty() {
            None
        } else {
            Some(raw_result.error_message.clone())
        };

        Ok(Transaction {
            id: raw_transaction.id,
            block_id,
            index,
            proposer,
            payer,
            status,
            error_message,
            events,
        })
    }
}

/// Parse an address; an empty string is the null address.
fn parse_address(field: &'static str, s: &str) -> Result<Address, DecodeError> {
    if s.is_empty() {
        return Ok(Address::ZERO);
    }
    parse_hex_fixed::<8>(s).map_err(|reason| DecodeError::InvalidAddress { field, reason })
}

fn parse_status(s: &str) -> Result<TransactionStatus, DecodeError> {
    match s.to_ascii_uppercase().as_str() {
        "" | "UNKNOWN" => Ok(TransactionStatus::Unknown),
        "PENDING" => Ok(TransactionStatus::Pending),
        "FINALIZED" => Ok(TransactionStatus::Finalized),
        "EXECUTED" => Ok(TransactionStatus::Executed),
        "SEALED" => Ok(TransactionStatus::Sealed),
        "EXPIRED" => Ok(TransactionStatus::Expired),
        _ => Err(DecodeError::UnknownStatus(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawEvent;
    use crate::testing::id;
    use alloy_primitives::B256;
    use serde_json::json;

    fn raw_tx(proposer: &str) -> RawTransaction {
        RawTransaction {
            id: id(9),
            proposer: proposer.to_string(),
            payer: "0x01cf0e2f2f715450".to_string(),
            script: String::new(),
            arguments: vec![],
            gas_limit: 9999,
        }
    }

    fn raw_result(status: &str, events: Vec<RawEvent>) -> RawResult {
        RawResult {
            status: status.to_string(),
            error_message: String::new(),
            events,
        }
    }

    #[test]
    fn test_decode_transaction() {
        let event = RawEvent {
            event_type: "A.Token.Deposited".to_string(),
            event_index: 0,
            payload: json!({ "amount": "1.0" }),
        };
        let tx = StandardDecoder
            .decode(
                id(1),
                &raw_result("sealed", vec![event]),
                &raw_tx("0xf8d6e0586b0a20c7"),
                4,
            )
            .unwrap();

        assert_eq!(tx.index, 4);
        assert_eq!(tx.status, TransactionStatus::Sealed);
        assert_eq!(tx.proposer.0, [0xf8, 0xd6, 0xe0, 0x58, 0x6b, 0x0a, 0x20, 0xc7]);
        assert_eq!(tx.events.len(), 1);
        assert_eq!(tx.events[0].transaction_id, id(9));
        assert_eq!(tx.events[0].transaction_index, 4);
        assert!(tx.error_message.is_none());
        assert!(!tx.is_placeholder());
    }

    #[test]
    fn test_empty_proposer_is_placeholder() {
        let tx = StandardDecoder
            .decode(B256::ZERO, &raw_result("SEALED", vec![]), &raw_tx(""), 0)
            .unwrap();
        assert_eq!(tx.proposer, Address::ZERO);
        assert!(tx.is_placeholder());
    }

    #[test]
    fn test_invalid_address() {
        let err = StandardDecoder
            .decode(B256::ZERO, &raw_result("SEALED", vec![]), &raw_tx("0x1234"), 0)
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidAddress { field: "proposer", .. }));
    }

    #[test]
    fn test_unknown_status() {
        let err = StandardDecoder
            .decode(B256::ZERO, &raw_result("REVERTED", vec![]), &raw_tx(""), 0)
            .unwrap_err();
        assert_eq!(err, DecodeError::UnknownStatus("REVERTED".to_string()));
    }

    #[test]
    fn test_error_message_kept() {
        let mut result = raw_result("EXECUTED", vec![]);
        result.error_message = "panic: out of gas".to_string();
        let tx = StandardDecoder
            .decode(B256::ZERO, &result, &raw_tx("0xf8d6e0586b0a20c7"), 1)
            .unwrap();
        assert_eq!(tx.error_message.as_deref(), Some("panic: out of gas"));
    }
}
