//! JSON-RPC 2.0 envelopes and the ledger result payloads the client reads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Commitment;

pub const JSONRPC_VERSION: &str = "2.0";

/// Code the ledger returns when preflight simulation of a submitted transaction fails.
pub const SEND_TRANSACTION_PREFLIGHT_FAILURE: i64 = -32002;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RpcContext {
    pub slot: u64,
}

/// Result shape for methods that report the slot they were evaluated at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithContext<T> {
    pub context: RpcContext,
    pub value: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockhashInfo {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CommitmentConfig {
    pub commitment: Commitment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionConfig {
    pub encoding: String,
    pub skip_preflight: bool,
    pub preflight_commitment: Commitment,
}

impl SendTransactionConfig {
    pub fn base64(preflight_commitment: Commitment) -> Self {
        Self {
            encoding: "base64".to_string(),
            skip_preflight: false,
            preflight_commitment,
        }
    }
}
