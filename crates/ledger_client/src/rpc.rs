use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shared::{
    domain::{Commitment, Lamports, TxSignature},
    protocol::{
        BlockhashInfo, CommitmentConfig, RpcRequest, RpcResponse, SendTransactionConfig,
        SignatureStatus, WithContext, SEND_TRANSACTION_PREFLIGHT_FAILURE,
    },
};
use thiserror::Error;
use tracing::debug;

use crate::{keypair::Pubkey, transaction::Transaction};

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("{method} request failed: {source}")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} returned error {code}: {message}")]
    Server {
        method: String,
        code: i64,
        message: String,
        data: Option<Value>,
    },
    #[error("{method} failed with HTTP {status}: {body}")]
    Http {
        method: String,
        status: u16,
        body: String,
    },
    #[error("{method} returned neither a result nor an error")]
    EmptyResponse { method: String },
    #[error("failed to decode {method} result: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RpcError {
    /// Preflight rejected the transaction because the payer cannot cover it.
    pub fn is_insufficient_funds(&self) -> bool {
        let RpcError::Server {
            code,
            message,
            data,
            ..
        } = self
        else {
            return false;
        };
        if *code != SEND_TRANSACTION_PREFLIGHT_FAILURE {
            return false;
        }
        let haystack = format!(
            "{} {}",
            message.to_ascii_lowercase(),
            data.as_ref()
                .map(|data| data.to_string().to_ascii_lowercase())
                .unwrap_or_default()
        );
        haystack.contains("insufficient")
            || haystack.contains("no record of a prior credit")
            || haystack.contains("accountnotfound")
    }
}

/// Minimal JSON-RPC client for the handful of ledger methods this app needs.
pub struct RpcClient {
    http: Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, url = %self.url, "rpc call");

        let transport = |source: reqwest::Error| RpcError::Transport {
            method: method.to_string(),
            source,
        };
        let http_response = self
            .http
            .post(&self.url)
            .json(&RpcRequest::new(id, method, params))
            .send()
            .await
            .map_err(transport)?;
        let status = http_response.status();
        let body = http_response.text().await.map_err(transport)?;

        // Rate-limit and preflight errors arrive as JSON-RPC bodies even on non-2xx statuses.
        let response: RpcResponse<Value> = match serde_json::from_str(&body) {
            Ok(response) => response,
            Err(_) if !status.is_success() => {
                return Err(RpcError::Http {
                    method: method.to_string(),
                    status: status.as_u16(),
                    body,
                })
            }
            Err(source) => {
                return Err(RpcError::Decode {
                    method: method.to_string(),
                    source,
                })
            }
        };

        if let Some(error) = response.error {
            return Err(RpcError::Server {
                method: method.to_string(),
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }
        let result = response.result.ok_or_else(|| RpcError::EmptyResponse {
            method: method.to_string(),
        })?;
        serde_json::from_value(result).map_err(|source| RpcError::Decode {
            method: method.to_string(),
            source,
        })
    }

    pub async fn request_airdrop(
        &self,
        to: &Pubkey,
        lamports: Lamports,
        commitment: Commitment,
    ) -> Result<TxSignature, RpcError> {
        self.call(
            "requestAirdrop",
            json!([to.to_string(), lamports.0, CommitmentConfig { commitment }]),
        )
        .await
    }

    pub async fn get_latest_blockhash(
        &self,
        commitment: Commitment,
    ) -> Result<BlockhashInfo, RpcError> {
        let response: WithContext<BlockhashInfo> = self
            .call("getLatestBlockhash", json!([CommitmentConfig { commitment }]))
            .await?;
        Ok(response.value)
    }

    pub async fn send_transaction(
        &self,
        transaction: &Transaction,
        preflight_commitment: Commitment,
    ) -> Result<TxSignature, RpcError> {
        self.call(
            "sendTransaction",
            json!([
                transaction.to_base64(),
                SendTransactionConfig::base64(preflight_commitment)
            ]),
        )
        .await
    }

    pub async fn get_signature_statuses(
        &self,
        signatures: &[TxSignature],
    ) -> Result<Vec<Option<SignatureStatus>>, RpcError> {
        let response: WithContext<Vec<Option<SignatureStatus>>> = self
            .call("getSignatureStatuses", json!([signatures]))
            .await?;
        Ok(response.value)
    }

    pub async fn get_balance(
        &self,
        address: &Pubkey,
        commitment: Commitment,
    ) -> Result<Lamports, RpcError> {
        let response: WithContext<u64> = self
            .call(
                "getBalance",
                json!([address.to_string(), CommitmentConfig { commitment }]),
            )
            .await?;
        Ok(Lamports(response.value))
    }
}
