use std::time::Duration;

use serde_json::Value;
use shared::{
    domain::{Commitment, TxSignature},
    protocol::SignatureStatus,
};
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::rpc::{RpcClient, RpcError};

#[derive(Debug, Error)]
pub enum ConfirmError {
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error("transaction {signature} failed: {err}")]
    Failed { signature: TxSignature, err: Value },
    #[error("transaction {signature} not {commitment} after {waited:?}")]
    TimedOut {
        signature: TxSignature,
        commitment: Commitment,
        waited: Duration,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ConfirmOptions {
    pub commitment: Commitment,
    pub poll_interval: Duration,
    /// `None` waits for as long as the ledger takes.
    pub timeout: Option<Duration>,
}

/// Polls the signature status until it reaches `options.commitment`.
///
/// A status carrying an execution error ends the wait immediately, and so does
/// any RPC failure while polling; nothing is retried.
pub async fn wait_for_confirmation(
    rpc: &RpcClient,
    signature: &TxSignature,
    options: &ConfirmOptions,
) -> Result<SignatureStatus, ConfirmError> {
    let started = Instant::now();
    let query = std::slice::from_ref(signature);

    loop {
        let status = rpc
            .get_signature_statuses(query)
            .await?
            .into_iter()
            .next()
            .flatten();

        match status {
            Some(status) if status.err.is_some() => {
                return Err(ConfirmError::Failed {
                    signature: signature.clone(),
                    err: status.err.unwrap_or(Value::Null),
                });
            }
            Some(status)
                if status
                    .confirmation_status
                    .is_some_and(|level| level.satisfies(options.commitment)) =>
            {
                debug!(%signature, slot = status.slot, "signature reached {}", options.commitment);
                return Ok(status);
            }
            Some(status) => {
                debug!(%signature, level = ?status.confirmation_status, "waiting for commitment");
            }
            None => debug!(%signature, "signature not yet visible"),
        }

        if let Some(timeout) = options.timeout {
            let waited = started.elapsed();
            if waited >= timeout {
                return Err(ConfirmError::TimedOut {
                    signature: signature.clone(),
                    commitment: options.commitment,
                    waited,
                });
            }
        }
        sleep(options.poll_interval).await;
    }
}
